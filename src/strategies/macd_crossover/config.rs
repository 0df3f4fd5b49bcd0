//! MACD Crossover Configuration

use serde::{Deserialize, Serialize};

use crate::error::{ensure_ordered, ensure_period, StrategyError};
use crate::strategies::ensure_protection_pcts;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacdCrossoverConfig {
    /// Fast EMA period (default: 12)
    #[serde(default = "default_fast_period")]
    pub fast_period: usize,

    /// Slow EMA period (default: 26)
    #[serde(default = "default_slow_period")]
    pub slow_period: usize,

    /// Signal EMA period (default: 9)
    #[serde(default = "default_signal_period")]
    pub signal_period: usize,

    /// Only buy above the zero line and sell below it (default: false)
    #[serde(default)]
    pub zero_line_filter: bool,

    /// Bearish crosses open shorts instead of only closing longs (default: true)
    #[serde(default = "default_allow_shorts")]
    pub allow_shorts: bool,

    #[serde(default = "default_stop_loss_pct")]
    pub stop_loss_pct: f64,

    #[serde(default = "default_take_profit_pct")]
    pub take_profit_pct: f64,
}

fn default_fast_period() -> usize {
    12
}
fn default_slow_period() -> usize {
    26
}
fn default_signal_period() -> usize {
    9
}
fn default_allow_shorts() -> bool {
    true
}
fn default_stop_loss_pct() -> f64 {
    2.0
}
fn default_take_profit_pct() -> f64 {
    4.0
}

impl MacdCrossoverConfig {
    pub fn validate(&self) -> Result<(), StrategyError> {
        ensure_period("fast_period", self.fast_period)?;
        ensure_period("slow_period", self.slow_period)?;
        ensure_period("signal_period", self.signal_period)?;
        ensure_ordered("fast_period", self.fast_period, "slow_period", self.slow_period)?;
        ensure_protection_pcts(self.take_profit_pct, self.stop_loss_pct)
    }
}

impl Default for MacdCrossoverConfig {
    fn default() -> Self {
        Self {
            fast_period: default_fast_period(),
            slow_period: default_slow_period(),
            signal_period: default_signal_period(),
            zero_line_filter: false,
            allow_shorts: default_allow_shorts(),
            stop_loss_pct: default_stop_loss_pct(),
            take_profit_pct: default_take_profit_pct(),
        }
    }
}
