//! Triple EMA Configuration

use serde::{Deserialize, Serialize};

use crate::error::{ensure_ordered, ensure_period, StrategyError};
use crate::strategies::ensure_protection_pcts;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripleEmaConfig {
    /// Fast EMA period (default: 5)
    #[serde(default = "default_fast_period")]
    pub fast_period: usize,

    /// Middle EMA period (default: 13)
    #[serde(default = "default_mid_period")]
    pub mid_period: usize,

    /// Slow EMA period (default: 34)
    #[serde(default = "default_slow_period")]
    pub slow_period: usize,

    #[serde(default = "default_allow_shorts")]
    pub allow_shorts: bool,

    #[serde(default = "default_stop_loss_pct")]
    pub stop_loss_pct: f64,

    #[serde(default)]
    pub take_profit_pct: f64,
}

fn default_fast_period() -> usize {
    5
}
fn default_mid_period() -> usize {
    13
}
fn default_slow_period() -> usize {
    34
}
fn default_allow_shorts() -> bool {
    true
}
fn default_stop_loss_pct() -> f64 {
    3.0
}

impl TripleEmaConfig {
    pub fn validate(&self) -> Result<(), StrategyError> {
        ensure_period("fast_period", self.fast_period)?;
        ensure_ordered("fast_period", self.fast_period, "mid_period", self.mid_period)?;
        ensure_ordered("mid_period", self.mid_period, "slow_period", self.slow_period)?;
        ensure_protection_pcts(self.take_profit_pct, self.stop_loss_pct)
    }
}

impl Default for TripleEmaConfig {
    fn default() -> Self {
        Self {
            fast_period: default_fast_period(),
            mid_period: default_mid_period(),
            slow_period: default_slow_period(),
            allow_shorts: default_allow_shorts(),
            stop_loss_pct: default_stop_loss_pct(),
            take_profit_pct: 0.0,
        }
    }
}
