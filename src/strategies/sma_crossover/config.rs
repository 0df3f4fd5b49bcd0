//! SMA Crossover Configuration

use serde::{Deserialize, Serialize};

use crate::error::{ensure_ordered, ensure_period, StrategyError};
use crate::strategies::ensure_protection_pcts;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmaCrossoverConfig {
    /// Fast SMA period (default: 10)
    #[serde(default = "default_fast_period")]
    pub fast_period: usize,

    /// Slow SMA period (default: 30)
    #[serde(default = "default_slow_period")]
    pub slow_period: usize,

    /// Stop loss in percent of entry, 0 = disabled (default: 2.0)
    #[serde(default = "default_stop_loss_pct")]
    pub stop_loss_pct: f64,

    /// Take profit in percent of entry, 0 = disabled (default: 4.0)
    #[serde(default = "default_take_profit_pct")]
    pub take_profit_pct: f64,
}

fn default_fast_period() -> usize {
    10
}
fn default_slow_period() -> usize {
    30
}
fn default_stop_loss_pct() -> f64 {
    2.0
}
fn default_take_profit_pct() -> f64 {
    4.0
}

impl SmaCrossoverConfig {
    pub fn validate(&self) -> Result<(), StrategyError> {
        ensure_period("fast_period", self.fast_period)?;
        ensure_period("slow_period", self.slow_period)?;
        ensure_ordered("fast_period", self.fast_period, "slow_period", self.slow_period)?;
        ensure_protection_pcts(self.take_profit_pct, self.stop_loss_pct)
    }
}

impl Default for SmaCrossoverConfig {
    fn default() -> Self {
        Self {
            fast_period: default_fast_period(),
            slow_period: default_slow_period(),
            stop_loss_pct: default_stop_loss_pct(),
            take_profit_pct: default_take_profit_pct(),
        }
    }
}
