//! Keltner Breakout Configuration

use serde::{Deserialize, Serialize};

use crate::error::{ensure_period, ensure_positive, StrategyError};
use crate::strategies::ensure_protection_pcts;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeltnerBreakoutConfig {
    /// EMA / ATR period (default: 20)
    pub period: usize,

    /// Channel width in ATR multiples (default: 2.0)
    pub multiplier: f64,

    pub allow_shorts: bool,
    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
}

impl KeltnerBreakoutConfig {
    pub fn validate(&self) -> Result<(), StrategyError> {
        ensure_period("period", self.period)?;
        ensure_positive("multiplier", self.multiplier)?;
        ensure_protection_pcts(self.take_profit_pct, self.stop_loss_pct)
    }
}

impl Default for KeltnerBreakoutConfig {
    fn default() -> Self {
        Self {
            period: 20,
            multiplier: 2.0,
            allow_shorts: true,
            stop_loss_pct: 2.0,
            take_profit_pct: 6.0,
        }
    }
}
