//! Bollinger Band Reversion Configuration

use serde::{Deserialize, Serialize};

use crate::error::{ensure_positive, StrategyError};
use crate::strategies::ensure_protection_pcts;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BollingerReversionConfig {
    /// Band period (default: 20)
    pub period: usize,

    /// Band width in standard deviations (default: 2.0)
    pub width: f64,

    /// Allow short positions (default: true)
    pub allow_shorts: bool,

    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
}

impl BollingerReversionConfig {
    pub fn validate(&self) -> Result<(), StrategyError> {
        // A single-sample band has zero width
        if self.period < 2 {
            return Err(StrategyError::invalid("period", "must be at least 2"));
        }
        ensure_positive("width", self.width)?;
        ensure_protection_pcts(self.take_profit_pct, self.stop_loss_pct)
    }
}

impl Default for BollingerReversionConfig {
    fn default() -> Self {
        Self {
            period: 20,
            width: 2.0,
            allow_shorts: true,
            stop_loss_pct: 2.0,
            take_profit_pct: 0.0,
        }
    }
}
