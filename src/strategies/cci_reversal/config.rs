//! CCI Reversal Configuration

use serde::{Deserialize, Serialize};

use crate::error::{ensure_period, ensure_positive, StrategyError};
use crate::strategies::ensure_protection_pcts;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CciReversalConfig {
    /// CCI period (default: 20)
    #[serde(default = "default_cci_period")]
    pub cci_period: usize,

    /// Extreme zone boundary, applied as +level / -level (default: 100)
    #[serde(default = "default_level")]
    pub level: f64,

    /// Close the position when CCI crosses zero (default: false)
    #[serde(default)]
    pub exit_at_zero: bool,

    #[serde(default = "default_stop_loss_pct")]
    pub stop_loss_pct: f64,

    #[serde(default = "default_take_profit_pct")]
    pub take_profit_pct: f64,
}

fn default_cci_period() -> usize {
    20
}
fn default_level() -> f64 {
    100.0
}
fn default_stop_loss_pct() -> f64 {
    2.0
}
fn default_take_profit_pct() -> f64 {
    3.0
}

impl CciReversalConfig {
    pub fn validate(&self) -> Result<(), StrategyError> {
        ensure_period("cci_period", self.cci_period)?;
        ensure_positive("level", self.level)?;
        ensure_protection_pcts(self.take_profit_pct, self.stop_loss_pct)
    }
}

impl Default for CciReversalConfig {
    fn default() -> Self {
        Self {
            cci_period: default_cci_period(),
            level: default_level(),
            exit_at_zero: false,
            stop_loss_pct: default_stop_loss_pct(),
            take_profit_pct: default_take_profit_pct(),
        }
    }
}
