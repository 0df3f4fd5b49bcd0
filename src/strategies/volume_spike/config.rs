//! Volume Spike Configuration

use serde::{Deserialize, Serialize};

use crate::error::{ensure_period, ensure_positive, StrategyError};
use crate::strategies::ensure_protection_pcts;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeSpikeConfig {
    /// Volume average period (default: 20)
    pub volume_period: usize,

    /// Spike threshold as a multiple of the average (default: 2.0)
    pub volume_multiplier: f64,

    /// Rate-of-change period confirming direction (default: 5)
    pub roc_period: usize,

    /// Minimum absolute ROC in percent (default: 0.0)
    pub min_roc: f64,

    /// Close after this many bars in the trade, 0 = hold (default: 10)
    pub max_hold_bars: usize,

    pub allow_shorts: bool,
    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
}

impl VolumeSpikeConfig {
    pub fn validate(&self) -> Result<(), StrategyError> {
        ensure_period("volume_period", self.volume_period)?;
        ensure_period("roc_period", self.roc_period)?;
        ensure_positive("volume_multiplier", self.volume_multiplier)?;
        if !(self.min_roc.is_finite() && self.min_roc >= 0.0) {
            return Err(StrategyError::invalid("min_roc", "must be zero or positive"));
        }
        ensure_protection_pcts(self.take_profit_pct, self.stop_loss_pct)
    }
}

impl Default for VolumeSpikeConfig {
    fn default() -> Self {
        Self {
            volume_period: 20,
            volume_multiplier: 2.0,
            roc_period: 5,
            min_roc: 0.0,
            max_hold_bars: 10,
            allow_shorts: true,
            stop_loss_pct: 1.5,
            take_profit_pct: 3.0,
        }
    }
}
