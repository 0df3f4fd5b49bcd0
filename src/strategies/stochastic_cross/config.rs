use serde::{Deserialize, Serialize};

use crate::error::{ensure_period, StrategyError};
use crate::strategies::ensure_protection_pcts;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StochasticCrossConfig {
    /// %K lookback (default: 14)
    pub k_period: usize,
    /// %K smoothing (default: 3)
    pub k_smoothing: usize,
    /// %D period (default: 3)
    pub d_period: usize,
    /// Bullish crosses count below this level (default: 20)
    pub oversold: f64,
    /// Bearish crosses count above this level (default: 80)
    pub overbought: f64,
    pub allow_shorts: bool,
    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
}

impl StochasticCrossConfig {
    pub fn validate(&self) -> Result<(), StrategyError> {
        ensure_period("k_period", self.k_period)?;
        ensure_period("k_smoothing", self.k_smoothing)?;
        ensure_period("d_period", self.d_period)?;
        if !(0.0 <= self.oversold && self.oversold < self.overbought && self.overbought <= 100.0) {
            return Err(StrategyError::invalid(
                "oversold",
                "expected 0 <= oversold < overbought <= 100",
            ));
        }
        ensure_protection_pcts(self.take_profit_pct, self.stop_loss_pct)
    }
}

impl Default for StochasticCrossConfig {
    fn default() -> Self {
        Self {
            k_period: 14,
            k_smoothing: 3,
            d_period: 3,
            oversold: 20.0,
            overbought: 80.0,
            allow_shorts: true,
            stop_loss_pct: 2.0,
            take_profit_pct: 3.0,
        }
    }
}
