use serde::{Deserialize, Serialize};

use crate::error::{ensure_period, StrategyError};
use crate::strategies::ensure_protection_pcts;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WilliamsRReversalConfig {
    /// Lookback (default: 14)
    pub period: usize,
    /// Oversold boundary on the -100..0 scale (default: -80)
    pub oversold: f64,
    /// Overbought boundary (default: -20)
    pub overbought: f64,
    pub allow_shorts: bool,
    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
}

impl WilliamsRReversalConfig {
    pub fn validate(&self) -> Result<(), StrategyError> {
        ensure_period("period", self.period)?;
        if !(-100.0 <= self.oversold && self.oversold < self.overbought && self.overbought <= 0.0) {
            return Err(StrategyError::invalid(
                "oversold",
                "expected -100 <= oversold < overbought <= 0",
            ));
        }
        ensure_protection_pcts(self.take_profit_pct, self.stop_loss_pct)
    }
}

impl Default for WilliamsRReversalConfig {
    fn default() -> Self {
        Self {
            period: 14,
            oversold: -80.0,
            overbought: -20.0,
            allow_shorts: true,
            stop_loss_pct: 2.0,
            take_profit_pct: 3.0,
        }
    }
}
