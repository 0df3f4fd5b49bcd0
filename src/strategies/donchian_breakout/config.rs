//! Donchian Breakout Configuration

use serde::{Deserialize, Serialize};

use crate::error::{ensure_period, ensure_positive, StrategyError};
use crate::strategies::ensure_protection_pcts;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DonchianBreakoutConfig {
    /// Channel lookback, excluding the current bar (default: 20)
    #[serde(default = "default_lookback")]
    pub lookback: usize,

    /// ATR period for the exit stop (default: 14)
    #[serde(default = "default_atr_period")]
    pub atr_period: usize,

    /// Stop distance in ATR multiples (default: 2.0)
    #[serde(default = "default_atr_stop")]
    pub atr_stop: f64,

    /// Allow short positions (default: true)
    #[serde(default = "default_allow_shorts")]
    pub allow_shorts: bool,

    /// Host-side stops; the ATR exit already covers risk (default: 0 = off)
    #[serde(default)]
    pub stop_loss_pct: f64,

    #[serde(default)]
    pub take_profit_pct: f64,
}

fn default_lookback() -> usize {
    20
}
fn default_atr_period() -> usize {
    14
}
fn default_atr_stop() -> f64 {
    2.0
}
fn default_allow_shorts() -> bool {
    true
}

impl DonchianBreakoutConfig {
    pub fn validate(&self) -> Result<(), StrategyError> {
        ensure_period("lookback", self.lookback)?;
        ensure_period("atr_period", self.atr_period)?;
        ensure_positive("atr_stop", self.atr_stop)?;
        ensure_protection_pcts(self.take_profit_pct, self.stop_loss_pct)
    }
}

impl Default for DonchianBreakoutConfig {
    fn default() -> Self {
        Self {
            lookback: default_lookback(),
            atr_period: default_atr_period(),
            atr_stop: default_atr_stop(),
            allow_shorts: default_allow_shorts(),
            stop_loss_pct: 0.0,
            take_profit_pct: 0.0,
        }
    }
}
