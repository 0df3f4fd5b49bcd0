//! RSI Reversion Configuration

use serde::{Deserialize, Serialize};

use crate::error::{ensure_period, StrategyError};
use crate::strategies::ensure_protection_pcts;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RsiReversionConfig {
    /// RSI period (default: 14)
    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,

    /// Buy below this level (default: 30)
    #[serde(default = "default_oversold")]
    pub oversold: f64,

    /// Sell above this level (default: 70)
    #[serde(default = "default_overbought")]
    pub overbought: f64,

    /// Positions close when RSI crosses this level (default: 50)
    #[serde(default = "default_exit_level")]
    pub exit_level: f64,

    #[serde(default = "default_allow_shorts")]
    pub allow_shorts: bool,

    #[serde(default = "default_stop_loss_pct")]
    pub stop_loss_pct: f64,

    #[serde(default = "default_take_profit_pct")]
    pub take_profit_pct: f64,
}

fn default_rsi_period() -> usize {
    14
}
fn default_oversold() -> f64 {
    30.0
}
fn default_overbought() -> f64 {
    70.0
}
fn default_exit_level() -> f64 {
    50.0
}
fn default_allow_shorts() -> bool {
    true
}
fn default_stop_loss_pct() -> f64 {
    3.0
}
fn default_take_profit_pct() -> f64 {
    0.0
}

impl RsiReversionConfig {
    pub fn validate(&self) -> Result<(), StrategyError> {
        ensure_period("rsi_period", self.rsi_period)?;
        if !(0.0 < self.oversold
            && self.oversold < self.exit_level
            && self.exit_level < self.overbought
            && self.overbought < 100.0)
        {
            return Err(StrategyError::invalid(
                "exit_level",
                format!(
                    "levels must satisfy 0 < oversold ({}) < exit_level ({}) < overbought ({}) < 100",
                    self.oversold, self.exit_level, self.overbought
                ),
            ));
        }
        ensure_protection_pcts(self.take_profit_pct, self.stop_loss_pct)
    }
}

impl Default for RsiReversionConfig {
    fn default() -> Self {
        Self {
            rsi_period: default_rsi_period(),
            oversold: default_oversold(),
            overbought: default_overbought(),
            exit_level: default_exit_level(),
            allow_shorts: default_allow_shorts(),
            stop_loss_pct: default_stop_loss_pct(),
            take_profit_pct: default_take_profit_pct(),
        }
    }
}
