//! ADX Trend Configuration

use serde::{Deserialize, Serialize};

use crate::error::{ensure_period, StrategyError};
use crate::strategies::ensure_protection_pcts;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdxTrendConfig {
    /// DMI / ADX period (default: 14)
    #[serde(default = "default_adx_period")]
    pub adx_period: usize,

    /// Minimum ADX to open a position (default: 25)
    #[serde(default = "default_entry_threshold")]
    pub entry_threshold: f64,

    /// Close when ADX drops below this (default: 20)
    #[serde(default = "default_exit_threshold")]
    pub exit_threshold: f64,

    #[serde(default = "default_allow_shorts")]
    pub allow_shorts: bool,

    #[serde(default = "default_stop_loss_pct")]
    pub stop_loss_pct: f64,

    #[serde(default = "default_take_profit_pct")]
    pub take_profit_pct: f64,
}

fn default_adx_period() -> usize {
    14
}
fn default_entry_threshold() -> f64 {
    25.0
}
fn default_exit_threshold() -> f64 {
    20.0
}
fn default_allow_shorts() -> bool {
    true
}
fn default_stop_loss_pct() -> f64 {
    2.5
}
fn default_take_profit_pct() -> f64 {
    0.0
}

impl AdxTrendConfig {
    pub fn validate(&self) -> Result<(), StrategyError> {
        ensure_period("adx_period", self.adx_period)?;
        if !(0.0..=100.0).contains(&self.entry_threshold) {
            return Err(StrategyError::invalid("entry_threshold", "must be within 0..=100"));
        }
        if self.exit_threshold > self.entry_threshold || self.exit_threshold < 0.0 {
            return Err(StrategyError::invalid(
                "exit_threshold",
                format!(
                    "must be within 0..=entry_threshold ({}), got {}",
                    self.entry_threshold, self.exit_threshold
                ),
            ));
        }
        ensure_protection_pcts(self.take_profit_pct, self.stop_loss_pct)
    }
}

impl Default for AdxTrendConfig {
    fn default() -> Self {
        Self {
            adx_period: default_adx_period(),
            entry_threshold: default_entry_threshold(),
            exit_threshold: default_exit_threshold(),
            allow_shorts: default_allow_shorts(),
            stop_loss_pct: default_stop_loss_pct(),
            take_profit_pct: default_take_profit_pct(),
        }
    }
}
