//! EMA + RSI Trend Configuration

use serde::{Deserialize, Serialize};

use crate::error::{ensure_period, StrategyError};
use crate::strategies::ensure_protection_pcts;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmaRsiTrendConfig {
    /// Trend EMA period (default: 50)
    pub ema_period: usize,

    /// RSI period (default: 14)
    pub rsi_period: usize,

    /// RSI level that confirms long momentum (default: 55)
    pub long_level: f64,

    /// RSI level that confirms short momentum (default: 45)
    pub short_level: f64,

    /// Allow short positions (default: true)
    pub allow_shorts: bool,

    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
}

impl EmaRsiTrendConfig {
    pub fn validate(&self) -> Result<(), StrategyError> {
        ensure_period("ema_period", self.ema_period)?;
        ensure_period("rsi_period", self.rsi_period)?;
        for (name, level) in [("long_level", self.long_level), ("short_level", self.short_level)] {
            if !(0.0..=100.0).contains(&level) {
                return Err(StrategyError::invalid(name, "RSI level must be within 0..=100"));
            }
        }
        if self.short_level > self.long_level {
            return Err(StrategyError::invalid(
                "short_level",
                "must not be above long_level",
            ));
        }
        ensure_protection_pcts(self.take_profit_pct, self.stop_loss_pct)
    }
}

impl Default for EmaRsiTrendConfig {
    fn default() -> Self {
        Self {
            ema_period: 50,
            rsi_period: 14,
            long_level: 55.0,
            short_level: 45.0,
            allow_shorts: true,
            stop_loss_pct: 2.0,
            take_profit_pct: 5.0,
        }
    }
}
