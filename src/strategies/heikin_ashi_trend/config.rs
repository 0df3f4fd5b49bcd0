//! Heikin-Ashi Trend Configuration

use serde::{Deserialize, Serialize};

use crate::error::StrategyError;
use crate::strategies::ensure_protection_pcts;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeikinAshiTrendConfig {
    /// Strong candles in a row needed to enter (default: 3)
    pub consecutive: usize,

    /// Wick size still treated as "no wick", as a fraction of price (default: 0)
    pub wick_tolerance: f64,

    /// Close on the first opposite-colour candle (default: true)
    pub exit_on_color_change: bool,

    pub allow_shorts: bool,
    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
}

impl HeikinAshiTrendConfig {
    pub fn validate(&self) -> Result<(), StrategyError> {
        if self.consecutive == 0 {
            return Err(StrategyError::invalid("consecutive", "must be at least 1"));
        }
        if !(self.wick_tolerance.is_finite() && self.wick_tolerance >= 0.0) {
            return Err(StrategyError::invalid("wick_tolerance", "must be zero or positive"));
        }
        ensure_protection_pcts(self.take_profit_pct, self.stop_loss_pct)
    }
}

impl Default for HeikinAshiTrendConfig {
    fn default() -> Self {
        Self {
            consecutive: 3,
            wick_tolerance: 0.0,
            exit_on_color_change: true,
            allow_shorts: true,
            stop_loss_pct: 2.0,
            take_profit_pct: 4.0,
        }
    }
}
