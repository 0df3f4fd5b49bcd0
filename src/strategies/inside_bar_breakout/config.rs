use serde::{Deserialize, Serialize};

use crate::error::StrategyError;
use crate::strategies::ensure_protection_pcts;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsideBarBreakoutConfig {
    /// Bars after the inside bar during which a breakout counts (default: 3)
    #[serde(default = "default_setup_bars")]
    pub setup_bars: usize,

    #[serde(default = "default_allow_shorts")]
    pub allow_shorts: bool,

    #[serde(default = "default_stop_loss_pct")]
    pub stop_loss_pct: f64,

    #[serde(default = "default_take_profit_pct")]
    pub take_profit_pct: f64,
}

fn default_setup_bars() -> usize {
    3
}
fn default_allow_shorts() -> bool {
    true
}
fn default_stop_loss_pct() -> f64 {
    1.5
}
fn default_take_profit_pct() -> f64 {
    3.0
}

impl InsideBarBreakoutConfig {
    pub fn validate(&self) -> Result<(), StrategyError> {
        if self.setup_bars == 0 {
            return Err(StrategyError::invalid("setup_bars", "must be at least 1"));
        }
        ensure_protection_pcts(self.take_profit_pct, self.stop_loss_pct)
    }
}

impl Default for InsideBarBreakoutConfig {
    fn default() -> Self {
        Self {
            setup_bars: default_setup_bars(),
            allow_shorts: default_allow_shorts(),
            stop_loss_pct: default_stop_loss_pct(),
            take_profit_pct: default_take_profit_pct(),
        }
    }
}
