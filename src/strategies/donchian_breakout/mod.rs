//! Donchian Breakout Strategy
//!
//! Classic channel breakout: follow a close beyond the prior N-bar extreme
//! and exit on an ATR-multiple stop tracked by the strategy itself.

mod config;
mod strategy;

pub use config::DonchianBreakoutConfig;
pub use strategy::DonchianBreakoutStrategy;

use crate::{Config, Strategy};
use anyhow::Result;

/// Create strategy from config (called by registry)
pub fn create(config: &Config) -> Result<Box<dyn Strategy>> {
    let strategy_config: DonchianBreakoutConfig =
        super::parse_section(config, "donchian_breakout")?;
    Ok(Box::new(DonchianBreakoutStrategy::new(strategy_config)?))
}
