//! RSI Reversion Strategy
//!
//! Fades RSI extremes and exits once the oscillator is back at neutral.

mod config;
mod strategy;

pub use config::RsiReversionConfig;
pub use strategy::RsiReversionStrategy;

use crate::{Config, Strategy};
use anyhow::Result;

/// Create strategy from config (called by registry)
pub fn create(config: &Config) -> Result<Box<dyn Strategy>> {
    let strategy_config: RsiReversionConfig = super::parse_section(config, "rsi_reversion")?;
    Ok(Box::new(RsiReversionStrategy::new(strategy_config)?))
}
