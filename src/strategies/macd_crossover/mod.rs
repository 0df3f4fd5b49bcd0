//! MACD Crossover Strategy
//!
//! Follows MACD / signal line crosses, optionally only on the trend side of
//! the zero line.

mod config;
mod strategy;

pub use config::MacdCrossoverConfig;
pub use strategy::MacdCrossoverStrategy;

use crate::{Config, Strategy};
use anyhow::Result;

/// Create strategy from config (called by registry)
pub fn create(config: &Config) -> Result<Box<dyn Strategy>> {
    let strategy_config: MacdCrossoverConfig = super::parse_section(config, "macd_crossover")?;
    Ok(Box::new(MacdCrossoverStrategy::new(strategy_config)?))
}
