//! SMA Crossover Strategy
//!
//! Always in the market: long while the fast SMA is above the slow SMA,
//! short while it is below. Positions flip on the cross.

mod config;
mod strategy;

pub use config::SmaCrossoverConfig;
pub use strategy::SmaCrossoverStrategy;

use crate::{Config, Strategy};
use anyhow::Result;

/// Create strategy from config (called by registry)
pub fn create(config: &Config) -> Result<Box<dyn Strategy>> {
    let strategy_config: SmaCrossoverConfig = super::parse_section(config, "sma_crossover")?;
    Ok(Box::new(SmaCrossoverStrategy::new(strategy_config)?))
}
