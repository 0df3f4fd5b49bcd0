//! ADX Trend Strategy
//!
//! Rides strong trends identified by ADX, taking direction from the DMI lines.

mod config;
mod strategy;

pub use config::AdxTrendConfig;
pub use strategy::AdxTrendStrategy;

use crate::{Config, Strategy};
use anyhow::Result;

/// Create strategy from config (called by registry)
pub fn create(config: &Config) -> Result<Box<dyn Strategy>> {
    let strategy_config: AdxTrendConfig = super::parse_section(config, "adx_trend")?;
    Ok(Box::new(AdxTrendStrategy::new(strategy_config)?))
}
