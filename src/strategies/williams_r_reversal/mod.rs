//! Williams %R Reversal Strategy
//!
//! Trades the exit from Williams %R extremes.

mod config;
mod strategy;

pub use config::WilliamsRReversalConfig;
pub use strategy::WilliamsRReversalStrategy;

use crate::{Config, Strategy};
use anyhow::Result;

/// Create strategy from config (called by registry)
pub fn create(config: &Config) -> Result<Box<dyn Strategy>> {
    let strategy_config: WilliamsRReversalConfig =
        super::parse_section(config, "williams_r_reversal")?;
    Ok(Box::new(WilliamsRReversalStrategy::new(strategy_config)?))
}
