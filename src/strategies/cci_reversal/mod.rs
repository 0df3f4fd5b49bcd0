//! CCI Reversal Strategy
//!
//! Enters toward zero when the Commodity Channel Index leaves an extreme zone.

mod config;
mod strategy;

pub use config::CciReversalConfig;
pub use strategy::CciReversalStrategy;

use crate::{Config, Strategy};
use anyhow::Result;

/// Create strategy from config (called by registry)
pub fn create(config: &Config) -> Result<Box<dyn Strategy>> {
    let strategy_config: CciReversalConfig = super::parse_section(config, "cci_reversal")?;
    Ok(Box::new(CciReversalStrategy::new(strategy_config)?))
}
