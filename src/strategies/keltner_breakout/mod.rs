//! Keltner Channel Breakout Strategy

mod config;
mod strategy;

pub use config::KeltnerBreakoutConfig;
pub use strategy::KeltnerBreakoutStrategy;

use crate::{Config, Strategy};
use anyhow::Result;

/// Create strategy from config (called by registry)
pub fn create(config: &Config) -> Result<Box<dyn Strategy>> {
    let strategy_config: KeltnerBreakoutConfig = super::parse_section(config, "keltner_breakout")?;
    Ok(Box::new(KeltnerBreakoutStrategy::new(strategy_config)?))
}
