//! Bollinger Band Reversion Strategy

mod config;
mod strategy;

pub use config::BollingerReversionConfig;
pub use strategy::BollingerReversionStrategy;

use crate::{Config, Strategy};
use anyhow::Result;

/// Create strategy from config (called by registry)
pub fn create(config: &Config) -> Result<Box<dyn Strategy>> {
    let strategy_config: BollingerReversionConfig =
        super::parse_section(config, "bollinger_reversion")?;
    Ok(Box::new(BollingerReversionStrategy::new(strategy_config)?))
}
