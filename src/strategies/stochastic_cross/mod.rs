//! Stochastic Cross Strategy
//!
//! %K / %D crosses, taken only inside the oversold or overbought zone.

mod config;
mod strategy;

pub use config::StochasticCrossConfig;
pub use strategy::StochasticCrossStrategy;

use crate::{Config, Strategy};
use anyhow::Result;

/// Create strategy from config (called by registry)
pub fn create(config: &Config) -> Result<Box<dyn Strategy>> {
    let strategy_config: StochasticCrossConfig = super::parse_section(config, "stochastic_cross")?;
    Ok(Box::new(StochasticCrossStrategy::new(strategy_config)?))
}
