//! Triple EMA Alignment Strategy
//!
//! Holds a position only while three EMAs are stacked in trend order.

mod config;
mod strategy;

pub use config::TripleEmaConfig;
pub use strategy::TripleEmaStrategy;

use crate::{Config, Strategy};
use anyhow::Result;

/// Create strategy from config (called by registry)
pub fn create(config: &Config) -> Result<Box<dyn Strategy>> {
    let strategy_config: TripleEmaConfig = super::parse_section(config, "triple_ema")?;
    Ok(Box::new(TripleEmaStrategy::new(strategy_config)?))
}
