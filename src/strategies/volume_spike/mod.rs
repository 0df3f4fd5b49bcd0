//! Volume Spike Strategy
//!
//! Follows unusually heavy volume when price momentum agrees with it.

mod config;
mod strategy;

pub use config::VolumeSpikeConfig;
pub use strategy::VolumeSpikeStrategy;

use crate::{Config, Strategy};
use anyhow::Result;

/// Create strategy from config (called by registry)
pub fn create(config: &Config) -> Result<Box<dyn Strategy>> {
    let strategy_config: VolumeSpikeConfig = super::parse_section(config, "volume_spike")?;
    Ok(Box::new(VolumeSpikeStrategy::new(strategy_config)?))
}
