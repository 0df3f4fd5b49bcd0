//! Heikin-Ashi Trend Strategy
//!
//! Enters after a run of strong Heikin-Ashi candles (no wick against the
//! trend) and leaves on the first candle of the opposite colour.

mod config;
mod strategy;

pub use config::HeikinAshiTrendConfig;
pub use strategy::HeikinAshiTrendStrategy;

use crate::{Config, Strategy};
use anyhow::Result;

/// Create strategy from config (called by registry)
pub fn create(config: &Config) -> Result<Box<dyn Strategy>> {
    let strategy_config: HeikinAshiTrendConfig =
        super::parse_section(config, "heikin_ashi_trend")?;
    Ok(Box::new(HeikinAshiTrendStrategy::new(strategy_config)?))
}
