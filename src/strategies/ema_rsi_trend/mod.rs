//! EMA + RSI Trend Strategy
//!
//! Trades RSI momentum only in the direction of the EMA trend.

mod config;
mod strategy;

pub use config::EmaRsiTrendConfig;
pub use strategy::EmaRsiTrendStrategy;

use crate::{Config, Strategy};
use anyhow::Result;

/// Create strategy from config (called by registry)
pub fn create(config: &Config) -> Result<Box<dyn Strategy>> {
    let strategy_config: EmaRsiTrendConfig = super::parse_section(config, "ema_rsi_trend")?;
    Ok(Box::new(EmaRsiTrendStrategy::new(strategy_config)?))
}
