//! Inside Bar Breakout Strategy
//!
//! Waits for a bar contained in its predecessor (the "mother" bar) and trades
//! the first close beyond the mother bar's range.

mod config;
mod strategy;

pub use config::InsideBarBreakoutConfig;
pub use strategy::InsideBarBreakoutStrategy;

use crate::{Config, Strategy};
use anyhow::Result;

/// Create strategy from config (called by registry)
pub fn create(config: &Config) -> Result<Box<dyn Strategy>> {
    let strategy_config: InsideBarBreakoutConfig =
        super::parse_section(config, "inside_bar_breakout")?;
    Ok(Box::new(InsideBarBreakoutStrategy::new(strategy_config)?))
}
