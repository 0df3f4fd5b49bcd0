//! Polynomial Regression Reversion Strategy
//!
//! Fits a low-degree polynomial to the recent closes and fades closes that
//! stray too far from the curve, measured in residual standard deviations.

mod config;
mod strategy;

pub use config::PolynomialRegressionConfig;
pub use strategy::PolynomialRegressionStrategy;

use crate::{Config, Strategy};
use anyhow::Result;

/// Create strategy from config (called by registry)
pub fn create(config: &Config) -> Result<Box<dyn Strategy>> {
    let strategy_config: PolynomialRegressionConfig =
        super::parse_section(config, "polynomial_regression")?;
    Ok(Box::new(PolynomialRegressionStrategy::new(strategy_config)?))
}
