//! Polynomial Regression Configuration

use serde::{Deserialize, Serialize};

use crate::error::{ensure_positive, StrategyError};
use crate::strategies::ensure_protection_pcts;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolynomialRegressionConfig {
    /// Regression window (default: 20)
    #[serde(default = "default_period")]
    pub period: usize,

    /// Polynomial degree, 1..=6 (default: 2)
    #[serde(default = "default_degree")]
    pub degree: usize,

    /// Entry deviation in residual standard deviations (default: 2.0)
    #[serde(default = "default_deviation")]
    pub deviation: f64,

    #[serde(default = "default_allow_shorts")]
    pub allow_shorts: bool,

    #[serde(default = "default_stop_loss_pct")]
    pub stop_loss_pct: f64,

    #[serde(default)]
    pub take_profit_pct: f64,
}

fn default_period() -> usize {
    20
}
fn default_degree() -> usize {
    2
}
fn default_deviation() -> f64 {
    2.0
}
fn default_allow_shorts() -> bool {
    true
}
fn default_stop_loss_pct() -> f64 {
    2.0
}

impl PolynomialRegressionConfig {
    /// Period/degree bounds are enforced when the regression is built
    pub fn validate(&self) -> Result<(), StrategyError> {
        ensure_positive("deviation", self.deviation)?;
        ensure_protection_pcts(self.take_profit_pct, self.stop_loss_pct)
    }
}

impl Default for PolynomialRegressionConfig {
    fn default() -> Self {
        Self {
            period: default_period(),
            degree: default_degree(),
            deviation: default_deviation(),
            allow_shorts: default_allow_shorts(),
            stop_loss_pct: default_stop_loss_pct(),
            take_profit_pct: 0.0,
        }
    }
}
