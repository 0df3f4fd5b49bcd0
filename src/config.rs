//! Configuration management
//!
//! Handles loading and parsing of JSON configuration files. A `.env` file is
//! honoured for environment overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::data::TimeFrame;
use crate::error::StrategyError;
use crate::protection::ProtectionConfig;
use crate::Symbol;

/// Environment variable that overrides `backtest.data_dir`
pub const DATA_DIR_ENV: &str = "CANDLE_STRATEGIES_DATA_DIR";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_strategy_name")]
    pub strategy_name: String,
    /// Free-form parameters for the selected strategy
    #[serde(default = "empty_object")]
    pub strategy: serde_json::Value,
    #[serde(default)]
    pub trading: TradingConfig,
    #[serde(default)]
    pub exchange: ExchangeConfig,
    /// Overrides the strategy's own protection when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protection: Option<ProtectionConfig>,
    #[serde(default)]
    pub backtest: BacktestConfig,
    /// Grid search parameters for optimization (optional)
    /// Each key is a strategy param name, value is array of values to test
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid: Option<HashMap<String, Vec<serde_json::Value>>>,
}

fn default_strategy_name() -> String {
    "sma_crossover".to_string()
}

fn empty_object() -> serde_json::Value {
    serde_json::json!({})
}

impl Config {
    /// Load configuration from JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: Config =
            serde_json::from_str(&contents).context("Failed to parse config JSON")?;

        dotenv::dotenv().ok();
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            tracing::debug!(data_dir = %dir, "Data directory overridden from environment");
            config.backtest.data_dir = dir;
        }

        config.validate()?;
        Ok(config)
    }

    /// Sanity checks that do not depend on the strategy
    pub fn validate(&self) -> Result<(), StrategyError> {
        if !(self.trading.volume.is_finite() && self.trading.volume > 0.0) {
            return Err(StrategyError::Config(format!(
                "trading.volume must be positive, got {}",
                self.trading.volume
            )));
        }
        if !(self.trading.initial_capital.is_finite() && self.trading.initial_capital > 0.0) {
            return Err(StrategyError::Config(format!(
                "trading.initial_capital must be positive, got {}",
                self.trading.initial_capital
            )));
        }
        if self.trading.max_position < 0.0 {
            return Err(StrategyError::Config(
                "trading.max_position must be >= 0 (0 disables the limit)".to_string(),
            ));
        }
        if self.exchange.commission < 0.0 || self.exchange.slippage < 0.0 {
            return Err(StrategyError::Config(
                "exchange.commission and exchange.slippage must be >= 0".to_string(),
            ));
        }
        self.timeframe()?;
        Ok(())
    }

    pub fn symbol(&self) -> Symbol {
        Symbol::new(&self.trading.symbol)
    }

    pub fn timeframe(&self) -> Result<TimeFrame, StrategyError> {
        self.trading.timeframe.parse()
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            strategy_name: default_strategy_name(),
            strategy: empty_object(),
            trading: TradingConfig::default(),
            exchange: ExchangeConfig::default(),
            protection: None,
            backtest: BacktestConfig::default(),
            grid: None,
        }
    }
}

/// Instrument and sizing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TradingConfig {
    pub symbol: String,
    /// Candle time frame, e.g. "1h"
    pub timeframe: String,
    /// Base order volume
    pub volume: f64,
    pub initial_capital: f64,
    /// Largest absolute position allowed (0 = unlimited)
    pub max_position: f64,
    /// Candles to observe before orders are accepted
    pub warmup_bars: usize,
}

impl Default for TradingConfig {
    fn default() -> Self {
        TradingConfig {
            symbol: "BTCUSDT".to_string(),
            timeframe: "1h".to_string(),
            volume: 1.0,
            initial_capital: 100_000.0,
            max_position: 0.0,
            warmup_bars: 0,
        }
    }
}

/// Execution costs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    /// Fraction of traded notional charged per fill
    pub commission: f64,
    /// Fraction of price lost per fill
    pub slippage: f64,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        ExchangeConfig {
            commission: 0.001, // 0.1%
            slippage: 0.0,
        }
    }
}

/// Backtest configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    pub data_dir: String,
    /// Inclusive start date (YYYY-MM-DD)
    pub start: Option<String>,
    /// Inclusive end date (YYYY-MM-DD)
    pub end: Option<String>,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            data_dir: "data".to_string(),
            start: None,
            end: None,
        }
    }
}
