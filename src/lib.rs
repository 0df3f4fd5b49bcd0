//! Candle Strategies
//!
//! A catalog of candle-driven trading strategies. Each strategy feeds finished
//! candles into a few indicators, checks threshold or crossover conditions and
//! issues market orders, optionally guarded by stop-loss / take-profit
//! protection. A replay backtester and a parallel grid optimizer drive them
//! over historical CSV data.

pub mod backtest;
pub mod config;
pub mod data;
pub mod error;
pub mod grid;
pub mod indicators;
pub mod optimizer;
pub mod protection;
pub mod strategies;
pub mod types;

pub use config::Config;
pub use error::StrategyError;
pub use protection::{ProtectionConfig, ProtectionTracker, Unit};
pub use strategies::{create_strategy, Strategy, StrategyContext};
pub use types::*;
