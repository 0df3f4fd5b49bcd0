//! Strategy catalog
//!
//! Every strategy is a small, self-contained unit:
//! - indicators built from its own config section
//! - a candle callback that checks a handful of conditions
//! - market orders issued through [`StrategyContext`]
//! - optional stop-loss / take-profit through [`Strategy::protection`]
//!
//! Strategies never touch order routing or position bookkeeping directly;
//! the host drains the order requests collected in the context.

pub mod adx_trend;
pub mod bollinger_reversion;
pub mod cci_reversal;
pub mod donchian_breakout;
pub mod ema_rsi_trend;
pub mod heikin_ashi_trend;
pub mod inside_bar_breakout;
pub mod keltner_breakout;
pub mod macd_crossover;
pub mod polynomial_regression;
pub mod rsi_reversion;
pub mod sma_crossover;
pub mod stochastic_cross;
pub mod triple_ema;
pub mod volume_spike;
pub mod williams_r_reversal;

#[cfg(test)]
pub(crate) mod test_support;

use crate::error::StrategyError;
use crate::protection::ProtectionConfig;
use crate::{Candle, Config, Order, OrderStatus, Side, Symbol, Trade};
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

// =============================================================================
// Strategy Trait - The contract all strategies must implement
// =============================================================================

/// Trading strategy driven by finished candles.
pub trait Strategy: Send {
    /// Strategy identifier (matches the registry key)
    fn name(&self) -> &'static str;

    /// Protective stop-loss / take-profit the host should attach to positions
    fn protection(&self) -> Option<ProtectionConfig> {
        None
    }

    /// Called once before the first candle
    fn on_started(&mut self) {
        tracing::info!(strategy = self.name(), "Strategy started");
    }

    /// Process one finished candle. Orders go through `ctx`.
    fn on_candle(&mut self, candle: &Candle, ctx: &mut StrategyContext<'_>);

    /// Notification when an order state changes
    fn notify_order(&mut self, order: &Order) {
        match order.status {
            OrderStatus::Done => {
                tracing::debug!(
                    symbol = %order.symbol,
                    side = ?order.side,
                    price = order.price,
                    volume = order.volume,
                    "Order executed"
                );
            }
            OrderStatus::Rejected => {
                tracing::warn!(symbol = %order.symbol, side = ?order.side, "Order rejected");
            }
            OrderStatus::Pending => {}
        }
    }

    /// Notification when a position is closed
    fn notify_trade(&mut self, trade: &Trade) {
        tracing::debug!(
            symbol = %trade.symbol,
            pnl = %trade.net_pnl,
            return_pct = format!("{:.2}%", trade.return_pct()),
            reason = %trade.exit_reason,
            "Trade closed"
        );
    }

    /// Drop all indicator state
    fn reset(&mut self);
}

// =============================================================================
// Strategy Context - what a strategy sees and can do on each candle
// =============================================================================

/// Market order request collected from a strategy
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    pub symbol: Symbol,
    pub side: Side,
    pub volume: f64,
    pub comment: Option<String>,
}

impl OrderRequest {
    pub fn market_buy(symbol: Symbol, volume: f64) -> Self {
        Self {
            symbol,
            side: Side::Buy,
            volume,
            comment: None,
        }
    }

    pub fn market_sell(symbol: Symbol, volume: f64) -> Self {
        Self {
            symbol,
            side: Side::Sell,
            volume,
            comment: None,
        }
    }
}

/// Per-candle view of the instrument handed to [`Strategy::on_candle`].
///
/// `position()` reflects orders already requested during this callback, so
/// calling `close_position()` followed by `go_short()` does not double up.
#[derive(Debug)]
pub struct StrategyContext<'a> {
    symbol: &'a Symbol,
    time: DateTime<Utc>,
    position: f64,
    volume: f64,
    allow_trading: bool,
    orders: Vec<OrderRequest>,
}

impl<'a> StrategyContext<'a> {
    pub fn new(
        symbol: &'a Symbol,
        time: DateTime<Utc>,
        position: f64,
        volume: f64,
        allow_trading: bool,
    ) -> Self {
        Self {
            symbol,
            time,
            position,
            volume,
            allow_trading,
            orders: Vec::new(),
        }
    }

    pub fn symbol(&self) -> &Symbol {
        self.symbol
    }

    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }

    /// Signed net position: positive long, negative short
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Base order volume
    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn is_trading_allowed(&self) -> bool {
        self.allow_trading
    }

    pub fn is_long(&self) -> bool {
        self.position > 0.0
    }

    pub fn is_short(&self) -> bool {
        self.position < 0.0
    }

    pub fn is_flat(&self) -> bool {
        self.position == 0.0
    }

    /// Queue a market buy. Returns false when the request was dropped.
    pub fn buy_market(&mut self, volume: f64) -> bool {
        self.submit(Side::Buy, volume)
    }

    /// Queue a market sell. Returns false when the request was dropped.
    pub fn sell_market(&mut self, volume: f64) -> bool {
        self.submit(Side::Sell, volume)
    }

    /// Flatten whatever is open
    pub fn close_position(&mut self) -> bool {
        if self.position > 0.0 {
            self.sell_market(self.position)
        } else if self.position < 0.0 {
            self.buy_market(-self.position)
        } else {
            false
        }
    }

    /// Become long one base volume, reversing a short in the same order
    pub fn go_long(&mut self) -> bool {
        if self.is_long() {
            return false;
        }
        self.buy_market(self.volume + self.position.abs())
    }

    /// Become short one base volume, reversing a long in the same order
    pub fn go_short(&mut self) -> bool {
        if self.is_short() {
            return false;
        }
        self.sell_market(self.volume + self.position.abs())
    }

    /// Attach a comment to the last queued order
    pub fn with_comment(&mut self, comment: impl Into<String>) {
        if let Some(order) = self.orders.last_mut() {
            order.comment = Some(comment.into());
        }
    }

    /// Requests collected so far, in submission order
    pub fn orders(&self) -> &[OrderRequest] {
        &self.orders
    }

    pub fn into_orders(self) -> Vec<OrderRequest> {
        self.orders
    }

    fn submit(&mut self, side: Side, volume: f64) -> bool {
        if !self.allow_trading {
            tracing::trace!(symbol = %self.symbol, ?side, "Trading not allowed yet, order dropped");
            return false;
        }
        if !volume.is_finite() || volume <= 0.0 {
            tracing::warn!(symbol = %self.symbol, ?side, volume, "Ignoring non-positive order volume");
            return false;
        }

        let request = match side {
            Side::Buy => OrderRequest::market_buy(self.symbol.clone(), volume),
            Side::Sell => OrderRequest::market_sell(self.symbol.clone(), volume),
        };
        self.position += side.sign() * volume;
        self.orders.push(request);
        true
    }
}

// =============================================================================
// Strategy Factory - Type alias for strategy constructor functions
// =============================================================================

/// Factory function type for creating strategies from config
pub type StrategyFactory = fn(&Config) -> Result<Box<dyn Strategy>>;

// =============================================================================
// Strategy Registry - Dynamic registration without hardcoding
// =============================================================================

static REGISTRY: OnceLock<RwLock<HashMap<&'static str, StrategyFactory>>> = OnceLock::new();

fn get_registry() -> &'static RwLock<HashMap<&'static str, StrategyFactory>> {
    REGISTRY.get_or_init(|| {
        let entries: [(&'static str, StrategyFactory); 16] = [
            ("adx_trend", adx_trend::create),
            ("bollinger_reversion", bollinger_reversion::create),
            ("cci_reversal", cci_reversal::create),
            ("donchian_breakout", donchian_breakout::create),
            ("ema_rsi_trend", ema_rsi_trend::create),
            ("heikin_ashi_trend", heikin_ashi_trend::create),
            ("inside_bar_breakout", inside_bar_breakout::create),
            ("keltner_breakout", keltner_breakout::create),
            ("macd_crossover", macd_crossover::create),
            ("polynomial_regression", polynomial_regression::create),
            ("rsi_reversion", rsi_reversion::create),
            ("sma_crossover", sma_crossover::create),
            ("stochastic_cross", stochastic_cross::create),
            ("triple_ema", triple_ema::create),
            ("volume_spike", volume_spike::create),
            ("williams_r_reversal", williams_r_reversal::create),
        ];
        RwLock::new(entries.into_iter().collect())
    })
}

/// Create a strategy from configuration
pub fn create_strategy(config: &Config) -> Result<Box<dyn Strategy>> {
    let factory = {
        let registry = get_registry().read().unwrap_or_else(|e| e.into_inner());
        registry.get(config.strategy_name.as_str()).copied()
    };

    match factory {
        Some(factory) => factory(config),
        None => Err(StrategyError::UnknownStrategy {
            name: config.strategy_name.clone(),
            available: available_strategies().join(", "),
        }
        .into()),
    }
}

/// Sorted list of registered strategy names
pub fn available_strategies() -> Vec<&'static str> {
    let registry = get_registry().read().unwrap_or_else(|e| e.into_inner());
    let mut names: Vec<_> = registry.keys().copied().collect();
    names.sort_unstable();
    names
}

/// Register a new strategy (for plugins or testing)
pub fn register_strategy(name: &'static str, factory: StrategyFactory) {
    get_registry()
        .write()
        .unwrap_or_else(|e| e.into_inner())
        .insert(name, factory);
}

/// Percent stop-loss / take-profit from a strategy config; `None` when both are zero
pub(crate) fn percent_protection(
    take_profit_pct: f64,
    stop_loss_pct: f64,
) -> Option<ProtectionConfig> {
    let protection = ProtectionConfig::percent(take_profit_pct, stop_loss_pct);
    (!protection.is_empty()).then_some(protection)
}

/// Protection percentages may be zero (disabled) but never negative
pub(crate) fn ensure_protection_pcts(
    take_profit_pct: f64,
    stop_loss_pct: f64,
) -> Result<(), StrategyError> {
    for (name, value) in [("take_profit_pct", take_profit_pct), ("stop_loss_pct", stop_loss_pct)] {
        if !value.is_finite() || value < 0.0 {
            return Err(StrategyError::invalid(
                name,
                format!("must be zero or positive, got {}", value),
            ));
        }
    }
    Ok(())
}

/// Deserialize a strategy's config section, naming the strategy on failure
pub(crate) fn parse_section<T: serde::de::DeserializeOwned>(
    config: &Config,
    strategy: &str,
) -> Result<T> {
    use anyhow::Context;
    serde_json::from_value(config.strategy.clone())
        .with_context(|| format!("Invalid '{}' strategy parameters", strategy))
}
