//! Helpers for driving strategies in unit tests

use chrono::{Duration, TimeZone, Utc};

use super::{OrderRequest, Strategy, StrategyContext};
use crate::{Candle, Symbol};

pub fn bar(i: usize, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Candle {
    let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::hours(i as i64);
    Candle::new_unchecked(ts, open, high, low, close, volume)
}

/// Candles following a close path with a fixed 0.5 wick each side
pub fn from_closes(closes: &[f64]) -> Vec<Candle> {
    let mut prev = closes.first().copied().unwrap_or(100.0);
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = prev;
            prev = close;
            bar(i, open, open.max(close) + 0.5, open.min(close) - 0.5, close, 1000.0)
        })
        .collect()
}

/// Feed candles and apply every order immediately; returns (bar index, order) pairs
pub fn drive(strategy: &mut dyn Strategy, candles: &[Candle]) -> Vec<(usize, OrderRequest)> {
    let symbol = Symbol::new("TEST");
    let mut position = 0.0;
    let mut fills = Vec::new();
    for (i, candle) in candles.iter().enumerate() {
        let mut ctx = StrategyContext::new(&symbol, candle.datetime, position, 1.0, true);
        strategy.on_candle(candle, &mut ctx);
        position = ctx.position();
        fills.extend(ctx.into_orders().into_iter().map(|o| (i, o)));
    }
    fills
}

/// Net position after applying `orders`
pub fn net_position(orders: &[(usize, OrderRequest)]) -> f64 {
    orders.iter().map(|(_, o)| o.side.sign() * o.volume).sum()
}
