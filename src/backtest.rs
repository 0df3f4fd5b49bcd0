//! Backtesting engine
//!
//! Replays finished candles through a strategy. Market orders fill at the
//! candle close with commission and slippage; protective exits are checked
//! against each candle's range before the strategy sees it.

use chrono::{DateTime, Utc};

use crate::protection::{ProtectionConfig, ProtectionTracker};
use crate::strategies::{OrderRequest, StrategyContext};
use crate::{
    Candle, Config, ExitReason, Money, Order, OrderStatus, OrderType, PerformanceMetrics, Side,
    Strategy, Symbol, Trade,
};

const POSITION_EPSILON: f64 = 1e-9;

/// Annualization used when the configured time frame cannot be parsed
const FALLBACK_PERIODS_PER_YEAR: f64 = 365.0;

/// Net position on the traded instrument
#[derive(Debug, Clone, Default)]
struct Book {
    /// Signed quantity: positive long, negative short
    position: f64,
    avg_price: f64,
    entry_time: Option<DateTime<Utc>>,
    /// Entry commission on the open quantity, charged to the trade that closes it
    entry_commission: Money,
}

impl Book {
    fn is_flat(&self) -> bool {
        self.position.abs() < POSITION_EPSILON
    }

    fn side(&self) -> Option<Side> {
        if self.position > POSITION_EPSILON {
            Some(Side::Buy)
        } else if self.position < -POSITION_EPSILON {
            Some(Side::Sell)
        } else {
            None
        }
    }
}

/// Backtest engine
pub struct Backtester {
    config: Config,
    strategy: Box<dyn Strategy>,
    symbol: Symbol,
    protection: Option<ProtectionConfig>,
    periods_per_year: f64,

    cash: Money,
    book: Book,
    tracker: Option<ProtectionTracker>,
    next_order_id: u64,
    trades: Vec<Trade>,
    orders: Vec<Order>,
}

impl Backtester {
    pub fn new(config: Config, strategy: Box<dyn Strategy>) -> Self {
        // A protection section in the config replaces the strategy's own
        let protection = match config.protection {
            Some(p) => (!p.is_empty()).then_some(p),
            None => strategy.protection(),
        };

        let periods_per_year = match config.timeframe() {
            Ok(tf) => tf.periods_per_year(),
            Err(e) => {
                tracing::warn!(error = %e, "Annualizing metrics with daily bars");
                FALLBACK_PERIODS_PER_YEAR
            }
        };

        Backtester {
            symbol: config.symbol(),
            cash: Money::from_f64(config.trading.initial_capital),
            config,
            strategy,
            protection,
            periods_per_year,
            book: Book::default(),
            tracker: None,
            next_order_id: 1,
            trades: Vec::new(),
            orders: Vec::new(),
        }
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Protection applied to positions (config override or strategy default)
    pub fn protection(&self) -> Option<ProtectionConfig> {
        self.protection
    }

    /// Run backtest on one instrument's candles
    pub fn run(&mut self, candles: &[Candle]) -> BacktestResult {
        self.reset_state();
        self.strategy.reset();
        self.strategy.on_started();

        let symbol = self.symbol.clone();
        let warmup = self.config.trading.warmup_bars;
        let volume = self.config.trading.volume;
        let mut equity_curve = Vec::with_capacity(candles.len());
        let mut bar_index = 0usize;
        let mut last_candle: Option<&Candle> = None;

        for candle in candles {
            if !candle.is_finished() {
                tracing::trace!(time = %candle.datetime, "Skipping unfinished candle");
                continue;
            }

            self.check_protection(candle);

            let mut ctx = StrategyContext::new(
                &symbol,
                candle.datetime,
                self.book.position,
                volume,
                bar_index >= warmup,
            );
            self.strategy.on_candle(candle, &mut ctx);
            for request in ctx.into_orders() {
                self.execute_request(request, candle);
            }

            equity_curve.push((candle.datetime, self.equity(candle.close)));
            bar_index += 1;
            last_candle = Some(candle);
        }

        if let Some(candle) = last_candle {
            if let Some(side) = self.book.side() {
                let exit_side = side.opposite();
                let price = self.apply_slippage(candle.close, exit_side);
                self.fill(
                    exit_side,
                    self.book.position.abs(),
                    price,
                    candle.datetime,
                    ExitReason::EndOfData,
                    Some(ExitReason::EndOfData.to_string()),
                );
                if let Some(point) = equity_curve.last_mut() {
                    point.1 = self.equity(candle.close);
                }
            }
        }

        tracing::info!(
            strategy = self.strategy.name(),
            symbol = %self.symbol,
            bars = bar_index,
            trades = self.trades.len(),
            final_equity = %self.cash,
            "Backtest finished"
        );

        let trades = std::mem::take(&mut self.trades);
        let orders = std::mem::take(&mut self.orders);
        let metrics = self.calculate_metrics(&trades, &equity_curve);

        BacktestResult {
            trades,
            orders,
            equity_curve,
            metrics,
        }
    }

    fn reset_state(&mut self) {
        self.cash = Money::from_f64(self.config.trading.initial_capital);
        self.book = Book::default();
        self.tracker = None;
        self.next_order_id = 1;
        self.trades.clear();
        self.orders.clear();
    }

    fn equity(&self, mark: f64) -> f64 {
        self.cash.to_f64() + self.book.position * mark
    }

    fn apply_slippage(&self, price: f64, side: Side) -> f64 {
        price * (1.0 + side.sign() * self.config.exchange.slippage)
    }

    fn check_protection(&mut self, candle: &Candle) {
        let (exit, market) = {
            let Some(tracker) = self.tracker.as_mut() else {
                return;
            };
            let Some(exit) = tracker.check(candle) else {
                return;
            };
            (exit, tracker.use_market_orders())
        };
        let Some(side) = self.book.side() else {
            self.tracker = None;
            return;
        };

        let exit_side = side.opposite();
        let price = if market {
            self.apply_slippage(exit.price, exit_side)
        } else {
            exit.price
        };
        tracing::debug!(
            symbol = %self.symbol,
            reason = %exit.reason,
            trigger = exit.price,
            fill = price,
            "Protection triggered"
        );
        self.fill(
            exit_side,
            self.book.position.abs(),
            price,
            candle.datetime,
            exit.reason,
            Some(exit.reason.to_string()),
        );
    }

    fn execute_request(&mut self, request: OrderRequest, candle: &Candle) {
        let max_position = self.config.trading.max_position;
        let target = self.book.position + request.side.sign() * request.volume;
        let grows = target.abs() > self.book.position.abs();

        if max_position > 0.0 && grows && target.abs() > max_position + POSITION_EPSILON {
            tracing::warn!(
                symbol = %request.symbol,
                side = ?request.side,
                volume = request.volume,
                position = self.book.position,
                max_position,
                "Order exceeds maximum position"
            );
            let order = self.make_order(
                request.side,
                request.volume,
                None,
                OrderStatus::Rejected,
                request.comment,
                candle.datetime,
            );
            self.strategy.notify_order(&order);
            self.orders.push(order);
            return;
        }

        let price = self.apply_slippage(candle.close, request.side);
        self.fill(
            request.side,
            request.volume,
            price,
            candle.datetime,
            ExitReason::Signal,
            request.comment,
        );
    }

    /// Execute a market fill, realizing PnL on the part that reduces the position
    fn fill(
        &mut self,
        side: Side,
        volume: f64,
        price: f64,
        time: DateTime<Utc>,
        reason: ExitReason,
        comment: Option<String>,
    ) {
        let notional = Money::from_f64(volume * price);
        let commission = Money::from_f64(volume * price * self.config.exchange.commission);
        match side {
            Side::Buy => self.cash -= notional + commission,
            Side::Sell => self.cash += notional - commission,
        }

        let mut opening = volume;
        let mut closed = None;

        if let Some(held_side) = self.book.side().filter(|s| *s != side) {
            let held = self.book.position.abs();
            let closing = volume.min(held);
            let entry_share =
                self.book.entry_commission * Money::from_f64(closing / held);
            let exit_share = commission * Money::from_f64(closing / volume);
            let pnl = Money::from_f64((price - self.book.avg_price) * closing * held_side.sign());
            let total_commission = entry_share + exit_share;

            closed = Some(Trade {
                symbol: self.symbol.clone(),
                side: held_side,
                entry_price: self.book.avg_price,
                exit_price: price,
                quantity: closing,
                entry_time: self.book.entry_time.unwrap_or(time),
                exit_time: time,
                pnl,
                commission: total_commission,
                net_pnl: pnl - total_commission,
                exit_reason: reason,
            });

            self.book.entry_commission -= entry_share;
            self.book.position -= held_side.sign() * closing;
            opening = volume - closing;
            if self.book.is_flat() {
                self.book = Book::default();
                self.tracker = None;
            }
        }

        if opening > POSITION_EPSILON {
            let held = self.book.position.abs();
            if held < POSITION_EPSILON {
                self.book.avg_price = price;
                self.book.entry_time = Some(time);
            } else {
                self.book.avg_price = (held * self.book.avg_price + opening * price) / (held + opening);
            }
            self.book.position += side.sign() * opening;
            self.book.entry_commission += commission * Money::from_f64(opening / volume);

            if let (Some(config), Some(held_side)) = (self.protection, self.book.side()) {
                let avg_price = self.book.avg_price;
                self.tracker = Some(match self.tracker.take() {
                    // Scale-in keeps the ratcheted levels
                    Some(mut tracker) if tracker.side() == held_side => {
                        tracker.rebase(avg_price);
                        tracker
                    }
                    _ => ProtectionTracker::arm(config, held_side, avg_price),
                });
            }
        }

        let order = self.make_order(side, volume, Some(price), OrderStatus::Done, comment, time);
        self.strategy.notify_order(&order);
        self.orders.push(order);

        if let Some(trade) = closed {
            self.strategy.notify_trade(&trade);
            self.trades.push(trade);
        }
    }

    fn make_order(
        &mut self,
        side: Side,
        volume: f64,
        price: Option<f64>,
        status: OrderStatus,
        comment: Option<String>,
        time: DateTime<Utc>,
    ) -> Order {
        let id = self.next_order_id;
        self.next_order_id += 1;
        Order {
            id,
            symbol: self.symbol.clone(),
            side,
            order_type: OrderType::Market,
            status,
            volume,
            price,
            comment,
            time,
        }
    }

    fn calculate_metrics(&self, trades: &[Trade], equity_curve: &[(DateTime<Utc>, f64)]) -> PerformanceMetrics {
        if trades.is_empty() || equity_curve.is_empty() {
            return PerformanceMetrics::default();
        }

        let initial_capital = self.config.trading.initial_capital;
        let final_capital = equity_curve.last().map_or(initial_capital, |p| p.1);
        let total_return = ((final_capital - initial_capital) / initial_capital) * 100.0;

        let net: Vec<f64> = trades.iter().map(|t| t.net_pnl.to_f64()).collect();
        let wins: Vec<f64> = net.iter().copied().filter(|p| *p > 0.0).collect();
        let losses: Vec<f64> = net.iter().copied().filter(|p| *p <= 0.0).collect();

        let win_rate = (wins.len() as f64 / trades.len() as f64) * 100.0;

        let gross_profits: f64 = wins.iter().sum();
        let gross_losses: f64 = losses.iter().map(|p| p.abs()).sum();

        let profit_factor = if gross_losses > 0.0 {
            gross_profits / gross_losses
        } else if gross_profits > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        let avg_win = if !wins.is_empty() {
            gross_profits / wins.len() as f64
        } else {
            0.0
        };

        let avg_loss = if !losses.is_empty() {
            gross_losses / losses.len() as f64
        } else {
            0.0
        };

        let largest_win = wins.iter().copied().fold(0.0, f64::max);
        let largest_loss = losses.iter().copied().fold(0.0, f64::min);
        let expectancy = net.iter().sum::<f64>() / trades.len() as f64;
        let total_commission: Money = trades.iter().map(|t| t.commission).sum();

        // Max drawdown against the running peak
        let mut peak = initial_capital;
        let mut max_dd = 0.0;
        for (_, equity) in equity_curve {
            if *equity > peak {
                peak = *equity;
            }
            let dd = (peak - equity) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }

        let sharpe_ratio = sharpe_ratio(equity_curve, self.periods_per_year);

        let calmar_ratio = if max_dd > 0.0 {
            (total_return / 100.0) / max_dd
        } else {
            0.0
        };

        PerformanceMetrics {
            total_return,
            sharpe_ratio,
            calmar_ratio,
            max_drawdown: max_dd * 100.0,
            win_rate,
            profit_factor,
            expectancy,
            total_trades: trades.len(),
            winning_trades: wins.len(),
            losing_trades: losses.len(),
            avg_win,
            avg_loss,
            largest_win,
            largest_loss,
            total_commission: total_commission.to_f64(),
        }
    }
}

/// Annualized Sharpe ratio of per-bar equity returns.
///
/// Volatility is measured over bars where equity moved; flat bars while out of
/// the market would otherwise shrink the deviation and inflate the ratio.
fn sharpe_ratio(equity_curve: &[(DateTime<Utc>, f64)], periods_per_year: f64) -> f64 {
    let returns: Vec<f64> = equity_curve
        .windows(2)
        .filter(|w| w[0].1 > 0.0)
        .map(|w| (w[1].1 - w[0].1) / w[0].1)
        .collect();
    let active: Vec<f64> = returns.iter().copied().filter(|r| *r != 0.0).collect();
    if active.len() < 2 {
        return 0.0;
    }

    let mean_return = returns.iter().sum::<f64>() / returns.len() as f64;
    let active_mean = active.iter().sum::<f64>() / active.len() as f64;
    let variance = active.iter().map(|r| (r - active_mean).powi(2)).sum::<f64>()
        / (active.len() - 1) as f64;
    let std_dev = variance.sqrt();

    if std_dev > 0.0 {
        mean_return / std_dev * periods_per_year.sqrt()
    } else {
        0.0
    }
}

#[derive(Debug, Default)]
pub struct BacktestResult {
    pub trades: Vec<Trade>,
    /// Every order the host processed, filled or rejected
    pub orders: Vec<Order>,
    pub equity_curve: Vec<(DateTime<Utc>, f64)>,
    pub metrics: PerformanceMetrics,
}

impl BacktestResult {
    pub fn final_equity(&self) -> Option<f64> {
        self.equity_curve.last().map(|p| p.1)
    }
}
