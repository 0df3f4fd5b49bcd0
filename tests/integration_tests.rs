//! Integration tests for the candle-strategies crate
//!
//! These tests drive strategies through the backtester and optimizer the way
//! the CLI does.

use approx::assert_relative_eq;
use chrono::{Duration, TimeZone, Utc};
use std::io::Write;

use candle_strategies::backtest::Backtester;
use candle_strategies::grid::{apply_overrides, generate_grid_configs};
use candle_strategies::indicators;
use candle_strategies::optimizer::{Optimizer, SortMetric};
use candle_strategies::strategies::available_strategies;
use candle_strategies::{create_strategy, data, Candle, Config, ExitReason, OrderStatus, Side};

// =============================================================================
// Test Utilities
// =============================================================================

/// Sine cycle on a slow drift with periodic volume bursts
fn generate_cycle_candles(count: usize, period: f64) -> Vec<Candle> {
    let start_time = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
    let mut prev_close = 100.0;

    (0..count)
        .map(|i| {
            let t = i as f64;
            let close = 100.0 + 0.02 * t + 10.0 * (2.0 * std::f64::consts::PI * t / period).sin();
            let open = prev_close;
            prev_close = close;
            let wick = 0.4 + 0.2 * ((t / 7.0).sin().abs());
            let volume = if i % 37 == 0 { 5000.0 } else { 1000.0 + (i % 11) as f64 * 20.0 };
            Candle::new(
                start_time + Duration::hours(i as i64),
                open,
                open.max(close) + wick,
                open.min(close) - wick,
                close,
                volume,
            )
            .unwrap()
        })
        .collect()
}

fn config_for(name: &str) -> Config {
    let mut config = Config::default();
    config.strategy_name = name.to_string();
    config
}

fn write_candles_csv(dir: &std::path::Path, symbol: &str, timeframe: &str, candles: &[Candle]) {
    let path = data::data_file(dir, symbol, timeframe);
    let mut file = std::fs::File::create(path).unwrap();
    writeln!(file, "datetime,open,high,low,close,volume").unwrap();
    for c in candles {
        writeln!(
            file,
            "{},{},{},{},{},{}",
            c.datetime.to_rfc3339(),
            c.open,
            c.high,
            c.low,
            c.close,
            c.volume
        )
        .unwrap();
    }
}

// =============================================================================
// Backtest Tests
// =============================================================================

#[test]
fn test_every_strategy_backtests_with_consistent_accounting() {
    let candles = generate_cycle_candles(600, 60.0);

    for name in available_strategies() {
        let config = config_for(name);
        let initial = config.trading.initial_capital;
        let strategy = create_strategy(&config).unwrap();
        let result = Backtester::new(config, strategy).run(&candles);

        assert_eq!(result.equity_curve.len(), candles.len(), "{}", name);
        assert!(result.orders.iter().all(|o| o.status == OrderStatus::Done), "{}", name);

        // Everything is flat at the end, so equity change equals realized net PnL
        let realized: f64 = result.trades.iter().map(|t| t.net_pnl.to_f64()).sum();
        let final_equity = result.final_equity().unwrap();
        assert_relative_eq!(final_equity - initial, realized, epsilon = 1e-4);

        for trade in &result.trades {
            assert!(trade.exit_time >= trade.entry_time, "{}", name);
            assert!(trade.quantity > 0.0, "{}", name);
        }
        if let Some(last) = result.trades.last() {
            assert!(last.exit_time <= candles.last().unwrap().datetime);
        }
    }
}

#[test]
fn test_trend_strategies_trade_on_cycles() {
    let candles = generate_cycle_candles(600, 60.0);
    for name in ["sma_crossover", "macd_crossover", "triple_ema", "rsi_reversion"] {
        let config = config_for(name);
        let strategy = create_strategy(&config).unwrap();
        let result = Backtester::new(config, strategy).run(&candles);
        assert!(result.metrics.total_trades > 0, "{} did not trade", name);
        assert!(result.metrics.total_commission > 0.0, "{}", name);
    }
}

#[test]
fn test_config_protection_overrides_strategy_defaults() {
    let candles = generate_cycle_candles(400, 60.0);
    let config: Config = serde_json::from_str(
        r#"{
            "strategy_name": "sma_crossover",
            "strategy": {"fast_period": 5, "slow_period": 20, "stop_loss_pct": 0, "take_profit_pct": 0},
            "protection": {"take_profit": "2%", "stop_loss": "1%"}
        }"#,
    )
    .unwrap();

    let strategy = create_strategy(&config).unwrap();
    assert!(strategy.protection().is_none());

    let result = Backtester::new(config, strategy).run(&candles);
    assert!(result
        .trades
        .iter()
        .any(|t| matches!(t.exit_reason, ExitReason::StopLoss | ExitReason::TakeProfit)));
}

#[test]
fn test_long_only_config_never_shorts() {
    let candles = generate_cycle_candles(600, 60.0);
    let mut config = config_for("ema_rsi_trend");
    config.strategy = serde_json::json!({"ema_period": 20, "allow_shorts": false});
    let strategy = create_strategy(&config).unwrap();
    let result = Backtester::new(config, strategy).run(&candles);
    assert!(result.trades.iter().all(|t| t.side == Side::Buy));
}

#[test]
fn test_warmup_delays_first_order() {
    let candles = generate_cycle_candles(300, 60.0);
    let mut config = config_for("sma_crossover");
    config.trading.warmup_bars = 150;
    let strategy = create_strategy(&config).unwrap();
    let result = Backtester::new(config, strategy).run(&candles);

    if let Some(first) = result.orders.first() {
        assert!(first.time >= candles[150].datetime);
    }
}

#[test]
fn test_max_position_caps_reversals() {
    let candles = generate_cycle_candles(400, 60.0);
    let mut config = config_for("sma_crossover");
    config.trading.max_position = 1.0;
    let strategy = create_strategy(&config).unwrap();
    let result = Backtester::new(config, strategy).run(&candles);

    // A reversal order has volume 2 but the resulting position stays at 1
    assert!(result.orders.iter().all(|o| o.status == OrderStatus::Done));
    assert!(result.trades.iter().all(|t| t.quantity <= 1.0 + 1e-9));
}

#[test]
fn test_unknown_strategy_is_an_error() {
    let config = config_for("not_a_strategy");
    let err = create_strategy(&config).err().unwrap();
    assert!(format!("{:#}", err).contains("unknown strategy"));
}

#[test]
fn test_invalid_strategy_params_are_rejected() {
    let mut config = config_for("bollinger_reversion");
    config.strategy = serde_json::json!({"period": 1});
    assert!(create_strategy(&config).is_err());

    config.strategy = serde_json::json!({"period": "twenty"});
    assert!(create_strategy(&config).is_err());
}

// =============================================================================
// Data + Optimizer Tests
// =============================================================================

#[test]
fn test_optimize_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let candles = generate_cycle_candles(500, 50.0);
    write_candles_csv(dir.path(), "BTCUSDT", "1h", &candles);

    let config_path = dir.path().join("config.json");
    std::fs::write(
        &config_path,
        serde_json::json!({
            "strategy_name": "sma_crossover",
            "strategy": {"slow_period": 30},
            "trading": {"symbol": "BTCUSDT", "timeframe": "1h"},
            "backtest": {"data_dir": dir.path().to_string_lossy()},
            "grid": {"fast_period": [5, 10, 50]}
        })
        .to_string(),
    )
    .unwrap();

    let mut config = Config::from_file(&config_path).unwrap();
    apply_overrides(&mut config, &["slow_period=20,30".to_string()]);

    let loaded = data::load_for_config(&config).unwrap();
    assert_eq!(loaded.len(), candles.len());
    assert!(data::validate_candles(&loaded).is_valid());

    let configs = generate_grid_configs(&config);
    assert_eq!(configs.len(), 6);

    let mut results = Optimizer::new(true).run(&loaded, &configs, None);
    // fast_period 50 is never below slow_period
    assert_eq!(results.len(), 4);

    Optimizer::sort_results(&mut results, SortMetric::Return);
    assert!(results.windows(2).all(|w| w[0].total_return >= w[1].total_return));
    assert!(results.iter().all(|r| r.params["fast_period"] < r.params["slow_period"]));
}

#[test]
fn test_backtest_date_window_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let candles = generate_cycle_candles(24 * 10, 60.0);
    write_candles_csv(dir.path(), "ETHUSDT", "1h", &candles);

    let mut config = config_for("rsi_reversion");
    config.trading.symbol = "ETHUSDT".to_string();
    config.backtest.data_dir = dir.path().to_string_lossy().into_owned();
    config.backtest.start = Some("2023-01-03".to_string());
    config.backtest.end = Some("2023-01-05".to_string());

    let loaded = data::load_for_config(&config).unwrap();
    assert_eq!(loaded.len(), 72);
    assert_eq!(loaded[0].datetime, Utc.with_ymd_and_hms(2023, 1, 3, 0, 0, 0).unwrap());
}

#[test]
fn test_sample_configs_build() {
    let mut seen = 0;
    for entry in std::fs::read_dir("configs").unwrap() {
        let path = entry.unwrap().path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let config = Config::from_file(&path).unwrap();
        for combo in generate_grid_configs(&config) {
            create_strategy(&combo).unwrap_or_else(|e| panic!("{}: {:#}", path.display(), e));
        }
        seen += 1;
    }
    assert!(seen >= 3);
}

// =============================================================================
// Indicator Tests
// =============================================================================

#[test]
fn test_sma_forms_after_period() {
    let mut sma = indicators::sma(3).unwrap();
    sma.process(1.0);
    sma.process(2.0);
    assert!(!sma.is_formed());
    let value = sma.process(3.0);
    assert!(sma.is_formed());
    assert_relative_eq!(value, 2.0);
    assert_relative_eq!(sma.process(6.0), 11.0 / 3.0);
}

#[test]
fn test_indicator_constructors_reject_zero_period() {
    assert!(indicators::sma(0).is_err());
    assert!(indicators::ema(0).is_err());
    assert!(indicators::rsi(0).is_err());
    assert!(indicators::macd(0, 26, 9).is_err());
}

#[test]
fn test_crossover_helpers() {
    assert!(indicators::crossed_above(9.0, 10.0, 11.0, 10.5));
    assert!(!indicators::crossed_above(11.0, 10.0, 12.0, 10.5));
    assert!(indicators::crossed_below(11.0, 10.0, 9.0, 10.5));
}
