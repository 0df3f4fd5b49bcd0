//! Backtest command implementation

use anyhow::{Context, Result};
use candle_strategies::{backtest::Backtester, create_strategy, data, Config};
use tracing::{info, warn};

pub struct BacktestArgs {
    pub config_path: String,
    pub strategy: Option<String>,
    pub symbol: Option<String>,
    pub timeframe: Option<String>,
    pub capital: Option<f64>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub show_trades: bool,
}

pub fn run(args: BacktestArgs) -> Result<()> {
    info!("Starting backtest");

    let mut config = Config::from_file(&args.config_path)?;
    info!("Loaded configuration from: {}", args.config_path);

    if let Some(strategy) = args.strategy {
        info!("Overriding strategy to: {}", strategy);
        config.strategy_name = strategy;
    }
    if let Some(symbol) = args.symbol {
        info!("Overriding symbol to: {}", symbol);
        config.trading.symbol = symbol;
    }
    if let Some(timeframe) = args.timeframe {
        info!("Overriding timeframe to: {}", timeframe);
        config.trading.timeframe = timeframe;
    }
    if let Some(capital) = args.capital {
        info!("Overriding initial capital to: {:.2}", capital);
        config.trading.initial_capital = capital;
    }
    if let Some(start) = args.start {
        info!("Overriding start date to: {}", start);
        config.backtest.start = Some(start);
    }
    if let Some(end) = args.end {
        info!("Overriding end date to: {}", end);
        config.backtest.end = Some(end);
    }
    config.validate().context("Invalid configuration after overrides")?;

    info!(
        "Loading {} {} from: {}",
        config.trading.symbol, config.trading.timeframe, config.backtest.data_dir
    );
    let candles = data::load_for_config(&config)?;
    if candles.is_empty() {
        anyhow::bail!("No candles in the selected date range");
    }
    let validation = data::validate_candles(&candles);
    for warning in &validation.warnings {
        warn!("{}", warning);
    }
    info!("Loaded {} candles", candles.len());

    info!("Creating strategy: {}", config.strategy_name);
    let strategy = create_strategy(&config)?;
    let mut backtester = Backtester::new(config.clone(), strategy);

    info!("Running backtest...");
    let result = backtester.run(&candles);
    let m = &result.metrics;

    println!("\n{}", "=".repeat(60));
    println!("BACKTEST RESULTS: {} on {} {}", config.strategy_name, config.trading.symbol, config.trading.timeframe);
    println!("{}", "=".repeat(60));
    println!("Initial Capital:    {:.2}", config.trading.initial_capital);
    println!("Final Equity:       {:.2}", result.final_equity().unwrap_or(config.trading.initial_capital));
    println!("Total Return:       {:.2}%", m.total_return);
    println!("Sharpe Ratio:       {:.2}", m.sharpe_ratio);
    println!("Calmar Ratio:       {:.2}", m.calmar_ratio);
    println!("Max Drawdown:       {:.2}%", m.max_drawdown);
    println!("Win Rate:           {:.2}%", m.win_rate);
    println!("Profit Factor:      {:.2}", m.profit_factor);
    println!("Expectancy:         {:.2}", m.expectancy);
    println!("Total Trades:       {}", m.total_trades);
    println!("Winning Trades:     {}", m.winning_trades);
    println!("Losing Trades:      {}", m.losing_trades);
    println!("Average Win:        {:.2}", m.avg_win);
    println!("Average Loss:       {:.2}", m.avg_loss);
    println!("Largest Win:        {:.2}", m.largest_win);
    println!("Largest Loss:       {:.2}", m.largest_loss);
    println!("Commission Paid:    {:.2}", m.total_commission);
    println!("{}", "=".repeat(60));

    if args.show_trades && !result.trades.is_empty() {
        println!(
            "{:<20} {:<20} {:<5} {:>12} {:>12} {:>10} {:>8}  Exit",
            "Entry", "Exit Time", "Side", "Entry Px", "Exit Px", "Net PnL", "Ret%"
        );
        println!("{}", "-".repeat(100));
        for t in &result.trades {
            println!(
                "{:<20} {:<20} {:<5} {:>12.4} {:>12.4} {:>10} {:>8.2}  {}",
                t.entry_time.format("%Y-%m-%d %H:%M"),
                t.exit_time.format("%Y-%m-%d %H:%M"),
                if t.side == candle_strategies::Side::Buy { "LONG" } else { "SHORT" },
                t.entry_price,
                t.exit_price,
                t.net_pnl,
                t.return_pct(),
                t.exit_reason
            );
        }
        println!("{}", "=".repeat(100));
    }

    info!("Backtest completed successfully");

    Ok(())
}
