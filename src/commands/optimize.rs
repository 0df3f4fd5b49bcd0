//! Optimize command implementation with progress tracking

use anyhow::Result;
use candle_strategies::grid::{apply_overrides, format_params, generate_grid_configs};
use candle_strategies::optimizer::{Optimizer, SortMetric};
use candle_strategies::{data, Config};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

pub fn run(
    config_path: String,
    strategy_override: Option<String>,
    param_overrides: Vec<String>,
    sort_by: SortMetric,
    top: usize,
    sequential: bool,
) -> Result<()> {
    info!("Starting optimization");

    let mut config = Config::from_file(&config_path)?;
    info!("Loaded configuration from: {}", config_path);

    if let Some(strategy) = strategy_override {
        info!("Overriding strategy to: {}", strategy);
        config.strategy_name = strategy;
    }
    apply_overrides(&mut config, &param_overrides);

    let candles = data::load_for_config(&config)?;
    if candles.is_empty() {
        anyhow::bail!("No candles in the selected date range");
    }
    info!("Loaded {} candles", candles.len());

    let configs = generate_grid_configs(&config);

    println!("\n{}", "=".repeat(70));
    println!("OPTIMIZATION SUMMARY");
    println!("{}", "=".repeat(70));
    println!("  Strategy:      {}", config.strategy_name);
    println!("  Instrument:    {} {}", config.trading.symbol, config.trading.timeframe);
    println!("  Candles:       {}", candles.len());
    println!("  Parameters:    {} combinations", configs.len());
    println!("  Mode:          {}", if sequential { "sequential" } else { "parallel" });
    println!("{}\n", "=".repeat(70));

    let pb = ProgressBar::new(configs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{percent:>3}%|{bar:40}| {pos}/{len} [{elapsed}<{eta}, {per_sec:.2}]")?
            .progress_chars("█░ "),
    );

    let mut results = Optimizer::new(!sequential).run(&candles, &configs, Some(&pb));
    pb.finish();
    println!();

    if results.is_empty() {
        println!("No valid parameter combinations.");
        info!("No valid results found");
        return Ok(());
    }

    Optimizer::sort_results(&mut results, sort_by);
    info!("Total results: {}, sorted by: {:?}", results.len(), sort_by);

    let display_count = top.min(results.len());
    println!("\n{}", "=".repeat(110));
    println!("TOP {} OPTIMIZATION RESULTS (sorted by {:?})", display_count, sort_by);
    println!("{}", "=".repeat(110));
    println!(
        "{:<4} {:>7} {:>9} {:>8} {:>8} {:>7} {:>6} | Parameters",
        "Rank", "Sharpe", "Return%", "MaxDD%", "WinR%", "PF", "Trades"
    );
    println!("{}", "-".repeat(110));

    for (i, result) in results.iter().take(top).enumerate() {
        println!(
            "{:<4} {:>7.2} {:>9.2} {:>8.2} {:>8.2} {:>7.2} {:>6} | {}",
            i + 1,
            result.sharpe_ratio,
            result.total_return,
            result.max_drawdown,
            result.win_rate,
            result.profit_factor,
            result.total_trades,
            format_params(&result.params)
        );
    }
    println!("{}", "=".repeat(110));

    info!("Optimization completed successfully");

    Ok(())
}
