//! Candle strategies - main entry point
//!
//! This binary provides three subcommands:
//! - backtest: Replay a strategy over historical candles
//! - optimize: Grid search over strategy parameters
//! - list: Show the strategy catalog

use anyhow::Result;
use candle_strategies::optimizer::SortMetric;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "candle-strategies")]
#[command(about = "Candle-driven indicator strategies with backtesting and optimization", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run strategy backtest
    Backtest {
        /// Path to configuration file
        #[arg(short, long, default_value = "configs/sma_crossover_btc_1h.json")]
        config: String,

        /// Strategy name (overrides config file)
        #[arg(short, long)]
        strategy: Option<String>,

        /// Symbol (overrides config file)
        #[arg(long)]
        symbol: Option<String>,

        /// Timeframe, e.g. 15m, 1h, 1d (overrides config file)
        #[arg(long)]
        timeframe: Option<String>,

        /// Initial capital
        #[arg(long)]
        capital: Option<f64>,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,

        /// Print every closed trade
        #[arg(long)]
        trades: bool,
    },

    /// Optimize strategy parameters
    Optimize {
        /// Path to base configuration file (its `grid` section defines the search)
        #[arg(short, long, default_value = "configs/sma_crossover_btc_1h.json")]
        config: String,

        /// Strategy name (overrides config file)
        #[arg(short, long)]
        strategy: Option<String>,

        /// Grid override, repeatable. E.g. --param fast_period=5,10,20
        #[arg(short, long = "param")]
        params: Vec<String>,

        /// Sort results by metric
        #[arg(long, value_enum, default_value_t = SortMetric::Sharpe)]
        sort_by: SortMetric,

        /// Number of top results to show
        #[arg(short, long, default_value = "10")]
        top: usize,

        /// Run sequentially instead of parallel
        #[arg(long)]
        sequential: bool,
    },

    /// List available strategies
    List,
}

fn setup_logging(verbose: bool, command_name: &str, file_only: bool) -> Result<()> {
    std::fs::create_dir_all("logs")?;

    // {command}_{date}.log
    let log_filename = format!(
        "{}_{}.log",
        command_name,
        chrono::Local::now().format("%Y-%m-%d_%H-%M-%S")
    );
    let log_path = PathBuf::from("logs").join(&log_filename);

    let level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if file_only {
        // Keep the console clean for the progress bar
        let file_appender = tracing_appender::rolling::never("logs", &log_filename);
        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(file_appender)
            .with_target(true)
            .with_line_number(true)
            .with_file(true)
            .with_ansi(false);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(file_layer)
            .init();
    } else {
        let file_appender = tracing_appender::rolling::never("logs", &log_filename);
        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(file_appender)
            .with_target(true)
            .with_line_number(true)
            .with_file(true)
            .with_ansi(false);

        let console_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_line_number(true)
            .with_file(true)
            .with_ansi(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .with(file_layer)
            .init();

        info!("Log file: {}", log_path.display());
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Backtest { .. } => setup_logging(cli.verbose, "backtest", false)?,
        Commands::Optimize { .. } => setup_logging(cli.verbose, "optimize", true)?,
        Commands::List => {}
    }

    match cli.command {
        Commands::Backtest {
            config,
            strategy,
            symbol,
            timeframe,
            capital,
            start,
            end,
            trades,
        } => commands::backtest::run(commands::backtest::BacktestArgs {
            config_path: config,
            strategy,
            symbol,
            timeframe,
            capital,
            start,
            end,
            show_trades: trades,
        }),

        Commands::Optimize {
            config,
            strategy,
            params,
            sort_by,
            top,
            sequential,
        } => commands::optimize::run(config, strategy, params, sort_by, top, sequential),

        Commands::List => commands::list::run(),
    }
}
