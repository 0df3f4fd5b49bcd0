//! Parallel parameter optimization
//!
//! Runs one backtest per grid combination and collects the headline metrics.
//! Combinations whose strategy parameters fail validation are skipped.

use indicatif::ProgressBar;
use rayon::prelude::*;
use std::collections::HashMap;

use crate::backtest::Backtester;
use crate::strategies::create_strategy;
use crate::{Candle, Config};

/// Optimization result for a single parameter combination
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    pub params: HashMap<String, f64>,
    pub sharpe_ratio: f64,
    pub total_return: f64,
    pub max_drawdown: f64,
    pub win_rate: f64,
    pub total_trades: usize,
    pub calmar_ratio: f64,
    pub profit_factor: f64,
    pub expectancy: f64,
}

/// Metric used to rank optimization results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SortMetric {
    #[default]
    Sharpe,
    Return,
    Calmar,
    #[value(alias = "win_rate")]
    WinRate,
    #[value(alias = "profit_factor")]
    ProfitFactor,
}

pub struct Optimizer {
    parallel: bool,
}

impl Optimizer {
    pub fn new(parallel: bool) -> Self {
        Optimizer { parallel }
    }

    /// Backtest every config against `candles`.
    ///
    /// Data is borrowed by every worker; only configs are cloned.
    pub fn run(
        &self,
        candles: &[Candle],
        configs: &[Config],
        progress_bar: Option<&ProgressBar>,
    ) -> Vec<OptimizationResult> {
        tracing::info!(
            combinations = configs.len(),
            parallel = self.parallel,
            "Testing parameter combinations"
        );

        let run_one = |config: &Config| {
            let result = evaluate(config, candles);
            if let Some(pb) = progress_bar {
                pb.inc(1);
            }
            result
        };

        let results: Vec<OptimizationResult> = if self.parallel {
            configs.par_iter().filter_map(run_one).collect()
        } else {
            configs.iter().filter_map(run_one).collect()
        };

        let skipped = configs.len() - results.len();
        if skipped > 0 {
            tracing::warn!(skipped, "Combinations skipped due to invalid parameters");
        }
        results
    }

    /// Sort results best-first by the given metric; NaN sorts last
    pub fn sort_results(results: &mut [OptimizationResult], sort_by: SortMetric) {
        let key = |v: f64| if v.is_nan() { f64::NEG_INFINITY } else { v };
        results.sort_by(|a, b| {
            let (va, vb) = match sort_by {
                SortMetric::Calmar => (a.calmar_ratio, b.calmar_ratio),
                SortMetric::Return => (a.total_return, b.total_return),
                SortMetric::WinRate => (a.win_rate, b.win_rate),
                SortMetric::ProfitFactor => (a.profit_factor, b.profit_factor),
                SortMetric::Sharpe => (a.sharpe_ratio, b.sharpe_ratio),
            };
            key(vb).total_cmp(&key(va))
        });
    }
}

fn evaluate(config: &Config, candles: &[Candle]) -> Option<OptimizationResult> {
    let params = crate::grid::extract_params(config);
    let strategy = match create_strategy(config) {
        Ok(s) => s,
        Err(e) => {
            tracing::debug!(
                params = %crate::grid::format_params(&params),
                error = %format!("{:#}", e),
                "Skipping combination"
            );
            return None;
        }
    };

    let mut backtester = Backtester::new(config.clone(), strategy);
    let metrics = backtester.run(candles).metrics;

    Some(OptimizationResult {
        params,
        sharpe_ratio: metrics.sharpe_ratio,
        total_return: metrics.total_return,
        max_drawdown: metrics.max_drawdown,
        win_rate: metrics.win_rate,
        total_trades: metrics.total_trades,
        calmar_ratio: metrics.calmar_ratio,
        profit_factor: metrics.profit_factor,
        expectancy: metrics.expectancy,
    })
}
