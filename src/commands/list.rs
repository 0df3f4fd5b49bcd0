//! List command implementation

use anyhow::Result;
use candle_strategies::strategies::available_strategies;
use candle_strategies::{create_strategy, Config};

pub fn run() -> Result<()> {
    println!("{:<24} Default protection", "Strategy");
    println!("{}", "-".repeat(56));
    for name in available_strategies() {
        let config = Config {
            strategy_name: name.to_string(),
            ..Config::default()
        };
        let protection = match create_strategy(&config)?.protection() {
            Some(p) => format!(
                "TP {} / SL {}{}",
                p.take_profit.map_or("-".to_string(), |u| u.to_string()),
                p.stop_loss.map_or("-".to_string(), |u| u.to_string()),
                if p.trailing { " (trailing)" } else { "" }
            ),
            None => "none".to_string(),
        };
        println!("{:<24} {}", name, protection);
    }
    Ok(())
}
