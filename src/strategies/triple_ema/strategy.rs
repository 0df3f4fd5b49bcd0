//! Triple EMA Alignment Strategy
//!
//! fast > mid > slow -> long; fast < mid < slow -> short; anything else -> flat

use crate::indicators::{ema, Ema};
use crate::protection::ProtectionConfig;
use crate::strategies::{percent_protection, Strategy, StrategyContext};
use crate::Candle;

use super::config::TripleEmaConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Alignment {
    Bullish,
    Bearish,
    Mixed,
}

pub struct TripleEmaStrategy {
    config: TripleEmaConfig,
    fast: Ema,
    mid: Ema,
    slow: Ema,
}

impl TripleEmaStrategy {
    pub fn new(config: TripleEmaConfig) -> Result<Self, crate::error::StrategyError> {
        config.validate()?;
        Ok(Self {
            fast: ema(config.fast_period)?,
            mid: ema(config.mid_period)?,
            slow: ema(config.slow_period)?,
            config,
        })
    }
}

fn alignment(fast: f64, mid: f64, slow: f64) -> Alignment {
    if fast > mid && mid > slow {
        Alignment::Bullish
    } else if fast < mid && mid < slow {
        Alignment::Bearish
    } else {
        Alignment::Mixed
    }
}

impl Strategy for TripleEmaStrategy {
    fn name(&self) -> &'static str {
        "triple_ema"
    }

    fn protection(&self) -> Option<ProtectionConfig> {
        percent_protection(self.config.take_profit_pct, self.config.stop_loss_pct)
    }

    fn on_candle(&mut self, candle: &Candle, ctx: &mut StrategyContext<'_>) {
        let fast = self.fast.process(candle.close);
        let mid = self.mid.process(candle.close);
        let slow = self.slow.process(candle.close);
        if !self.slow.is_formed() {
            return;
        }

        match alignment(fast, mid, slow) {
            Alignment::Bullish => {
                if ctx.go_long() {
                    tracing::debug!(fast, mid, slow, "EMAs aligned bullish");
                }
            }
            Alignment::Bearish if self.config.allow_shorts => {
                if ctx.go_short() {
                    tracing::debug!(fast, mid, slow, "EMAs aligned bearish");
                }
            }
            Alignment::Bearish | Alignment::Mixed => {
                if ctx.close_position() {
                    ctx.with_comment("EMA alignment lost");
                }
            }
        }
    }

    fn reset(&mut self) {
        self.fast.reset();
        self.mid.reset();
        self.slow.reset();
    }
}
