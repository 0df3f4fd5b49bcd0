//! RSI Reversion Strategy
//!
//! Entry: RSI below `oversold` -> long, above `overbought` -> short
//! Exit: RSI crosses `exit_level` in the position's favour

use crate::indicators::{crossed_above, crossed_below, rsi, Rsi};
use crate::protection::ProtectionConfig;
use crate::strategies::{percent_protection, Strategy, StrategyContext};
use crate::Candle;

use super::config::RsiReversionConfig;

pub struct RsiReversionStrategy {
    config: RsiReversionConfig,
    rsi: Rsi,
    prev_rsi: Option<f64>,
}

impl RsiReversionStrategy {
    pub fn new(config: RsiReversionConfig) -> Result<Self, crate::error::StrategyError> {
        config.validate()?;
        Ok(Self {
            rsi: rsi(config.rsi_period)?,
            config,
            prev_rsi: None,
        })
    }
}

impl Strategy for RsiReversionStrategy {
    fn name(&self) -> &'static str {
        "rsi_reversion"
    }

    fn protection(&self) -> Option<ProtectionConfig> {
        percent_protection(self.config.take_profit_pct, self.config.stop_loss_pct)
    }

    fn on_candle(&mut self, candle: &Candle, ctx: &mut StrategyContext<'_>) {
        let value = self.rsi.process(candle.close);
        if !self.rsi.is_formed() {
            return;
        }
        let prev = self.prev_rsi.replace(value);
        let exit = self.config.exit_level;

        if let Some(prev) = prev {
            if ctx.is_long() && crossed_above(prev, exit, value, exit) {
                ctx.close_position();
                ctx.with_comment("RSI back to neutral");
            } else if ctx.is_short() && crossed_below(prev, exit, value, exit) {
                ctx.close_position();
                ctx.with_comment("RSI back to neutral");
            }
        }

        if value < self.config.oversold && !ctx.is_long() {
            tracing::debug!(rsi = value, close = candle.close, "RSI oversold");
            ctx.go_long();
        } else if value > self.config.overbought && self.config.allow_shorts && !ctx.is_short() {
            tracing::debug!(rsi = value, close = candle.close, "RSI overbought");
            ctx.go_short();
        }
    }

    fn reset(&mut self) {
        self.rsi.reset();
        self.prev_rsi = None;
    }
}
