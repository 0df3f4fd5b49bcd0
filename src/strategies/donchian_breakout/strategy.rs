//! Donchian Breakout Strategy
//!
//! Entry: close above the prior `lookback` high -> long, below the prior low -> short
//! Exit: close through a chandelier stop `atr_stop` ATRs from the best close

use crate::indicators::{atr, highest, lowest, Atr, Highest, Lowest};
use crate::protection::ProtectionConfig;
use crate::strategies::{percent_protection, Strategy, StrategyContext};
use crate::Candle;

use super::config::DonchianBreakoutConfig;

pub struct DonchianBreakoutStrategy {
    config: DonchianBreakoutConfig,
    upper: Highest,
    lower: Lowest,
    atr: Atr,
    /// Channel as of the previous bar
    prev_channel: Option<(f64, f64)>,
    stop: Option<f64>,
}

impl DonchianBreakoutStrategy {
    pub fn new(config: DonchianBreakoutConfig) -> Result<Self, crate::error::StrategyError> {
        config.validate()?;
        Ok(Self {
            upper: highest(config.lookback)?,
            lower: lowest(config.lookback)?,
            atr: atr(config.atr_period)?,
            config,
            prev_channel: None,
            stop: None,
        })
    }

    /// Exit on a stop breach, otherwise ratchet the stop toward price
    fn manage_stop(&mut self, close: f64, atr: f64, ctx: &mut StrategyContext<'_>) {
        let distance = self.config.atr_stop * atr;
        let Some(stop) = self.stop else {
            return;
        };

        if ctx.is_long() {
            if close <= stop {
                tracing::debug!(close, stop, "ATR stop hit (long)");
                ctx.close_position();
                ctx.with_comment("ATR stop");
                self.stop = None;
            } else {
                self.stop = Some(stop.max(close - distance));
            }
        } else if ctx.is_short() {
            if close >= stop {
                tracing::debug!(close, stop, "ATR stop hit (short)");
                ctx.close_position();
                ctx.with_comment("ATR stop");
                self.stop = None;
            } else {
                self.stop = Some(stop.min(close + distance));
            }
        }
    }
}

impl Strategy for DonchianBreakoutStrategy {
    fn name(&self) -> &'static str {
        "donchian_breakout"
    }

    fn protection(&self) -> Option<ProtectionConfig> {
        percent_protection(self.config.take_profit_pct, self.config.stop_loss_pct)
    }

    fn on_candle(&mut self, candle: &Candle, ctx: &mut StrategyContext<'_>) {
        let upper = self.upper.process(candle.high);
        let lower = self.lower.process(candle.low);
        let atr = self.atr.process(candle);
        if !(self.upper.is_formed() && self.atr.is_formed()) {
            return;
        }
        let Some((prior_upper, prior_lower)) = self.prev_channel.replace((upper, lower)) else {
            return;
        };

        // Position may have been closed by host-side protection
        if ctx.is_flat() {
            self.stop = None;
        }
        self.manage_stop(candle.close, atr, ctx);

        let close = candle.close;
        let distance = self.config.atr_stop * atr;
        if close > prior_upper && !ctx.is_long() {
            tracing::debug!(close, channel_high = prior_upper, atr, "Donchian breakout up");
            if ctx.go_long() {
                self.stop = Some(close - distance);
            }
        } else if close < prior_lower && !ctx.is_short() {
            if self.config.allow_shorts {
                tracing::debug!(close, channel_low = prior_lower, atr, "Donchian breakout down");
                if ctx.go_short() {
                    self.stop = Some(close + distance);
                }
            } else if ctx.is_long() {
                ctx.close_position();
                self.stop = None;
            }
        }
    }

    fn reset(&mut self) {
        self.upper.reset();
        self.lower.reset();
        self.atr.reset();
        self.prev_channel = None;
        self.stop = None;
    }
}
