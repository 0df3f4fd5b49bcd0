//! EMA + RSI Trend Strategy
//!
//! Entry: close above the EMA and RSI crosses above `long_level` -> long;
//!        close below the EMA and RSI crosses below `short_level` -> short
//! Exit: close crosses the EMA against the position

use crate::indicators::{crossed_above, crossed_below, ema, rsi, Ema, Rsi};
use crate::protection::ProtectionConfig;
use crate::strategies::{percent_protection, Strategy, StrategyContext};
use crate::Candle;

use super::config::EmaRsiTrendConfig;

pub struct EmaRsiTrendStrategy {
    config: EmaRsiTrendConfig,
    ema: Ema,
    rsi: Rsi,
    prev_rsi: Option<f64>,
}

impl EmaRsiTrendStrategy {
    pub fn new(config: EmaRsiTrendConfig) -> Result<Self, crate::error::StrategyError> {
        config.validate()?;
        Ok(Self {
            ema: ema(config.ema_period)?,
            rsi: rsi(config.rsi_period)?,
            config,
            prev_rsi: None,
        })
    }
}

impl Strategy for EmaRsiTrendStrategy {
    fn name(&self) -> &'static str {
        "ema_rsi_trend"
    }

    fn protection(&self) -> Option<ProtectionConfig> {
        percent_protection(self.config.take_profit_pct, self.config.stop_loss_pct)
    }

    fn on_candle(&mut self, candle: &Candle, ctx: &mut StrategyContext<'_>) {
        let trend = self.ema.process(candle.close);
        let rsi = self.rsi.process(candle.close);
        if !(self.ema.is_formed() && self.rsi.is_formed()) {
            return;
        }
        let Some(prev_rsi) = self.prev_rsi.replace(rsi) else {
            return;
        };

        let close = candle.close;
        if ctx.is_long() && close < trend {
            ctx.close_position();
            ctx.with_comment("close below EMA");
        } else if ctx.is_short() && close > trend {
            ctx.close_position();
            ctx.with_comment("close above EMA");
        }

        let level = self.config.long_level;
        if ctx.is_flat() && close > trend && crossed_above(prev_rsi, level, rsi, level) {
            tracing::debug!(rsi, ema = trend, close, "RSI momentum long");
            ctx.go_long();
        }

        let level = self.config.short_level;
        if self.config.allow_shorts
            && ctx.is_flat()
            && close < trend
            && crossed_below(prev_rsi, level, rsi, level)
        {
            tracing::debug!(rsi, ema = trend, close, "RSI momentum short");
            ctx.go_short();
        }
    }

    fn reset(&mut self) {
        self.ema.reset();
        self.rsi.reset();
        self.prev_rsi = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::test_support::{drive, from_closes};
    use crate::Side;

    fn strategy() -> EmaRsiTrendStrategy {
        EmaRsiTrendStrategy::new(EmaRsiTrendConfig {
            ema_period: 5,
            rsi_period: 5,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_rebound_above_ema_goes_long() {
        // 20 bars of steady decline, then a sharp rally
        let mut closes: Vec<f64> = (0..20).map(|i| 100.0 - i as f64).collect();
        closes.extend([84.0, 87.0, 90.0, 93.0]);
        let orders = drive(&mut strategy(), &from_closes(&closes));

        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].0, 20);
        assert_eq!(orders[0].1.side, Side::Buy);
    }

    #[test]
    fn test_long_closed_when_price_falls_below_ema() {
        let mut closes: Vec<f64> = (0..20).map(|i| 100.0 - i as f64).collect();
        closes.extend([84.0, 87.0, 90.0, 80.0]);

        let mut s = EmaRsiTrendStrategy::new(EmaRsiTrendConfig {
            ema_period: 5,
            rsi_period: 5,
            allow_shorts: false,
            ..Default::default()
        })
        .unwrap();
        let orders = drive(&mut s, &from_closes(&closes));

        assert_eq!(orders.len(), 2);
        assert_eq!(orders[1].0, 23);
        assert_eq!(orders[1].1.side, Side::Sell);
        assert_eq!(orders[1].1.volume, 1.0);
        assert_eq!(orders[1].1.comment.as_deref(), Some("close below EMA"));
    }

    #[test]
    fn test_collapse_flips_to_short_when_allowed() {
        let mut closes: Vec<f64> = (0..20).map(|i| 100.0 - i as f64).collect();
        closes.extend([84.0, 87.0, 90.0, 80.0]);
        let orders = drive(&mut strategy(), &from_closes(&closes));

        // exit and fresh short on the same bar
        assert_eq!(orders.len(), 3);
        assert!(orders[1..].iter().all(|(i, o)| *i == 23 && o.side == Side::Sell));
        assert!(orders[2].1.comment.is_none());
    }

    #[test]
    fn test_invalid_levels() {
        let cfg = EmaRsiTrendConfig {
            long_level: 40.0,
            short_level: 60.0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }
}
