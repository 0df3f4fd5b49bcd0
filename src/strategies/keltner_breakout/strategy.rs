//! Keltner Channel Breakout Strategy
//!
//! Entry: close above the upper channel -> long, below the lower -> short
//! Exit: close back through the middle line

use crate::indicators::{keltner, Keltner};
use crate::protection::ProtectionConfig;
use crate::strategies::{percent_protection, Strategy, StrategyContext};
use crate::Candle;

use super::config::KeltnerBreakoutConfig;

pub struct KeltnerBreakoutStrategy {
    config: KeltnerBreakoutConfig,
    channel: Keltner,
}

impl KeltnerBreakoutStrategy {
    pub fn new(config: KeltnerBreakoutConfig) -> Result<Self, crate::error::StrategyError> {
        config.validate()?;
        Ok(Self {
            channel: keltner(config.period, config.multiplier)?,
            config,
        })
    }
}

impl Strategy for KeltnerBreakoutStrategy {
    fn name(&self) -> &'static str {
        "keltner_breakout"
    }

    fn protection(&self) -> Option<ProtectionConfig> {
        percent_protection(self.config.take_profit_pct, self.config.stop_loss_pct)
    }

    fn on_candle(&mut self, candle: &Candle, ctx: &mut StrategyContext<'_>) {
        let kc = self.channel.process(candle);
        if !self.channel.is_formed() {
            return;
        }
        let close = candle.close;

        if close > kc.upper {
            if !ctx.is_long() {
                tracing::debug!(close, upper = kc.upper, "Keltner upside breakout");
                ctx.go_long();
            }
        } else if close < kc.lower {
            if self.config.allow_shorts && !ctx.is_short() {
                tracing::debug!(close, lower = kc.lower, "Keltner downside breakout");
                ctx.go_short();
            } else if ctx.is_long() {
                ctx.close_position();
            }
        } else if (ctx.is_long() && close < kc.average) || (ctx.is_short() && close > kc.average) {
            ctx.close_position();
            ctx.with_comment("Keltner middle");
        }
    }

    fn reset(&mut self) {
        self.channel.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::test_support::{bar, drive};
    use crate::Side;

    fn quiet(n: usize) -> Vec<Candle> {
        (0..n).map(|i| bar(i, 100.0, 101.0, 99.0, 100.0, 1000.0)).collect()
    }

    #[test]
    fn test_breakout_then_exit_at_middle() {
        let mut candles = quiet(25);
        candles.push(bar(25, 100.0, 110.5, 99.5, 110.0, 1000.0));
        candles.push(bar(26, 110.0, 110.5, 99.5, 100.0, 1000.0));
        let mut s = KeltnerBreakoutStrategy::new(KeltnerBreakoutConfig::default()).unwrap();
        let orders = drive(&mut s, &candles);

        assert_eq!(orders.len(), 2);
        assert_eq!((orders[0].0, orders[0].1.side), (25, Side::Buy));
        assert_eq!((orders[1].0, orders[1].1.side), (26, Side::Sell));
        assert_eq!(orders[1].1.comment.as_deref(), Some("Keltner middle"));
    }

    #[test]
    fn test_quiet_market_no_trades() {
        let mut s = KeltnerBreakoutStrategy::new(KeltnerBreakoutConfig::default()).unwrap();
        assert!(drive(&mut s, &quiet(50)).is_empty());
    }
}
