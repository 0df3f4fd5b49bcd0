//! Bollinger Band Reversion Strategy
//!
//! Entry: close below the lower band -> long, above the upper band -> short
//! Exit: close reaches the middle band

use crate::indicators::{bollinger, Bollinger};
use crate::protection::ProtectionConfig;
use crate::strategies::{percent_protection, Strategy, StrategyContext};
use crate::Candle;

use super::config::BollingerReversionConfig;

pub struct BollingerReversionStrategy {
    config: BollingerReversionConfig,
    bands: Bollinger,
}

impl BollingerReversionStrategy {
    pub fn new(config: BollingerReversionConfig) -> Result<Self, crate::error::StrategyError> {
        config.validate()?;
        Ok(Self {
            bands: bollinger(config.period, config.width)?,
            config,
        })
    }
}

impl Strategy for BollingerReversionStrategy {
    fn name(&self) -> &'static str {
        "bollinger_reversion"
    }

    fn protection(&self) -> Option<ProtectionConfig> {
        percent_protection(self.config.take_profit_pct, self.config.stop_loss_pct)
    }

    fn on_candle(&mut self, candle: &Candle, ctx: &mut StrategyContext<'_>) {
        let bands = self.bands.process(candle.close);
        if !self.bands.is_formed() {
            return;
        }
        let close = candle.close;

        if (ctx.is_long() && close >= bands.average) || (ctx.is_short() && close <= bands.average)
        {
            ctx.close_position();
            ctx.with_comment("middle band");
            return;
        }

        if ctx.is_flat() {
            if close < bands.lower {
                tracing::debug!(close, lower = bands.lower, "Close below lower band");
                ctx.go_long();
            } else if close > bands.upper && self.config.allow_shorts {
                tracing::debug!(close, upper = bands.upper, "Close above upper band");
                ctx.go_short();
            }
        }
    }

    fn reset(&mut self) {
        self.bands.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::test_support::{drive, from_closes};
    use crate::Side;

    fn strategy() -> BollingerReversionStrategy {
        BollingerReversionStrategy::new(BollingerReversionConfig {
            period: 10,
            ..Default::default()
        })
        .unwrap()
    }

    fn choppy(n: usize) -> Vec<f64> {
        (0..n).map(|i| if i % 2 == 0 { 100.0 } else { 101.0 }).collect()
    }

    #[test]
    fn test_dip_below_lower_band_then_exit_at_middle() {
        let mut closes = choppy(10);
        closes.extend([90.0, 100.0]);
        let orders = drive(&mut strategy(), &from_closes(&closes));

        assert_eq!(orders.len(), 2);
        assert_eq!((orders[0].0, orders[0].1.side), (10, Side::Buy));
        assert_eq!((orders[1].0, orders[1].1.side), (11, Side::Sell));
        assert_eq!(orders[1].1.comment.as_deref(), Some("middle band"));
    }

    #[test]
    fn test_spike_above_upper_band_goes_short() {
        let mut closes = choppy(10);
        closes.push(112.0);
        let orders = drive(&mut strategy(), &from_closes(&closes));

        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].1.side, Side::Sell);
    }

    #[test]
    fn test_quiet_market_no_trades() {
        assert!(drive(&mut strategy(), &from_closes(&choppy(40))).is_empty());
    }
}
