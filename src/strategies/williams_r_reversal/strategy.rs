//! Williams %R Reversal Strategy
//!
//! Entry: %R crosses back above `oversold` -> long, back below `overbought` -> short

use crate::indicators::{crossed_above, crossed_below, williams_r, Formed, WilliamsR};
use crate::protection::ProtectionConfig;
use crate::strategies::{percent_protection, Strategy, StrategyContext};
use crate::Candle;

use super::config::WilliamsRReversalConfig;

pub struct WilliamsRReversalStrategy {
    config: WilliamsRReversalConfig,
    wr: Formed<WilliamsR, f64>,
    prev: Option<f64>,
}

impl WilliamsRReversalStrategy {
    pub fn new(config: WilliamsRReversalConfig) -> Result<Self, crate::error::StrategyError> {
        config.validate()?;
        Ok(Self {
            wr: williams_r(config.period)?,
            config,
            prev: None,
        })
    }
}

impl Strategy for WilliamsRReversalStrategy {
    fn name(&self) -> &'static str {
        "williams_r_reversal"
    }

    fn protection(&self) -> Option<ProtectionConfig> {
        percent_protection(self.config.take_profit_pct, self.config.stop_loss_pct)
    }

    fn on_candle(&mut self, candle: &Candle, ctx: &mut StrategyContext<'_>) {
        let wr = self.wr.process(candle);
        if !self.wr.is_formed() {
            return;
        }
        let Some(prev) = self.prev.replace(wr) else {
            return;
        };

        let (oversold, overbought) = (self.config.oversold, self.config.overbought);
        if crossed_above(prev, oversold, wr, oversold) {
            tracing::debug!(williams_r = wr, "Williams %R left oversold");
            ctx.go_long();
        } else if crossed_below(prev, overbought, wr, overbought) {
            tracing::debug!(williams_r = wr, "Williams %R left overbought");
            if self.config.allow_shorts {
                ctx.go_short();
            } else if ctx.is_long() {
                ctx.close_position();
            }
        }
    }

    fn reset(&mut self) {
        self.wr.reset();
        self.prev = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::test_support::{drive, from_closes, net_position};
    use crate::Side;

    fn strategy(allow_shorts: bool) -> WilliamsRReversalStrategy {
        WilliamsRReversalStrategy::new(WilliamsRReversalConfig {
            period: 5,
            allow_shorts,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_bounce_from_oversold() {
        let mut closes: Vec<f64> = (0..10).map(|i| 100.0 - i as f64).collect();
        closes.push(94.0);
        let orders = drive(&mut strategy(true), &from_closes(&closes));

        assert_eq!(orders.len(), 1);
        assert_eq!((orders[0].0, orders[0].1.side), (10, Side::Buy));
    }

    #[test]
    fn test_round_trip_long_only() {
        let mut closes: Vec<f64> = (0..10).map(|i| 100.0 - i as f64).collect();
        closes.extend([94.0, 97.0, 100.0, 103.0, 100.0]);
        let orders = drive(&mut strategy(false), &from_closes(&closes));

        assert_eq!(orders.len(), 2);
        assert_eq!(orders[1].1.side, Side::Sell);
        assert_eq!(net_position(&orders), 0.0);
    }
}
