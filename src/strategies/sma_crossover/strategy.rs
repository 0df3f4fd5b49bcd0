//! SMA Crossover Strategy
//!
//! Entry: fast SMA crosses above the slow SMA -> long, below -> short
//! Exit: the opposite cross reverses the position

use crate::indicators::{crossed_above, crossed_below, sma, Sma};
use crate::protection::ProtectionConfig;
use crate::strategies::{percent_protection, Strategy, StrategyContext};
use crate::Candle;

use super::config::SmaCrossoverConfig;

pub struct SmaCrossoverStrategy {
    config: SmaCrossoverConfig,
    fast: Sma,
    slow: Sma,
    /// (fast, slow) from the previous formed candle
    prev: Option<(f64, f64)>,
}

impl SmaCrossoverStrategy {
    pub fn new(config: SmaCrossoverConfig) -> Result<Self, crate::error::StrategyError> {
        config.validate()?;
        Ok(Self {
            fast: sma(config.fast_period)?,
            slow: sma(config.slow_period)?,
            config,
            prev: None,
        })
    }
}

impl Strategy for SmaCrossoverStrategy {
    fn name(&self) -> &'static str {
        "sma_crossover"
    }

    fn protection(&self) -> Option<ProtectionConfig> {
        percent_protection(self.config.take_profit_pct, self.config.stop_loss_pct)
    }

    fn on_candle(&mut self, candle: &Candle, ctx: &mut StrategyContext<'_>) {
        let fast = self.fast.process(candle.close);
        let slow = self.slow.process(candle.close);
        if !self.slow.is_formed() {
            return;
        }

        if let Some((prev_fast, prev_slow)) = self.prev {
            if crossed_above(prev_fast, prev_slow, fast, slow) && ctx.go_long() {
                tracing::debug!(fast, slow, close = candle.close, "Fast SMA crossed above slow");
            } else if crossed_below(prev_fast, prev_slow, fast, slow) && ctx.go_short() {
                tracing::debug!(fast, slow, close = candle.close, "Fast SMA crossed below slow");
            }
        }
        self.prev = Some((fast, slow));
    }

    fn reset(&mut self) {
        self.fast.reset();
        self.slow.reset();
        self.prev = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::test_support::{drive, from_closes, net_position};
    use crate::Side;

    fn strategy(fast: usize, slow: usize) -> SmaCrossoverStrategy {
        SmaCrossoverStrategy::new(SmaCrossoverConfig {
            fast_period: fast,
            slow_period: slow,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_no_orders_before_formed() {
        let mut s = strategy(2, 5);
        let orders = drive(&mut s, &from_closes(&[100.0, 101.0, 102.0, 103.0]));
        assert!(orders.is_empty());
    }

    #[test]
    fn test_long_then_reverse_short() {
        let mut s = strategy(2, 4);
        // Declining, then rally (golden cross), then selloff (death cross)
        let closes = [110.0, 108.0, 106.0, 104.0, 102.0, 108.0, 114.0, 116.0, 104.0, 96.0, 90.0];
        let orders = drive(&mut s, &from_closes(&closes));

        assert!(orders.len() >= 2);
        assert_eq!(orders[0].1.side, Side::Buy);
        assert_eq!(orders[0].1.volume, 1.0);
        let (_, reversal) = &orders[1];
        assert_eq!(reversal.side, Side::Sell);
        assert_eq!(reversal.volume, 2.0);
        assert_eq!(net_position(&orders), -1.0);
    }

    #[test]
    fn test_rejects_fast_not_less_than_slow() {
        let cfg = SmaCrossoverConfig {
            fast_period: 30,
            slow_period: 30,
            ..Default::default()
        };
        assert!(SmaCrossoverStrategy::new(cfg).is_err());
    }

    #[test]
    fn test_reset_clears_state() {
        let mut s = strategy(2, 4);
        drive(&mut s, &from_closes(&[100.0, 101.0, 102.0, 103.0, 104.0]));
        s.reset();
        assert!(s.prev.is_none());
        assert!(!s.slow.is_formed());
    }
}
