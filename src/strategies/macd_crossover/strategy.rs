//! MACD Crossover Strategy
//!
//! Entry: MACD crosses above signal -> long, below -> short (or flat when
//! shorts are disabled)
//! Filter: with `zero_line_filter`, longs need MACD > 0 and shorts MACD < 0

use crate::indicators::{crossed_above, crossed_below, macd, Macd};
use crate::protection::ProtectionConfig;
use crate::strategies::{percent_protection, Strategy, StrategyContext};
use crate::Candle;

use super::config::MacdCrossoverConfig;

pub struct MacdCrossoverStrategy {
    config: MacdCrossoverConfig,
    macd: Macd,
    /// (macd, signal)
    prev: Option<(f64, f64)>,
}

impl MacdCrossoverStrategy {
    pub fn new(config: MacdCrossoverConfig) -> Result<Self, crate::error::StrategyError> {
        config.validate()?;
        Ok(Self {
            macd: macd(config.fast_period, config.slow_period, config.signal_period)?,
            config,
            prev: None,
        })
    }
}

impl Strategy for MacdCrossoverStrategy {
    fn name(&self) -> &'static str {
        "macd_crossover"
    }

    fn protection(&self) -> Option<ProtectionConfig> {
        percent_protection(self.config.take_profit_pct, self.config.stop_loss_pct)
    }

    fn on_candle(&mut self, candle: &Candle, ctx: &mut StrategyContext<'_>) {
        let out = self.macd.process(candle.close);
        if !self.macd.is_formed() {
            return;
        }
        let Some((prev_macd, prev_signal)) = self.prev.replace((out.macd, out.signal)) else {
            return;
        };
        let filter = self.config.zero_line_filter;

        if crossed_above(prev_macd, prev_signal, out.macd, out.signal) {
            if !filter || out.macd > 0.0 {
                tracing::debug!(macd = out.macd, signal = out.signal, "MACD bullish cross");
                ctx.go_long();
            } else if ctx.is_short() {
                ctx.close_position();
            }
        } else if crossed_below(prev_macd, prev_signal, out.macd, out.signal) {
            if self.config.allow_shorts && (!filter || out.macd < 0.0) {
                tracing::debug!(macd = out.macd, signal = out.signal, "MACD bearish cross");
                ctx.go_short();
            } else if ctx.is_long() {
                ctx.close_position();
            }
        }
    }

    fn reset(&mut self) {
        self.macd.reset();
        self.prev = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::test_support::{drive, from_closes, net_position};
    use crate::Side;

    fn config() -> MacdCrossoverConfig {
        MacdCrossoverConfig {
            fast_period: 3,
            slow_period: 6,
            signal_period: 3,
            ..Default::default()
        }
    }

    fn v_shape() -> Vec<f64> {
        let mut closes: Vec<f64> = (0..20).map(|i| 100.0 - i as f64).collect();
        closes.extend((1..=10).map(|i| 81.0 + 2.0 * i as f64));
        closes
    }

    #[test]
    fn test_bullish_cross_after_reversal() {
        let mut s = MacdCrossoverStrategy::new(config()).unwrap();
        let orders = drive(&mut s, &from_closes(&v_shape()));

        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].0, 20);
        assert_eq!(orders[0].1.side, Side::Buy);
        assert_eq!(net_position(&orders), 1.0);
    }

    #[test]
    fn test_zero_line_filter_delays_entry() {
        let mut s = MacdCrossoverStrategy::new(MacdCrossoverConfig {
            zero_line_filter: true,
            ..config()
        })
        .unwrap();
        // The cross happens while MACD is still negative
        assert!(drive(&mut s, &from_closes(&v_shape())).is_empty());
    }

    #[test]
    fn test_bearish_cross_without_shorts_only_exits() {
        let mut closes = v_shape();
        closes.extend((1..=10).map(|i| 101.0 - 3.0 * i as f64));
        let mut s = MacdCrossoverStrategy::new(MacdCrossoverConfig {
            allow_shorts: false,
            ..config()
        })
        .unwrap();
        let orders = drive(&mut s, &from_closes(&closes));

        assert_eq!(orders.len(), 2);
        assert_eq!(orders[1].1.side, Side::Sell);
        assert_eq!(net_position(&orders), 0.0);
    }
}
