//! Inside Bar Breakout Strategy
//!
//! Setup: high below and low above the previous bar's (inside bar)
//! Entry: within `setup_bars`, close above the mother high -> long,
//!        below the mother low -> short

use crate::protection::ProtectionConfig;
use crate::strategies::{percent_protection, Strategy, StrategyContext};
use crate::Candle;

use super::config::InsideBarBreakoutConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Setup {
    mother_high: f64,
    mother_low: f64,
    bars_left: usize,
}

pub struct InsideBarBreakoutStrategy {
    config: InsideBarBreakoutConfig,
    prev: Option<Candle>,
    setup: Option<Setup>,
}

impl InsideBarBreakoutStrategy {
    pub fn new(config: InsideBarBreakoutConfig) -> Result<Self, crate::error::StrategyError> {
        config.validate()?;
        Ok(Self {
            config,
            prev: None,
            setup: None,
        })
    }

    fn is_inside(mother: &Candle, candle: &Candle) -> bool {
        candle.high < mother.high && candle.low > mother.low
    }
}

impl Strategy for InsideBarBreakoutStrategy {
    fn name(&self) -> &'static str {
        "inside_bar_breakout"
    }

    fn protection(&self) -> Option<ProtectionConfig> {
        percent_protection(self.config.take_profit_pct, self.config.stop_loss_pct)
    }

    fn on_candle(&mut self, candle: &Candle, ctx: &mut StrategyContext<'_>) {
        let Some(mother) = self.prev.replace(candle.clone()) else {
            return;
        };

        if Self::is_inside(&mother, candle) {
            // A nested inside bar keeps the original mother range
            if self.setup.is_none() {
                tracing::trace!(mother_high = mother.high, mother_low = mother.low, "Inside bar");
                self.setup = Some(Setup {
                    mother_high: mother.high,
                    mother_low: mother.low,
                    bars_left: self.config.setup_bars,
                });
            }
            return;
        }

        let Some(mut setup) = self.setup.take() else {
            return;
        };
        let close = candle.close;
        if close > setup.mother_high {
            tracing::debug!(close, mother_high = setup.mother_high, "Inside bar breakout up");
            ctx.go_long();
        } else if close < setup.mother_low {
            tracing::debug!(close, mother_low = setup.mother_low, "Inside bar breakout down");
            if self.config.allow_shorts {
                ctx.go_short();
            } else if ctx.is_long() {
                ctx.close_position();
            }
        } else {
            setup.bars_left -= 1;
            if setup.bars_left > 0 {
                self.setup = Some(setup);
            }
        }
    }

    fn reset(&mut self) {
        self.prev = None;
        self.setup = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::test_support::{bar, drive};
    use crate::Side;

    #[test]
    fn test_breakout_above_mother_bar() {
        let candles = vec![
            bar(0, 100.0, 110.0, 90.0, 105.0, 1000.0),
            bar(1, 104.0, 106.0, 98.0, 102.0, 1000.0),
            bar(2, 102.0, 113.0, 101.0, 112.0, 1000.0),
        ];
        let mut s = InsideBarBreakoutStrategy::new(InsideBarBreakoutConfig::default()).unwrap();
        let orders = drive(&mut s, &candles);

        assert_eq!(orders.len(), 1);
        assert_eq!((orders[0].0, orders[0].1.side), (2, Side::Buy));
        assert!(s.setup.is_none());
    }

    #[test]
    fn test_breakdown_goes_short() {
        let candles = vec![
            bar(0, 100.0, 110.0, 90.0, 105.0, 1000.0),
            bar(1, 104.0, 106.0, 98.0, 102.0, 1000.0),
            bar(2, 102.0, 104.0, 96.0, 97.0, 1000.0),
            bar(3, 97.0, 98.0, 86.0, 88.0, 1000.0),
        ];
        let mut s = InsideBarBreakoutStrategy::new(InsideBarBreakoutConfig::default()).unwrap();
        let orders = drive(&mut s, &candles);

        assert_eq!(orders.len(), 1);
        assert_eq!((orders[0].0, orders[0].1.side), (3, Side::Sell));
    }

    #[test]
    fn test_setup_expires() {
        let mut candles = vec![
            bar(0, 100.0, 110.0, 90.0, 105.0, 1000.0),
            bar(1, 104.0, 106.0, 98.0, 102.0, 1000.0),
        ];
        // Bars that are not inside bar 1 but stay inside the mother range
        candles.push(bar(2, 102.0, 107.0, 97.0, 103.0, 1000.0));
        candles.push(bar(3, 103.0, 108.0, 96.0, 100.0, 1000.0));
        candles.push(bar(4, 100.0, 109.0, 95.0, 101.0, 1000.0));
        candles.push(bar(5, 101.0, 116.0, 94.5, 115.0, 1000.0));

        let mut s = InsideBarBreakoutStrategy::new(InsideBarBreakoutConfig::default()).unwrap();
        assert!(drive(&mut s, &candles).is_empty());
    }
}
