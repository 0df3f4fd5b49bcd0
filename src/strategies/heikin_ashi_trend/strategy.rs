//! Heikin-Ashi Trend Strategy
//!
//! Entry: `consecutive` bullish HA candles without a lower wick -> long;
//!        bearish without an upper wick -> short
//! Exit: first HA candle of the opposite colour

use crate::indicators::{heikin_ashi, Formed, HeikinAshi, HeikinAshiCandle};
use crate::protection::ProtectionConfig;
use crate::strategies::{percent_protection, Strategy, StrategyContext};
use crate::Candle;

use super::config::HeikinAshiTrendConfig;

pub struct HeikinAshiTrendStrategy {
    config: HeikinAshiTrendConfig,
    ha: Formed<HeikinAshi, HeikinAshiCandle>,
    /// Positive: strong bullish streak length, negative: strong bearish
    streak: i64,
}

impl HeikinAshiTrendStrategy {
    pub fn new(config: HeikinAshiTrendConfig) -> Result<Self, crate::error::StrategyError> {
        config.validate()?;
        Ok(Self {
            config,
            ha: heikin_ashi(),
            streak: 0,
        })
    }

    fn update_streak(&mut self, ha: &HeikinAshiCandle) {
        let tolerance = self.config.wick_tolerance * ha.close.abs();
        if ha.is_bullish() && ha.lower_wick() <= tolerance {
            self.streak = self.streak.max(0) + 1;
        } else if ha.is_bearish() && ha.upper_wick() <= tolerance {
            self.streak = self.streak.min(0) - 1;
        } else {
            self.streak = 0;
        }
    }
}

impl Strategy for HeikinAshiTrendStrategy {
    fn name(&self) -> &'static str {
        "heikin_ashi_trend"
    }

    fn protection(&self) -> Option<ProtectionConfig> {
        percent_protection(self.config.take_profit_pct, self.config.stop_loss_pct)
    }

    fn on_candle(&mut self, candle: &Candle, ctx: &mut StrategyContext<'_>) {
        let ha = self.ha.process(candle);
        self.update_streak(&ha);

        if self.config.exit_on_color_change
            && ((ctx.is_long() && ha.is_bearish()) || (ctx.is_short() && ha.is_bullish()))
        {
            ctx.close_position();
            ctx.with_comment("Heikin-Ashi colour change");
        }

        let needed = self.config.consecutive as i64;
        if self.streak >= needed && !ctx.is_long() {
            tracing::debug!(streak = self.streak, ha_close = ha.close, "Heikin-Ashi bullish run");
            ctx.go_long();
        } else if self.streak <= -needed && self.config.allow_shorts && !ctx.is_short() {
            tracing::debug!(streak = self.streak, ha_close = ha.close, "Heikin-Ashi bearish run");
            ctx.go_short();
        }
    }

    fn reset(&mut self) {
        self.ha.reset();
        self.streak = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::test_support::{bar, drive, net_position};
    use crate::Side;

    /// Marubozu-like bars: bullish open at the low, bearish open at the high
    fn strong(start: usize, mids: &[f64], bullish: bool) -> Vec<Candle> {
        mids.iter()
            .enumerate()
            .map(|(i, &m)| {
                if bullish {
                    bar(start + i, m, m + 2.0, m, m + 1.5, 1000.0)
                } else {
                    bar(start + i, m, m, m - 2.0, m - 1.5, 1000.0)
                }
            })
            .collect()
    }

    #[test]
    fn test_enters_after_streak_and_exits_on_colour_change() {
        let ups: Vec<f64> = (0..8).map(|i| 100.0 + i as f64).collect();
        let downs: Vec<f64> = (0..3).map(|i| 107.0 - i as f64).collect();
        let mut candles = strong(0, &ups, true);
        candles.extend(strong(8, &downs, false));

        let mut s = HeikinAshiTrendStrategy::new(HeikinAshiTrendConfig {
            allow_shorts: false,
            ..Default::default()
        })
        .unwrap();
        let orders = drive(&mut s, &candles);

        assert_eq!(orders.len(), 2);
        assert_eq!((orders[0].0, orders[0].1.side), (3, Side::Buy));
        assert_eq!((orders[1].0, orders[1].1.side), (8, Side::Sell));
        assert_eq!(net_position(&orders), 0.0);
    }

    #[test]
    fn test_streak_resets_on_weak_candle() {
        let mut s = HeikinAshiTrendStrategy::new(HeikinAshiTrendConfig::default()).unwrap();
        let ha = HeikinAshiCandle {
            open: 100.0,
            high: 102.0,
            low: 100.0,
            close: 101.0,
        };
        s.update_streak(&ha);
        s.update_streak(&ha);
        assert_eq!(s.streak, 2);

        let wicked = HeikinAshiCandle { low: 99.0, ..ha };
        s.update_streak(&wicked);
        assert_eq!(s.streak, 0);
    }
}
