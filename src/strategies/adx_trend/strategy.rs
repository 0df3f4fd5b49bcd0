//! ADX Trend Strategy
//!
//! Entry: ADX above `entry_threshold`; +DI > -DI -> long, -DI > +DI -> short
//! Exit: ADX below `exit_threshold`, or the DMI lines flip against the position

use crate::indicators::{directional_index, DirectionalIndex, DirectionalOutput, Formed};
use crate::protection::ProtectionConfig;
use crate::strategies::{percent_protection, Strategy, StrategyContext};
use crate::Candle;

use super::config::AdxTrendConfig;

pub struct AdxTrendStrategy {
    config: AdxTrendConfig,
    dmi: Formed<DirectionalIndex, DirectionalOutput>,
}

impl AdxTrendStrategy {
    pub fn new(config: AdxTrendConfig) -> Result<Self, crate::error::StrategyError> {
        config.validate()?;
        Ok(Self {
            dmi: directional_index(config.adx_period)?,
            config,
        })
    }
}

impl Strategy for AdxTrendStrategy {
    fn name(&self) -> &'static str {
        "adx_trend"
    }

    fn protection(&self) -> Option<ProtectionConfig> {
        percent_protection(self.config.take_profit_pct, self.config.stop_loss_pct)
    }

    fn on_candle(&mut self, candle: &Candle, ctx: &mut StrategyContext<'_>) {
        let DirectionalOutput {
            plus_di,
            minus_di,
            adx,
        } = self.dmi.process(candle);
        if !self.dmi.is_formed() {
            return;
        }

        let weakening = adx < self.config.exit_threshold;
        if (ctx.is_long() && (weakening || minus_di > plus_di))
            || (ctx.is_short() && (weakening || plus_di > minus_di))
        {
            tracing::debug!(adx, plus_di, minus_di, "Trend faded, closing");
            ctx.close_position();
            ctx.with_comment("trend faded");
        }

        if !ctx.is_flat() || adx <= self.config.entry_threshold {
            return;
        }
        if plus_di > minus_di {
            tracing::debug!(adx, plus_di, minus_di, "Strong uptrend");
            ctx.go_long();
        } else if minus_di > plus_di && self.config.allow_shorts {
            tracing::debug!(adx, plus_di, minus_di, "Strong downtrend");
            ctx.go_short();
        }
    }

    fn reset(&mut self) {
        self.dmi.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::test_support::{bar, drive};
    use crate::Side;

    /// Bars stepping `step` per bar with a fixed 2-point range
    fn trend(start: usize, n: usize, from: f64, step: f64) -> Vec<Candle> {
        (0..n)
            .map(|i| {
                let mid = from + step * i as f64;
                bar(start + i, mid, mid + 1.0, mid - 1.0, mid + step / 2.0, 1000.0)
            })
            .collect()
    }

    #[test]
    fn test_uptrend_entry_after_warmup() {
        let mut s = AdxTrendStrategy::new(AdxTrendConfig {
            adx_period: 5,
            ..Default::default()
        })
        .unwrap();
        let orders = drive(&mut s, &trend(0, 20, 100.0, 1.0));

        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].0, 9);
        assert_eq!(orders[0].1.side, Side::Buy);
    }

    #[test]
    fn test_reversal_closes_long() {
        let mut candles = trend(0, 15, 100.0, 1.0);
        candles.extend(trend(15, 10, 113.0, -1.0));
        let mut s = AdxTrendStrategy::new(AdxTrendConfig {
            adx_period: 5,
            allow_shorts: false,
            ..Default::default()
        })
        .unwrap();
        let orders = drive(&mut s, &candles);

        assert_eq!(orders.len(), 2);
        assert_eq!(orders[1].1.side, Side::Sell);
        assert_eq!(orders[1].1.comment.as_deref(), Some("trend faded"));
        assert!(orders[1].0 >= 15);
    }

    #[test]
    fn test_exit_threshold_above_entry_rejected() {
        let cfg = AdxTrendConfig {
            exit_threshold: 30.0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }
}
