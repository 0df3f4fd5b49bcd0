//! CCI Reversal Strategy
//!
//! Entry: CCI crosses back above `-level` -> long, back below `+level` -> short
//! Exit: opposite signal, or the zero line when `exit_at_zero` is set

use crate::indicators::{cci, crossed_above, crossed_below, Cci};
use crate::protection::ProtectionConfig;
use crate::strategies::{percent_protection, Strategy, StrategyContext};
use crate::Candle;

use super::config::CciReversalConfig;

pub struct CciReversalStrategy {
    config: CciReversalConfig,
    cci: Cci,
    prev_cci: Option<f64>,
}

impl CciReversalStrategy {
    pub fn new(config: CciReversalConfig) -> Result<Self, crate::error::StrategyError> {
        config.validate()?;
        Ok(Self {
            cci: cci(config.cci_period)?,
            config,
            prev_cci: None,
        })
    }
}

impl Strategy for CciReversalStrategy {
    fn name(&self) -> &'static str {
        "cci_reversal"
    }

    fn protection(&self) -> Option<ProtectionConfig> {
        percent_protection(self.config.take_profit_pct, self.config.stop_loss_pct)
    }

    fn on_candle(&mut self, candle: &Candle, ctx: &mut StrategyContext<'_>) {
        let value = self.cci.process(candle);
        if !self.cci.is_formed() {
            return;
        }
        let Some(prev) = self.prev_cci.replace(value) else {
            return;
        };
        let level = self.config.level;

        if self.config.exit_at_zero
            && ((ctx.is_long() && crossed_above(prev, 0.0, value, 0.0))
                || (ctx.is_short() && crossed_below(prev, 0.0, value, 0.0)))
        {
            ctx.close_position();
            ctx.with_comment("CCI zero line");
        }

        if crossed_above(prev, -level, value, -level) {
            tracing::debug!(cci = value, "CCI left oversold zone");
            ctx.go_long();
        } else if crossed_below(prev, level, value, level) {
            tracing::debug!(cci = value, "CCI left overbought zone");
            ctx.go_short();
        }
    }

    fn reset(&mut self) {
        self.cci.reset();
        self.prev_cci = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::test_support::{drive, from_closes};
    use crate::Side;

    #[test]
    fn test_oversold_exit_goes_long() {
        let mut closes = vec![100.0; 12];
        closes.extend([96.0, 92.0, 88.0, 90.0, 93.0, 96.0]);
        let mut s = CciReversalStrategy::new(CciReversalConfig {
            cci_period: 10,
            ..Default::default()
        })
        .unwrap();
        let orders = drive(&mut s, &from_closes(&closes));

        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].1.side, Side::Buy);
        // CCI bottoms on the 88 bar and is back above -100 within a few bars
        assert!((15..=17).contains(&orders[0].0));
    }

    #[test]
    fn test_flat_market_stays_out() {
        let mut s = CciReversalStrategy::new(CciReversalConfig::default()).unwrap();
        assert!(drive(&mut s, &from_closes(&[100.0; 50])).is_empty());
    }
}
