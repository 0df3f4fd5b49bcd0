//! Stochastic Cross Strategy
//!
//! Entry: %K crosses above %D while %D is below `oversold` -> long;
//!        %K crosses below %D while %D is above `overbought` -> short
//! Exit: the opposite signal (or protection)

use crate::indicators::{crossed_above, crossed_below, stochastic, Formed, Stochastic, StochasticOutput};
use crate::protection::ProtectionConfig;
use crate::strategies::{percent_protection, Strategy, StrategyContext};
use crate::Candle;

use super::config::StochasticCrossConfig;

pub struct StochasticCrossStrategy {
    config: StochasticCrossConfig,
    stoch: Formed<Stochastic, StochasticOutput>,
    prev: Option<StochasticOutput>,
}

impl StochasticCrossStrategy {
    pub fn new(config: StochasticCrossConfig) -> Result<Self, crate::error::StrategyError> {
        config.validate()?;
        Ok(Self {
            stoch: stochastic(config.k_period, config.k_smoothing, config.d_period)?,
            config,
            prev: None,
        })
    }
}

impl Strategy for StochasticCrossStrategy {
    fn name(&self) -> &'static str {
        "stochastic_cross"
    }

    fn protection(&self) -> Option<ProtectionConfig> {
        percent_protection(self.config.take_profit_pct, self.config.stop_loss_pct)
    }

    fn on_candle(&mut self, candle: &Candle, ctx: &mut StrategyContext<'_>) {
        let now = self.stoch.process(candle);
        if !self.stoch.is_formed() {
            return;
        }
        let Some(prev) = self.prev.replace(now) else {
            return;
        };

        if crossed_above(prev.k, prev.d, now.k, now.d) && now.d < self.config.oversold {
            tracing::debug!(k = now.k, d = now.d, "Stochastic bullish cross in oversold zone");
            ctx.go_long();
        } else if crossed_below(prev.k, prev.d, now.k, now.d) && now.d > self.config.overbought {
            tracing::debug!(k = now.k, d = now.d, "Stochastic bearish cross in overbought zone");
            if self.config.allow_shorts {
                ctx.go_short();
            } else if ctx.is_long() {
                ctx.close_position();
            }
        }
    }

    fn reset(&mut self) {
        self.stoch.reset();
        self.prev = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::test_support::{drive, from_closes};
    use crate::Side;

    fn strategy() -> StochasticCrossStrategy {
        StochasticCrossStrategy::new(StochasticCrossConfig {
            k_period: 5,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_bullish_cross_at_bottom() {
        let mut closes: Vec<f64> = (0..20).map(|i| 100.0 - i as f64).collect();
        closes.extend([83.0, 86.0, 89.0]);
        let orders = drive(&mut strategy(), &from_closes(&closes));

        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].0, 20);
        assert_eq!(orders[0].1.side, Side::Buy);
    }

    #[test]
    fn test_bearish_cross_at_top() {
        let mut closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        closes.extend([116.0, 113.0, 110.0]);
        let orders = drive(&mut strategy(), &from_closes(&closes));

        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].1.side, Side::Sell);
    }

    #[test]
    fn test_zone_levels_validated() {
        let cfg = StochasticCrossConfig {
            oversold: 80.0,
            overbought: 20.0,
            ..Default::default()
        };
        assert!(StochasticCrossStrategy::new(cfg).is_err());
    }
}
