//! Polynomial Regression Reversion Strategy
//!
//! Entry: close more than `deviation` residual sigmas below the fit -> long,
//!        above -> short
//! Exit: close returns to the fitted value

use crate::indicators::{polynomial_regression, Formed, PolynomialRegression, RegressionOutput};
use crate::protection::ProtectionConfig;
use crate::strategies::{percent_protection, Strategy, StrategyContext};
use crate::Candle;

use super::config::PolynomialRegressionConfig;

/// Residual sigma below this fraction of price is treated as a perfect fit
const MIN_RELATIVE_SIGMA: f64 = 1e-9;

pub struct PolynomialRegressionStrategy {
    config: PolynomialRegressionConfig,
    fit: Formed<PolynomialRegression, RegressionOutput>,
}

impl PolynomialRegressionStrategy {
    pub fn new(config: PolynomialRegressionConfig) -> Result<Self, crate::error::StrategyError> {
        config.validate()?;
        Ok(Self {
            fit: polynomial_regression(config.period, config.degree)?,
            config,
        })
    }
}

impl Strategy for PolynomialRegressionStrategy {
    fn name(&self) -> &'static str {
        "polynomial_regression"
    }

    fn protection(&self) -> Option<ProtectionConfig> {
        percent_protection(self.config.take_profit_pct, self.config.stop_loss_pct)
    }

    fn on_candle(&mut self, candle: &Candle, ctx: &mut StrategyContext<'_>) {
        let fit = self.fit.process(candle.close);
        if !self.fit.is_formed() {
            return;
        }
        let close = candle.close;

        if (ctx.is_long() && close >= fit.value) || (ctx.is_short() && close <= fit.value) {
            ctx.close_position();
            ctx.with_comment("back to fit");
            return;
        }

        if !ctx.is_flat() || fit.residual_std <= MIN_RELATIVE_SIGMA * close.abs() {
            return;
        }
        let band = self.config.deviation * fit.residual_std;
        let deviation = close - fit.value;
        if deviation < -band {
            tracing::debug!(close, fit = fit.value, sigma = fit.residual_std, slope = fit.slope, "Close far below fit");
            ctx.go_long();
        } else if deviation > band && self.config.allow_shorts {
            tracing::debug!(close, fit = fit.value, sigma = fit.residual_std, slope = fit.slope, "Close far above fit");
            ctx.go_short();
        }
    }

    fn reset(&mut self) {
        self.fit.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::test_support::{drive, from_closes};
    use crate::Side;

    fn linear(period: usize) -> PolynomialRegressionStrategy {
        PolynomialRegressionStrategy::new(PolynomialRegressionConfig {
            period,
            degree: 1,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_fades_drop_and_exits_on_return() {
        let mut closes = vec![100.0; 12];
        closes.extend([90.0, 101.0]);
        let orders = drive(&mut linear(10), &from_closes(&closes));

        assert_eq!(orders.len(), 2);
        assert_eq!((orders[0].0, orders[0].1.side), (12, Side::Buy));
        assert_eq!((orders[1].0, orders[1].1.side), (13, Side::Sell));
        assert_eq!(orders[1].1.comment.as_deref(), Some("back to fit"));
    }

    #[test]
    fn test_fades_spike() {
        let mut closes: Vec<f64> = (0..12).map(|i| 100.0 + 0.3 * (i % 2) as f64).collect();
        closes.push(110.0);
        let orders = drive(&mut linear(10), &from_closes(&closes));

        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].1.side, Side::Sell);
    }

    #[test]
    fn test_perfect_fit_never_trades() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + 0.5 * i as f64).collect();
        assert!(drive(&mut linear(10), &from_closes(&closes)).is_empty());
    }

    #[test]
    fn test_degree_bounds() {
        let cfg = PolynomialRegressionConfig {
            period: 3,
            degree: 3,
            ..Default::default()
        };
        assert!(PolynomialRegressionStrategy::new(cfg).is_err());
    }
}
