//! Volume Spike Strategy
//!
//! Entry: volume above `volume_multiplier` x its average of the previous bars,
//!        ROC > `min_roc` -> long, ROC < -`min_roc` -> short
//! Exit: `max_hold_bars` after entry (protection handles the rest)

use crate::indicators::{rate_of_change, sma, Roc, Sma};
use crate::protection::ProtectionConfig;
use crate::strategies::{percent_protection, Strategy, StrategyContext};
use crate::Candle;

use super::config::VolumeSpikeConfig;

pub struct VolumeSpikeStrategy {
    config: VolumeSpikeConfig,
    volume_avg: Sma,
    roc: Roc,
    bars_in_trade: usize,
}

impl VolumeSpikeStrategy {
    pub fn new(config: VolumeSpikeConfig) -> Result<Self, crate::error::StrategyError> {
        config.validate()?;
        Ok(Self {
            volume_avg: sma(config.volume_period)?,
            roc: rate_of_change(config.roc_period)?,
            config,
            bars_in_trade: 0,
        })
    }
}

impl Strategy for VolumeSpikeStrategy {
    fn name(&self) -> &'static str {
        "volume_spike"
    }

    fn protection(&self) -> Option<ProtectionConfig> {
        percent_protection(self.config.take_profit_pct, self.config.stop_loss_pct)
    }

    fn on_candle(&mut self, candle: &Candle, ctx: &mut StrategyContext<'_>) {
        // Baseline excludes the bar being judged
        let baseline = self.volume_avg.value();
        self.volume_avg.process(candle.volume);
        let roc = self.roc.process(candle.close);

        if ctx.is_flat() {
            self.bars_in_trade = 0;
        } else {
            self.bars_in_trade += 1;
            if self.config.max_hold_bars > 0 && self.bars_in_trade >= self.config.max_hold_bars {
                ctx.close_position();
                ctx.with_comment("max hold");
                self.bars_in_trade = 0;
                return;
            }
        }

        let Some(baseline) = baseline else {
            return;
        };
        if !self.roc.is_formed() || !ctx.is_flat() {
            return;
        }
        if candle.volume <= baseline * self.config.volume_multiplier {
            return;
        }

        if roc > self.config.min_roc {
            tracing::debug!(volume = candle.volume, baseline, roc, "Volume spike up");
            ctx.go_long();
        } else if roc < -self.config.min_roc && self.config.allow_shorts {
            tracing::debug!(volume = candle.volume, baseline, roc, "Volume spike down");
            ctx.go_short();
        }
    }

    fn reset(&mut self) {
        self.volume_avg.reset();
        self.roc.reset();
        self.bars_in_trade = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::test_support::{bar, drive};
    use crate::Side;

    fn bars_with_volume(closes_volumes: &[(f64, f64)]) -> Vec<Candle> {
        closes_volumes
            .iter()
            .enumerate()
            .map(|(i, &(c, v))| bar(i, c, c + 1.0, c - 1.0, c, v))
            .collect()
    }

    #[test]
    fn test_spike_with_momentum_then_time_exit() {
        let mut data: Vec<(f64, f64)> = (0..25).map(|i| (100.0 + 0.1 * i as f64, 1000.0)).collect();
        data.push((104.0, 5000.0));
        data.extend((0..6).map(|_| (104.0, 1000.0)));

        let mut s = VolumeSpikeStrategy::new(VolumeSpikeConfig {
            max_hold_bars: 3,
            ..Default::default()
        })
        .unwrap();
        let orders = drive(&mut s, &bars_with_volume(&data));

        assert_eq!(orders.len(), 2);
        assert_eq!((orders[0].0, orders[0].1.side), (25, Side::Buy));
        assert_eq!((orders[1].0, orders[1].1.side), (28, Side::Sell));
        assert_eq!(orders[1].1.comment.as_deref(), Some("max hold"));
    }

    #[test]
    fn test_spike_down_goes_short() {
        let mut data: Vec<(f64, f64)> = (0..25).map(|_| (100.0, 1000.0)).collect();
        data.push((95.0, 3000.0));
        let mut s = VolumeSpikeStrategy::new(VolumeSpikeConfig::default()).unwrap();
        let orders = drive(&mut s, &bars_with_volume(&data));

        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].1.side, Side::Sell);
    }

    #[test]
    fn test_normal_volume_ignored() {
        let data: Vec<(f64, f64)> = (0..40).map(|i| (100.0 + i as f64, 1500.0)).collect();
        let mut s = VolumeSpikeStrategy::new(VolumeSpikeConfig::default()).unwrap();
        assert!(drive(&mut s, &bars_with_volume(&data)).is_empty());
    }
}
