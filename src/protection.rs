//! Stop-loss / take-profit protection attached to an open position
//!
//! Distances are expressed as a [`Unit`]: an absolute price offset or a
//! percentage of the entry price. The tracker is checked once per finished
//! candle against the candle's extremes.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::StrategyError;
use crate::{Candle, ExitReason, Side};

/// Price distance, absolute or relative to the entry price
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Unit {
    Absolute(f64),
    Percent(f64),
}

impl Unit {
    /// Distance in price terms for the given reference price
    pub fn distance(&self, reference: f64) -> f64 {
        match *self {
            Unit::Absolute(v) => v,
            Unit::Percent(p) => reference * p / 100.0,
        }
    }

    pub fn is_zero(&self) -> bool {
        match *self {
            Unit::Absolute(v) | Unit::Percent(v) => v == 0.0,
        }
    }
}

impl FromStr for Unit {
    type Err = StrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (number, percent) = match trimmed.strip_suffix('%') {
            Some(n) => (n.trim(), true),
            None => (trimmed, false),
        };
        let value: f64 = number
            .parse()
            .map_err(|_| StrategyError::InvalidUnit(s.to_string()))?;
        if !value.is_finite() || value < 0.0 {
            return Err(StrategyError::InvalidUnit(s.to_string()));
        }
        Ok(if percent {
            Unit::Percent(value)
        } else {
            Unit::Absolute(value)
        })
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Absolute(v) => write!(f, "{}", v),
            Unit::Percent(p) => write!(f, "{}%", p),
        }
    }
}

impl Serialize for Unit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Unit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(v) if v.is_finite() && v >= 0.0 => Ok(Unit::Absolute(v)),
            Raw::Number(v) => Err(serde::de::Error::custom(StrategyError::InvalidUnit(
                v.to_string(),
            ))),
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Protection settings for a strategy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProtectionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take_profit: Option<Unit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<Unit>,
    /// Stop follows the best price seen since entry
    #[serde(default)]
    pub trailing: bool,
    /// Exit with market orders (fill at trigger adjusted for slippage)
    #[serde(default = "default_use_market_orders")]
    pub use_market_orders: bool,
}

fn default_use_market_orders() -> bool {
    true
}

impl ProtectionConfig {
    /// Percent-based take profit and stop loss; zero disables a leg
    pub fn percent(take_profit_pct: f64, stop_loss_pct: f64) -> Self {
        Self {
            take_profit: (take_profit_pct > 0.0).then_some(Unit::Percent(take_profit_pct)),
            stop_loss: (stop_loss_pct > 0.0).then_some(Unit::Percent(stop_loss_pct)),
            trailing: false,
            use_market_orders: true,
        }
    }

    pub fn with_trailing(mut self, trailing: bool) -> Self {
        self.trailing = trailing;
        self
    }

    /// Neither leg set (or both zero)
    pub fn is_empty(&self) -> bool {
        self.take_profit.map_or(true, |u| u.is_zero()) && self.stop_loss.map_or(true, |u| u.is_zero())
    }
}

/// A triggered protective exit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProtectionExit {
    pub reason: ExitReason,
    pub price: f64,
}

/// Tracks protective levels for one open position
#[derive(Debug, Clone)]
pub struct ProtectionTracker {
    config: ProtectionConfig,
    side: Side,
    entry_price: f64,
    stop: Option<f64>,
    target: Option<f64>,
    best_price: f64,
}

impl ProtectionTracker {
    /// Arm protection for a position entered at `entry_price`
    pub fn arm(config: ProtectionConfig, side: Side, entry_price: f64) -> Self {
        let dir = side.sign();
        let stop = config
            .stop_loss
            .filter(|u| !u.is_zero())
            .map(|u| entry_price - dir * u.distance(entry_price));
        let target = config
            .take_profit
            .filter(|u| !u.is_zero())
            .map(|u| entry_price + dir * u.distance(entry_price));

        tracing::debug!(
            side = ?side,
            entry = entry_price,
            stop = ?stop,
            target = ?target,
            trailing = config.trailing,
            "Protection armed"
        );

        Self {
            config,
            side,
            entry_price,
            stop,
            target,
            best_price: entry_price,
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn entry_price(&self) -> f64 {
        self.entry_price
    }

    pub fn stop_price(&self) -> Option<f64> {
        self.stop
    }

    pub fn target_price(&self) -> Option<f64> {
        self.target
    }

    /// Protective exits pay slippage when sent as market orders
    pub fn use_market_orders(&self) -> bool {
        self.config.use_market_orders
    }

    /// Re-centre on a new average entry after adding to the position.
    ///
    /// The target follows the average. The stop moves only when the level
    /// recomputed from the average is tighter, so a ratcheted trailing stop
    /// survives a scale-in.
    pub fn rebase(&mut self, entry_price: f64) {
        let dir = self.side.sign();
        self.entry_price = entry_price;
        self.target = self
            .config
            .take_profit
            .filter(|u| !u.is_zero())
            .map(|u| entry_price + dir * u.distance(entry_price));

        if let Some(candidate) = self
            .config
            .stop_loss
            .filter(|u| !u.is_zero())
            .map(|u| entry_price - dir * u.distance(entry_price))
        {
            self.stop = Some(match (self.side, self.stop) {
                (Side::Buy, Some(stop)) => stop.max(candidate),
                (Side::Sell, Some(stop)) => stop.min(candidate),
                (_, None) => candidate,
            });
        }

        self.best_price = match self.side {
            Side::Buy => self.best_price.max(entry_price),
            Side::Sell => self.best_price.min(entry_price),
        };

        tracing::debug!(
            side = ?self.side,
            entry = entry_price,
            stop = ?self.stop,
            target = ?self.target,
            "Protection rebased"
        );
    }

    /// Check the candle against protective levels.
    ///
    /// The stop is evaluated before the target: when one candle spans both
    /// levels the loss is assumed. Trailing stops are ratcheted after the
    /// check so a candle cannot both raise the stop and hit it.
    pub fn check(&mut self, candle: &Candle) -> Option<ProtectionExit> {
        let trailed = self.config.trailing && self.best_price != self.entry_price;

        let exit = match self.side {
            Side::Buy => {
                if let Some(stop) = self.stop.filter(|&s| candle.low <= s) {
                    // Gap through the stop fills at the open
                    Some((stop.min(candle.open), trailed))
                } else if let Some(target) = self.target.filter(|&t| candle.high >= t) {
                    return Some(ProtectionExit {
                        reason: ExitReason::TakeProfit,
                        price: target.max(candle.open),
                    });
                } else {
                    None
                }
            }
            Side::Sell => {
                if let Some(stop) = self.stop.filter(|&s| candle.high >= s) {
                    Some((stop.max(candle.open), trailed))
                } else if let Some(target) = self.target.filter(|&t| candle.low <= t) {
                    return Some(ProtectionExit {
                        reason: ExitReason::TakeProfit,
                        price: target.min(candle.open),
                    });
                } else {
                    None
                }
            }
        };

        if let Some((price, trailed)) = exit {
            let reason = if trailed {
                ExitReason::TrailingStop
            } else {
                ExitReason::StopLoss
            };
            return Some(ProtectionExit { reason, price });
        }

        if self.config.trailing {
            self.ratchet(candle);
        }
        None
    }

    fn ratchet(&mut self, candle: &Candle) {
        let Some(distance) = self.config.stop_loss.filter(|u| !u.is_zero()) else {
            return;
        };

        match self.side {
            Side::Buy if candle.high > self.best_price => {
                self.best_price = candle.high;
                let candidate = self.best_price - distance.distance(self.entry_price);
                if self.stop.map_or(true, |s| candidate > s) {
                    self.stop = Some(candidate);
                }
            }
            Side::Sell if candle.low < self.best_price => {
                self.best_price = candle.low;
                let candidate = self.best_price + distance.distance(self.entry_price);
                if self.stop.map_or(true, |s| candidate < s) {
                    self.stop = Some(candidate);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{TimeZone, Utc};

    fn bar(open: f64, high: f64, low: f64, close: f64) -> Candle {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Candle::new_unchecked(ts, open, high, low, close, 1.0)
    }

    #[test]
    fn test_unit_parsing() {
        assert_eq!("1.5%".parse::<Unit>().unwrap(), Unit::Percent(1.5));
        assert_eq!(" 50 ".parse::<Unit>().unwrap(), Unit::Absolute(50.0));
        assert!("abc".parse::<Unit>().is_err());
        assert!("-2%".parse::<Unit>().is_err());
    }

    #[test]
    fn test_unit_deserializes_from_number_or_string() {
        let cfg: ProtectionConfig =
            serde_json::from_str(r#"{"take_profit": "2%", "stop_loss": 5}"#).unwrap();
        assert_eq!(cfg.take_profit, Some(Unit::Percent(2.0)));
        assert_eq!(cfg.stop_loss, Some(Unit::Absolute(5.0)));
        assert!(cfg.use_market_orders);
        assert!(!cfg.trailing);
    }

    #[test]
    fn test_long_levels_and_triggers() {
        let mut tracker = ProtectionTracker::arm(ProtectionConfig::percent(2.0, 1.0), Side::Buy, 100.0);
        assert_relative_eq!(tracker.stop_price().unwrap(), 99.0);
        assert_relative_eq!(tracker.target_price().unwrap(), 102.0);

        assert!(tracker.check(&bar(100.0, 101.0, 99.5, 100.5)).is_none());
        let exit = tracker.check(&bar(100.5, 102.5, 100.0, 102.0)).unwrap();
        assert_eq!(exit.reason, ExitReason::TakeProfit);
        assert_relative_eq!(exit.price, 102.0);
    }

    #[test]
    fn test_stop_wins_when_candle_spans_both_levels() {
        let mut tracker = ProtectionTracker::arm(ProtectionConfig::percent(2.0, 1.0), Side::Buy, 100.0);
        let exit = tracker.check(&bar(100.0, 103.0, 98.0, 101.0)).unwrap();
        assert_eq!(exit.reason, ExitReason::StopLoss);
        assert_relative_eq!(exit.price, 99.0);
    }

    #[test]
    fn test_short_protection_is_mirrored() {
        let mut tracker =
            ProtectionTracker::arm(ProtectionConfig::percent(2.0, 1.0), Side::Sell, 100.0);
        assert_relative_eq!(tracker.stop_price().unwrap(), 101.0);
        assert_relative_eq!(tracker.target_price().unwrap(), 98.0);
        let exit = tracker.check(&bar(99.0, 99.5, 97.5, 98.0)).unwrap();
        assert_eq!(exit.reason, ExitReason::TakeProfit);
    }

    #[test]
    fn test_gap_through_stop_fills_at_open() {
        let mut tracker = ProtectionTracker::arm(ProtectionConfig::percent(0.0, 1.0), Side::Buy, 100.0);
        let exit = tracker.check(&bar(95.0, 96.0, 94.0, 95.5)).unwrap();
        assert_relative_eq!(exit.price, 95.0);
    }

    #[test]
    fn test_trailing_stop_only_tightens() {
        let cfg = ProtectionConfig::percent(0.0, 2.0).with_trailing(true);
        let mut tracker = ProtectionTracker::arm(cfg, Side::Buy, 100.0);
        assert!(tracker.check(&bar(100.0, 105.0, 100.0, 104.0)).is_none());
        assert_relative_eq!(tracker.stop_price().unwrap(), 103.0);
        // Pullback does not loosen the stop
        assert!(tracker.check(&bar(104.0, 104.5, 103.5, 104.0)).is_none());
        assert_relative_eq!(tracker.stop_price().unwrap(), 103.0);

        let exit = tracker.check(&bar(104.0, 104.0, 102.0, 102.5)).unwrap();
        assert_eq!(exit.reason, ExitReason::TrailingStop);
        assert_relative_eq!(exit.price, 103.0);
    }

    #[test]
    fn test_short_trailing_stop_follows_lows() {
        let cfg = ProtectionConfig::percent(0.0, 2.0).with_trailing(true);
        let mut tracker = ProtectionTracker::arm(cfg, Side::Sell, 100.0);
        assert_relative_eq!(tracker.stop_price().unwrap(), 102.0);

        assert!(tracker.check(&bar(100.0, 100.0, 95.0, 96.0)).is_none());
        assert_relative_eq!(tracker.stop_price().unwrap(), 97.0);
        // Bounce without a new low leaves the stop alone
        assert!(tracker.check(&bar(96.0, 96.5, 95.5, 96.0)).is_none());
        assert_relative_eq!(tracker.stop_price().unwrap(), 97.0);

        let exit = tracker.check(&bar(96.0, 98.0, 95.8, 97.5)).unwrap();
        assert_eq!(exit.reason, ExitReason::TrailingStop);
        assert_relative_eq!(exit.price, 97.0);
    }

    #[test]
    fn test_rebase_never_loosens_stop() {
        let cfg = ProtectionConfig::percent(20.0, 2.0).with_trailing(true);
        let mut tracker = ProtectionTracker::arm(cfg, Side::Buy, 100.0);
        assert!(tracker.check(&bar(100.0, 110.0, 100.0, 110.0)).is_none());
        assert_relative_eq!(tracker.stop_price().unwrap(), 108.0);

        // Averaging up to 105 would put a fresh stop at 102.9
        tracker.rebase(105.0);
        assert_relative_eq!(tracker.entry_price(), 105.0);
        assert_relative_eq!(tracker.stop_price().unwrap(), 108.0);
        assert_relative_eq!(tracker.target_price().unwrap(), 126.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rebase_tightens_fixed_stop() {
        let mut tracker =
            ProtectionTracker::arm(ProtectionConfig::percent(0.0, 2.0), Side::Sell, 100.0);
        tracker.rebase(95.0);
        assert_relative_eq!(tracker.stop_price().unwrap(), 96.9, epsilon = 1e-9);
        // Averaging against the position keeps the tighter level
        tracker.rebase(99.0);
        assert_relative_eq!(tracker.stop_price().unwrap(), 96.9, epsilon = 1e-9);
    }

    #[test]
    fn test_empty_config() {
        assert!(ProtectionConfig::percent(0.0, 0.0).is_empty());
        assert!(!ProtectionConfig::percent(1.0, 0.0).is_empty());
    }
}
