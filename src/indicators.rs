//! Streaming technical indicators powered by the `ta` crate
//!
//! Strategies feed one finished candle at a time, so every indicator here is
//! incremental. `ta` supplies the math; [`Formed`] adds the warm-up tracking
//! strategies need before they may act on a value.
//!
//! Available indicators:
//! - Moving Averages: SMA, EMA
//! - Momentum: RSI, MACD, Stochastic, CCI, Rate of Change, Williams %R
//! - Volatility: ATR, Bollinger Bands, Keltner Channels
//! - Trend: Directional Index (+DI, -DI, ADX), Polynomial Regression
//! - Price transforms: Highest, Lowest, Heikin-Ashi
//!
//! Williams %R, the Directional Index, Heikin-Ashi and the polynomial
//! regression fit are not part of `ta` and are implemented locally on top of
//! its `Next`/`Reset` traits.

use std::collections::VecDeque;

use ta::indicators::{
    AverageTrueRange, BollingerBands, BollingerBandsOutput, CommodityChannelIndex,
    ExponentialMovingAverage, FastStochastic, KeltnerChannel, KeltnerChannelOutput, Maximum,
    Minimum, MovingAverageConvergenceDivergence, MovingAverageConvergenceDivergenceOutput,
    RateOfChange, RelativeStrengthIndex, SimpleMovingAverage,
};
use ta::{Close, High, Low, Next, Open, Reset};

use crate::error::StrategyError;

// =============================================================================
// Formed wrapper
// =============================================================================

/// Wraps an indicator and tracks whether it has seen enough samples.
#[derive(Debug, Clone)]
pub struct Formed<I, O> {
    inner: I,
    warmup: usize,
    samples: usize,
    last: Option<O>,
}

impl<I, O: Clone> Formed<I, O> {
    pub fn new(inner: I, warmup: usize) -> Self {
        Self {
            inner,
            warmup: warmup.max(1),
            samples: 0,
            last: None,
        }
    }

    /// Feed one sample and return the raw output (valid or not)
    pub fn process<T>(&mut self, input: T) -> O
    where
        I: Next<T, Output = O>,
    {
        let out = self.inner.next(input);
        self.samples = self.samples.saturating_add(1);
        self.last = Some(out.clone());
        out
    }

    /// True once the warm-up length has been reached
    pub fn is_formed(&self) -> bool {
        self.samples >= self.warmup
    }

    /// Last output, only once formed
    pub fn value(&self) -> Option<O> {
        if self.is_formed() {
            self.last.clone()
        } else {
            None
        }
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    pub fn warmup(&self) -> usize {
        self.warmup
    }
}

impl<I: Reset, O> Formed<I, O> {
    pub fn reset(&mut self) {
        self.inner.reset();
        self.samples = 0;
        self.last = None;
    }
}

pub type Sma = Formed<SimpleMovingAverage, f64>;
pub type Ema = Formed<ExponentialMovingAverage, f64>;
pub type Rsi = Formed<RelativeStrengthIndex, f64>;
pub type Atr = Formed<AverageTrueRange, f64>;
pub type Bollinger = Formed<BollingerBands, BollingerBandsOutput>;
pub type Macd = Formed<MovingAverageConvergenceDivergence, MovingAverageConvergenceDivergenceOutput>;
pub type Cci = Formed<CommodityChannelIndex, f64>;
pub type Keltner = Formed<KeltnerChannel, KeltnerChannelOutput>;
pub type Roc = Formed<RateOfChange, f64>;
pub type Highest = Formed<Maximum, f64>;
pub type Lowest = Formed<Minimum, f64>;

fn bad_period(indicator: &str, period: usize) -> StrategyError {
    StrategyError::invalid(
        "period",
        format!("{} cannot be built with period {}", indicator, period),
    )
}

// =============================================================================
// Constructors
// =============================================================================

pub fn sma(period: usize) -> Result<Sma, StrategyError> {
    let inner = SimpleMovingAverage::new(period).map_err(|_| bad_period("SMA", period))?;
    Ok(Formed::new(inner, period))
}

pub fn ema(period: usize) -> Result<Ema, StrategyError> {
    let inner = ExponentialMovingAverage::new(period).map_err(|_| bad_period("EMA", period))?;
    Ok(Formed::new(inner, period))
}

pub fn rsi(period: usize) -> Result<Rsi, StrategyError> {
    let inner = RelativeStrengthIndex::new(period).map_err(|_| bad_period("RSI", period))?;
    Ok(Formed::new(inner, period))
}

/// Average True Range (fed with candles)
pub fn atr(period: usize) -> Result<Atr, StrategyError> {
    let inner = AverageTrueRange::new(period).map_err(|_| bad_period("ATR", period))?;
    Ok(Formed::new(inner, period))
}

pub fn bollinger(period: usize, width: f64) -> Result<Bollinger, StrategyError> {
    let inner = BollingerBands::new(period, width).map_err(|_| bad_period("Bollinger", period))?;
    Ok(Formed::new(inner, period))
}

/// MACD is usable once the slow EMA and the signal EMA have both warmed up
pub fn macd(fast: usize, slow: usize, signal: usize) -> Result<Macd, StrategyError> {
    let inner = MovingAverageConvergenceDivergence::new(fast, slow, signal)
        .map_err(|_| bad_period("MACD", slow))?;
    Ok(Formed::new(inner, slow + signal - 1))
}

/// Commodity Channel Index (fed with candles)
pub fn cci(period: usize) -> Result<Cci, StrategyError> {
    let inner = CommodityChannelIndex::new(period).map_err(|_| bad_period("CCI", period))?;
    Ok(Formed::new(inner, period))
}

/// Keltner Channel (fed with candles)
pub fn keltner(period: usize, multiplier: f64) -> Result<Keltner, StrategyError> {
    let inner = KeltnerChannel::new(period, multiplier).map_err(|_| bad_period("Keltner", period))?;
    Ok(Formed::new(inner, period))
}

/// Rate of change needs `period` prior values
pub fn rate_of_change(period: usize) -> Result<Roc, StrategyError> {
    let inner = RateOfChange::new(period).map_err(|_| bad_period("ROC", period))?;
    Ok(Formed::new(inner, period + 1))
}

/// Rolling maximum; fed with candles it tracks highs
pub fn highest(period: usize) -> Result<Highest, StrategyError> {
    let inner = Maximum::new(period).map_err(|_| bad_period("Highest", period))?;
    Ok(Formed::new(inner, period))
}

/// Rolling minimum; fed with candles it tracks lows
pub fn lowest(period: usize) -> Result<Lowest, StrategyError> {
    let inner = Minimum::new(period).map_err(|_| bad_period("Lowest", period))?;
    Ok(Formed::new(inner, period))
}

pub fn stochastic(
    k_period: usize,
    k_smoothing: usize,
    d_period: usize,
) -> Result<Formed<Stochastic, StochasticOutput>, StrategyError> {
    let inner = Stochastic::new(k_period, k_smoothing, d_period)?;
    Ok(Formed::new(inner, k_period + k_smoothing + d_period - 2))
}

pub fn williams_r(period: usize) -> Result<Formed<WilliamsR, f64>, StrategyError> {
    Ok(Formed::new(WilliamsR::new(period)?, period))
}

pub fn directional_index(
    period: usize,
) -> Result<Formed<DirectionalIndex, DirectionalOutput>, StrategyError> {
    Ok(Formed::new(DirectionalIndex::new(period)?, 2 * period))
}

pub fn heikin_ashi() -> Formed<HeikinAshi, HeikinAshiCandle> {
    Formed::new(HeikinAshi::new(), 1)
}

pub fn polynomial_regression(
    period: usize,
    degree: usize,
) -> Result<Formed<PolynomialRegression, RegressionOutput>, StrategyError> {
    Ok(Formed::new(PolynomialRegression::new(period, degree)?, period))
}

// =============================================================================
// Stochastic Oscillator (%K smoothed, %D = SMA of %K)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StochasticOutput {
    pub k: f64,
    pub d: f64,
}

#[derive(Debug, Clone)]
pub struct Stochastic {
    fast: FastStochastic,
    k_smooth: SimpleMovingAverage,
    d: SimpleMovingAverage,
}

impl Stochastic {
    pub fn new(k_period: usize, k_smoothing: usize, d_period: usize) -> Result<Self, StrategyError> {
        Ok(Self {
            fast: FastStochastic::new(k_period).map_err(|_| bad_period("Stochastic", k_period))?,
            k_smooth: SimpleMovingAverage::new(k_smoothing)
                .map_err(|_| bad_period("Stochastic %K smoothing", k_smoothing))?,
            d: SimpleMovingAverage::new(d_period)
                .map_err(|_| bad_period("Stochastic %D", d_period))?,
        })
    }
}

impl<T: High + Low + Close> Next<&T> for Stochastic {
    type Output = StochasticOutput;

    fn next(&mut self, input: &T) -> Self::Output {
        let raw = self.fast.next(input);
        let k = self.k_smooth.next(raw);
        let d = self.d.next(k);
        StochasticOutput { k, d }
    }
}

impl Reset for Stochastic {
    fn reset(&mut self) {
        self.fast.reset();
        self.k_smooth.reset();
        self.d.reset();
    }
}

// =============================================================================
// Williams %R
// =============================================================================

/// Williams %R on a -100..0 scale; -50 when the window has no range
#[derive(Debug, Clone)]
pub struct WilliamsR {
    highest: Maximum,
    lowest: Minimum,
}

impl WilliamsR {
    pub fn new(period: usize) -> Result<Self, StrategyError> {
        Ok(Self {
            highest: Maximum::new(period).map_err(|_| bad_period("Williams %R", period))?,
            lowest: Minimum::new(period).map_err(|_| bad_period("Williams %R", period))?,
        })
    }
}

impl<T: High + Low + Close> Next<&T> for WilliamsR {
    type Output = f64;

    fn next(&mut self, input: &T) -> f64 {
        let hh = self.highest.next(input.high());
        let ll = self.lowest.next(input.low());
        let range = hh - ll;
        if range > 0.0 {
            (hh - input.close()) / range * -100.0
        } else {
            -50.0
        }
    }
}

impl Reset for WilliamsR {
    fn reset(&mut self) {
        self.highest.reset();
        self.lowest.reset();
    }
}

// =============================================================================
// Directional Index (+DI, -DI, ADX) with Wilder's smoothing
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DirectionalOutput {
    pub plus_di: f64,
    pub minus_di: f64,
    pub adx: f64,
}

#[derive(Debug, Clone)]
pub struct DirectionalIndex {
    period: usize,
    prev: Option<(f64, f64, f64)>,
    movements: usize,
    smooth_tr: f64,
    smooth_plus_dm: f64,
    smooth_minus_dm: f64,
    dx_count: usize,
    dx_sum: f64,
    adx: Option<f64>,
    last: DirectionalOutput,
}

impl DirectionalIndex {
    pub fn new(period: usize) -> Result<Self, StrategyError> {
        if period == 0 {
            return Err(bad_period("ADX", period));
        }
        Ok(Self {
            period,
            prev: None,
            movements: 0,
            smooth_tr: 0.0,
            smooth_plus_dm: 0.0,
            smooth_minus_dm: 0.0,
            dx_count: 0,
            dx_sum: 0.0,
            adx: None,
            last: DirectionalOutput::default(),
        })
    }

    fn wilder(&self, prev: f64, value: f64) -> f64 {
        let p = self.period as f64;
        (prev * (p - 1.0) + value) / p
    }
}

impl<T: High + Low + Close> Next<&T> for DirectionalIndex {
    type Output = DirectionalOutput;

    fn next(&mut self, input: &T) -> DirectionalOutput {
        let (high, low, close) = (input.high(), input.low(), input.close());
        let Some((prev_high, prev_low, prev_close)) = self.prev.replace((high, low, close)) else {
            return self.last;
        };

        let tr = (high - low)
            .max((high - prev_close).abs())
            .max((low - prev_close).abs());
        let up = high - prev_high;
        let down = prev_low - low;
        let plus_dm = if up > down && up > 0.0 { up } else { 0.0 };
        let minus_dm = if down > up && down > 0.0 { down } else { 0.0 };

        self.movements += 1;
        let p = self.period as f64;
        if self.movements < self.period {
            self.smooth_tr += tr;
            self.smooth_plus_dm += plus_dm;
            self.smooth_minus_dm += minus_dm;
            return self.last;
        } else if self.movements == self.period {
            self.smooth_tr = (self.smooth_tr + tr) / p;
            self.smooth_plus_dm = (self.smooth_plus_dm + plus_dm) / p;
            self.smooth_minus_dm = (self.smooth_minus_dm + minus_dm) / p;
        } else {
            self.smooth_tr = self.wilder(self.smooth_tr, tr);
            self.smooth_plus_dm = self.wilder(self.smooth_plus_dm, plus_dm);
            self.smooth_minus_dm = self.wilder(self.smooth_minus_dm, minus_dm);
        }

        let (plus_di, minus_di) = if self.smooth_tr > 0.0 {
            (
                self.smooth_plus_dm / self.smooth_tr * 100.0,
                self.smooth_minus_dm / self.smooth_tr * 100.0,
            )
        } else {
            (0.0, 0.0)
        };
        let di_sum = plus_di + minus_di;
        let dx = if di_sum > 0.0 {
            (plus_di - minus_di).abs() / di_sum * 100.0
        } else {
            0.0
        };

        self.adx = match self.adx {
            Some(prev) => Some(self.wilder(prev, dx)),
            None => {
                self.dx_count += 1;
                self.dx_sum += dx;
                (self.dx_count == self.period).then(|| self.dx_sum / p)
            }
        };

        self.last = DirectionalOutput {
            plus_di,
            minus_di,
            adx: self.adx.unwrap_or(0.0),
        };
        self.last
    }
}

impl Reset for DirectionalIndex {
    fn reset(&mut self) {
        self.prev = None;
        self.movements = 0;
        self.smooth_tr = 0.0;
        self.smooth_plus_dm = 0.0;
        self.smooth_minus_dm = 0.0;
        self.dx_count = 0;
        self.dx_sum = 0.0;
        self.adx = None;
        self.last = DirectionalOutput::default();
    }
}

// =============================================================================
// Heikin-Ashi
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeikinAshiCandle {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl HeikinAshiCandle {
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// Distance from the body bottom to the low
    pub fn lower_wick(&self) -> f64 {
        self.open.min(self.close) - self.low
    }

    /// Distance from the body top to the high
    pub fn upper_wick(&self) -> f64 {
        self.high - self.open.max(self.close)
    }
}

#[derive(Debug, Clone, Default)]
pub struct HeikinAshi {
    prev: Option<HeikinAshiCandle>,
}

impl HeikinAshi {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: Open + High + Low + Close> Next<&T> for HeikinAshi {
    type Output = HeikinAshiCandle;

    fn next(&mut self, input: &T) -> HeikinAshiCandle {
        let close = (input.open() + input.high() + input.low() + input.close()) / 4.0;
        let open = match self.prev {
            Some(prev) => (prev.open + prev.close) / 2.0,
            None => (input.open() + input.close()) / 2.0,
        };
        let ha = HeikinAshiCandle {
            open,
            high: input.high().max(open).max(close),
            low: input.low().min(open).min(close),
            close,
        };
        self.prev = Some(ha);
        ha
    }
}

impl Reset for HeikinAshi {
    fn reset(&mut self) {
        self.prev = None;
    }
}

// =============================================================================
// Polynomial Regression
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RegressionOutput {
    /// Fitted value at the most recent bar
    pub value: f64,
    /// First derivative of the fit at the most recent bar, per bar
    pub slope: f64,
    /// Root mean square of the residuals over the window
    pub residual_std: f64,
}

/// Least-squares polynomial fit over a rolling window.
///
/// Abscissas are mapped onto [-1, 1] to keep the normal equations well
/// conditioned for higher degrees.
#[derive(Debug, Clone)]
pub struct PolynomialRegression {
    period: usize,
    degree: usize,
    window: VecDeque<f64>,
}

impl PolynomialRegression {
    pub fn new(period: usize, degree: usize) -> Result<Self, StrategyError> {
        if degree == 0 || degree > 6 {
            return Err(StrategyError::invalid(
                "degree",
                format!("polynomial degree must be within 1..=6, got {}", degree),
            ));
        }
        if period <= degree {
            return Err(StrategyError::invalid(
                "period",
                format!("regression window ({}) must exceed degree ({})", period, degree),
            ));
        }
        Ok(Self {
            period,
            degree,
            window: VecDeque::with_capacity(period),
        })
    }

    fn abscissa(&self, i: usize) -> f64 {
        let half = (self.period - 1) as f64 / 2.0;
        (i as f64 - half) / half
    }

    /// Coefficients c0..=c_degree, None if the system is singular
    fn fit(&self) -> Option<Vec<f64>> {
        let m = self.degree + 1;
        let mut power_sums = vec![0.0; 2 * self.degree + 1];
        let mut rhs = vec![0.0; m];

        for (i, &y) in self.window.iter().enumerate() {
            let x = self.abscissa(i);
            let mut xp = 1.0;
            for (k, sum) in power_sums.iter_mut().enumerate() {
                *sum += xp;
                if k < m {
                    rhs[k] += xp * y;
                }
                xp *= x;
            }
        }

        let matrix: Vec<Vec<f64>> = (0..m)
            .map(|row| (0..m).map(|col| power_sums[row + col]).collect())
            .collect();
        solve_linear_system(matrix, rhs)
    }
}

impl Next<f64> for PolynomialRegression {
    type Output = RegressionOutput;

    fn next(&mut self, input: f64) -> RegressionOutput {
        if self.window.len() == self.period {
            self.window.pop_front();
        }
        self.window.push_back(input);

        if self.window.len() < self.period {
            return RegressionOutput {
                value: input,
                slope: 0.0,
                residual_std: 0.0,
            };
        }

        let Some(coeffs) = self.fit() else {
            let mean = self.window.iter().sum::<f64>() / self.period as f64;
            return RegressionOutput {
                value: mean,
                slope: 0.0,
                residual_std: 0.0,
            };
        };

        let eval = |x: f64| coeffs.iter().rev().fold(0.0, |acc, c| acc * x + c);

        let residual_sq: f64 = self
            .window
            .iter()
            .enumerate()
            .map(|(i, &y)| (y - eval(self.abscissa(i))).powi(2))
            .sum();

        // d/dx at x = 1, rescaled from [-1, 1] units to bars
        let derivative: f64 = coeffs
            .iter()
            .enumerate()
            .skip(1)
            .map(|(j, c)| j as f64 * c)
            .sum();
        let half = (self.period - 1) as f64 / 2.0;

        RegressionOutput {
            value: eval(1.0),
            slope: derivative / half,
            residual_std: (residual_sq / self.period as f64).sqrt(),
        }
    }
}

impl<T: Close> Next<&T> for PolynomialRegression {
    type Output = RegressionOutput;

    fn next(&mut self, input: &T) -> RegressionOutput {
        self.next(input.close())
    }
}

impl Reset for PolynomialRegression {
    fn reset(&mut self) {
        self.window.clear();
    }
}

/// Gaussian elimination with partial pivoting
fn solve_linear_system(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| {
            a[i][col]
                .abs()
                .partial_cmp(&a[j][col].abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })?;
        if a[pivot][col].abs() < 1e-12 {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Some(x)
}

// =============================================================================
// Crossover helpers
// =============================================================================

/// `a` moved from at-or-below `b` to strictly above it
pub fn crossed_above(prev_a: f64, prev_b: f64, a: f64, b: f64) -> bool {
    prev_a <= prev_b && a > b
}

/// `a` moved from at-or-above `b` to strictly below it
pub fn crossed_below(prev_a: f64, prev_b: f64, a: f64, b: f64) -> bool {
    prev_a >= prev_b && a < b
}

// =============================================================================
// Tests
// =============================================================================
