//! Data loading and management
//!
//! Loads OHLCV data from CSV files, filters by date and checks consistency.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, warn};

use crate::error::StrategyError;
use crate::{Candle, Config};

// =============================================================================
// Time frames
// =============================================================================

/// Candle interval, written as `15m`, `1h`, `4h`, `1d`, `1w`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeFrame {
    Minutes(u32),
    Hours(u32),
    Days(u32),
    Weeks(u32),
}

impl TimeFrame {
    pub fn duration(&self) -> Duration {
        match *self {
            TimeFrame::Minutes(n) => Duration::minutes(n as i64),
            TimeFrame::Hours(n) => Duration::hours(n as i64),
            TimeFrame::Days(n) => Duration::days(n as i64),
            TimeFrame::Weeks(n) => Duration::weeks(n as i64),
        }
    }

    /// Bars per year, used to annualize per-bar statistics
    pub fn periods_per_year(&self) -> f64 {
        let minutes = self.duration().num_minutes().max(1) as f64;
        365.0 * 24.0 * 60.0 / minutes
    }
}

impl FromStr for TimeFrame {
    type Err = StrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || StrategyError::InvalidTimeFrame(s.to_string());
        let Some((unit_start, _)) = s.char_indices().last() else {
            return Err(invalid());
        };
        let (count, unit) = s.split_at(unit_start);
        let n: u32 = count.parse().map_err(|_| invalid())?;
        if n == 0 {
            return Err(invalid());
        }
        match unit {
            "m" => Ok(TimeFrame::Minutes(n)),
            "h" => Ok(TimeFrame::Hours(n)),
            "d" => Ok(TimeFrame::Days(n)),
            "w" => Ok(TimeFrame::Weeks(n)),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeFrame::Minutes(n) => write!(f, "{}m", n),
            TimeFrame::Hours(n) => write!(f, "{}h", n),
            TimeFrame::Days(n) => write!(f, "{}d", n),
            TimeFrame::Weeks(n) => write!(f, "{}w", n),
        }
    }
}

// =============================================================================
// CSV Data Loading
// =============================================================================

/// `{dir}/{SYMBOL}_{timeframe}.csv`
pub fn data_file(data_dir: impl AsRef<Path>, symbol: &str, timeframe: &str) -> PathBuf {
    data_dir
        .as_ref()
        .join(format!("{}_{}.csv", symbol.to_uppercase(), timeframe))
}

/// Parse a CSV timestamp: RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DD` or unix millis
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(DateTime::<Utc>::from_naive_utc_and_offset(ndt, Utc));
    }
    if let Ok(nd) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return nd
            .and_hms_opt(0, 0, 0)
            .map(|ndt| DateTime::<Utc>::from_naive_utc_and_offset(ndt, Utc));
    }
    if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
        return value.parse::<i64>().ok().and_then(DateTime::from_timestamp_millis);
    }
    None
}

fn parse_row(record: &csv::StringRecord) -> Result<Candle> {
    let dt_str = record.get(0).context("Missing datetime column")?;
    let datetime =
        parse_timestamp(dt_str).with_context(|| format!("Failed to parse datetime: {}", dt_str))?;

    let mut fields = [0.0f64; 5];
    for (i, (field, name)) in fields
        .iter_mut()
        .zip(["open", "high", "low", "close", "volume"])
        .enumerate()
    {
        *field = record
            .get(i + 1)
            .with_context(|| format!("Missing {} column", name))?
            .trim()
            .parse()
            .with_context(|| format!("Failed to parse {}", name))?;
    }
    let [open, high, low, close, volume] = fields;

    Ok(Candle::new(datetime, open, high, low, close, volume)?)
}

/// Load OHLCV data from CSV file
///
/// Expects the header `datetime,open,high,low,close,volume`. Rows that fail
/// to parse or validate are skipped with a warning. The result is sorted by
/// time with duplicate timestamps removed.
pub fn load_csv(path: impl AsRef<Path>) -> Result<Vec<Candle>> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open CSV file {}", path.display()))?;

    let mut candles = Vec::new();
    let mut skipped = 0usize;

    for (row_idx, result) in reader.records().enumerate() {
        let parsed = result
            .map_err(anyhow::Error::from)
            .and_then(|record| parse_row(&record));
        match parsed {
            Ok(candle) => candles.push(candle),
            Err(e) => {
                skipped += 1;
                warn!(
                    "Skipping invalid candle at row {} in {:?}: {:#}",
                    row_idx + 2, // +2 for 1-indexed and header row
                    path.file_name().unwrap_or_default(),
                    e
                );
            }
        }
    }

    if skipped > 0 {
        warn!(
            "Skipped {} invalid candles out of {} in {:?}",
            skipped,
            skipped + candles.len(),
            path.file_name().unwrap_or_default()
        );
    }

    candles.sort_by_key(|c| c.datetime);
    candles.dedup_by_key(|c| c.datetime);
    debug!(rows = candles.len(), file = %path.display(), "Loaded candles");

    Ok(candles)
}

/// Filter candles by date range
pub fn filter_candles_by_date(
    candles: Vec<Candle>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Vec<Candle> {
    candles
        .into_iter()
        .filter(|c| {
            let after_start = start.map_or(true, |s| c.datetime >= s);
            let before_end = end.map_or(true, |e| c.datetime <= e);
            after_start && before_end
        })
        .collect()
}

/// Parse a date string (YYYY-MM-DD or YYYY-MM-DD HH:MM:SS) to DateTime<Utc>
pub fn parse_date(date_str: &str) -> Result<DateTime<Utc>> {
    parse_timestamp(date_str).with_context(|| {
        format!(
            "Failed to parse date: {}. Use YYYY-MM-DD or YYYY-MM-DD HH:MM:SS format",
            date_str
        )
    })
}

/// Inclusive end bound: a bare date covers the whole day
pub fn parse_end_date(date_str: &str) -> Result<DateTime<Utc>> {
    let dt = parse_date(date_str)?;
    if NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").is_ok() {
        Ok(dt + Duration::days(1) - Duration::seconds(1))
    } else {
        Ok(dt)
    }
}

/// Load the configured instrument, restricted to the backtest date window
pub fn load_for_config(config: &Config) -> Result<Vec<Candle>> {
    let path = data_file(
        &config.backtest.data_dir,
        &config.trading.symbol,
        &config.trading.timeframe,
    );
    let candles = load_csv(&path)?;

    let start = config.backtest.start.as_deref().map(parse_date).transpose()?;
    let end = config.backtest.end.as_deref().map(parse_end_date).transpose()?;
    let total = candles.len();
    let candles = filter_candles_by_date(candles, start, end);
    if candles.len() != total {
        debug!(kept = candles.len(), total, "Applied date filter");
    }
    Ok(candles)
}

// =============================================================================
// Data Validation
// =============================================================================

/// Validate candle data for consistency
pub fn validate_candles(candles: &[Candle]) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if candles.is_empty() {
        errors.push("No candles provided".to_string());
        return ValidationResult { errors, warnings };
    }

    for (i, candle) in candles.iter().enumerate() {
        if let Err(e) = candle.validate() {
            errors.push(format!("Candle {}: {}", i, e));
        }
        if i > 0 && candle.datetime <= candles[i - 1].datetime {
            warnings.push(format!("Candle {}: not chronological", i));
        }
    }

    ValidationResult { errors, warnings }
}

/// Result of data validation
#[derive(Debug)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
