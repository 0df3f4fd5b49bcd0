//! Library error types

use thiserror::Error;

/// Errors raised while building or configuring strategies
#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("unknown strategy '{name}'. Available: {available}")]
    UnknownStrategy { name: String, available: String },

    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("invalid protection unit '{0}'. Expected a number or a percentage like \"1.5%\"")]
    InvalidUnit(String),

    #[error("invalid time frame '{0}'")]
    InvalidTimeFrame(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl StrategyError {
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        StrategyError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Reject zero periods
pub fn ensure_period(name: &'static str, period: usize) -> Result<(), StrategyError> {
    if period == 0 {
        return Err(StrategyError::invalid(name, "period must be greater than zero"));
    }
    Ok(())
}

/// Reject non-positive or non-finite values
pub fn ensure_positive(name: &'static str, value: f64) -> Result<(), StrategyError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(StrategyError::invalid(
            name,
            format!("must be a positive number, got {}", value),
        ));
    }
    Ok(())
}

/// Require `fast < slow` for paired periods
pub fn ensure_ordered(
    fast_name: &'static str,
    fast: usize,
    slow_name: &'static str,
    slow: usize,
) -> Result<(), StrategyError> {
    if fast >= slow {
        return Err(StrategyError::invalid(
            fast_name,
            format!("{} ({}) must be less than {} ({})", fast_name, fast, slow_name, slow),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guards() {
        assert!(ensure_period("period", 0).is_err());
        assert!(ensure_period("period", 3).is_ok());
        assert!(ensure_positive("mult", f64::NAN).is_err());
        assert!(ensure_positive("mult", -1.0).is_err());
        assert!(ensure_ordered("fast", 10, "slow", 10).is_err());
        assert!(ensure_ordered("fast", 5, "slow", 10).is_ok());
    }

    #[test]
    fn test_error_message_names_parameter() {
        let err = StrategyError::invalid("rsi_period", "period must be greater than zero");
        assert_eq!(
            err.to_string(),
            "invalid parameter 'rsi_period': period must be greater than zero"
        );
    }
}
