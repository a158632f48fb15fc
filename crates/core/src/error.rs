//! Domain error model.

use thiserror::Error;

/// Result type used across the analytics crates.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Only invalid input shapes and broken invariants are errors. "Not enough
/// history to forecast yet" is modelled as `Ok(None)` by the callers, and
/// degenerate rates resolve to `f64::INFINITY` rather than failing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (negative history, bad weights, out-of-range settings).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A domain invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// An ISO week label could not be parsed or does not exist.
    #[error("invalid week label: {0}")]
    InvalidWeek(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn invalid_week(msg: impl Into<String>) -> Self {
        Self::InvalidWeek(msg.into())
    }
}

/// Reject NaN/infinite and negative historical values.
///
/// `what` names the offending series in the error message.
pub fn ensure_non_negative(values: &[f64], what: &str) -> DomainResult<()> {
    for (idx, v) in values.iter().enumerate() {
        if !v.is_finite() {
            return Err(DomainError::validation(format!(
                "{what}[{idx}] is not a finite number"
            )));
        }
        if *v < 0.0 {
            return Err(DomainError::validation(format!(
                "{what}[{idx}] is negative ({v})"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_negative_series_passes() {
        assert!(ensure_non_negative(&[0.0, 1.5, 10.0], "values").is_ok());
        assert!(ensure_non_negative(&[], "values").is_ok());
    }

    #[test]
    fn negative_value_is_rejected_with_index() {
        let err = ensure_non_negative(&[1.0, -2.0], "completed").unwrap_err();
        match err {
            DomainError::Validation(msg) => assert!(msg.contains("completed[1]")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn nan_is_rejected() {
        assert!(ensure_non_negative(&[f64::NAN], "values").is_err());
        assert!(ensure_non_negative(&[f64::INFINITY], "values").is_err());
    }
}
