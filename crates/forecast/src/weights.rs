//! Recency weights shared by the weighted forecast, PERT most-likely rate and
//! budget burn rate.

use burnwise_core::{DomainError, DomainResult};

/// Oldest first; the most recent week carries the most weight.
pub const RECENCY_WEIGHTS: [f64; 4] = [0.1, 0.2, 0.3, 0.4];

/// Allowed deviation of a weight vector's sum from 1.0.
pub const WEIGHT_TOLERANCE: f64 = 0.001;

/// Weights for `n` values: the full recency profile for exactly four values,
/// equal weights otherwise (1..=3 weeks of history).
pub fn default_weights(n: usize) -> Vec<f64> {
    if n == RECENCY_WEIGHTS.len() {
        return RECENCY_WEIGHTS.to_vec();
    }
    if n == 0 {
        return Vec::new();
    }
    vec![1.0 / n as f64; n]
}

/// The newest `window` recency weights, renormalised to sum to 1.
///
/// `window` is clamped to `1..=4`.
pub fn truncated_recency_weights(window: usize) -> Vec<f64> {
    let window = window.clamp(1, RECENCY_WEIGHTS.len());
    let tail = &RECENCY_WEIGHTS[RECENCY_WEIGHTS.len() - window..];
    let sum: f64 = tail.iter().sum();
    tail.iter().map(|w| w / sum).collect()
}

pub fn validate_weights(weights: &[f64], expected_len: usize) -> DomainResult<()> {
    if weights.len() != expected_len {
        return Err(DomainError::validation(format!(
            "weights length {} does not match {} values",
            weights.len(),
            expected_len
        )));
    }
    if let Some(w) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
        return Err(DomainError::validation(format!(
            "weights must be finite and non-negative (found {w})"
        )));
    }
    let sum: f64 = weights.iter().sum();
    if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
        return Err(DomainError::validation(format!(
            "weights must sum to 1.0 ± {WEIGHT_TOLERANCE} (sum = {sum:.6})"
        )));
    }
    Ok(())
}

/// Dot product of equally long slices.
pub fn weighted_average(values: &[f64], weights: &[f64]) -> f64 {
    values.iter().zip(weights).map(|(v, w)| v * w).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn default_weights_profiles() {
        assert_eq!(default_weights(4), vec![0.1, 0.2, 0.3, 0.4]);
        assert_eq!(default_weights(2), vec![0.5, 0.5]);
        assert_eq!(default_weights(1), vec![1.0]);
        assert!(default_weights(0).is_empty());
    }

    #[test]
    fn truncated_weights_keep_newest_and_renormalise() {
        let w = truncated_recency_weights(2);
        assert!((w[0] - 3.0 / 7.0).abs() < 1e-12);
        assert!((w[1] - 4.0 / 7.0).abs() < 1e-12);
        assert_eq!(truncated_recency_weights(1), vec![1.0]);
        assert_eq!(truncated_recency_weights(9).len(), 4);
    }

    #[test]
    fn length_mismatch_is_rejected() {
        assert!(validate_weights(&[0.5, 0.5], 3).is_err());
    }

    #[test]
    fn negative_weight_is_rejected() {
        assert!(validate_weights(&[1.5, -0.5], 2).is_err());
    }

    proptest! {
        #[test]
        fn weights_within_tolerance_pass(
            raw in prop::collection::vec(0.01f64..10.0, 1..8),
            jitter in -0.0009f64..0.0009,
        ) {
            let sum: f64 = raw.iter().sum();
            let mut weights: Vec<f64> = raw.iter().map(|w| w / sum).collect();
            weights[0] += jitter;
            prop_assume!(weights[0] >= 0.0);
            prop_assert!(validate_weights(&weights, weights.len()).is_ok());
        }

        #[test]
        fn weights_outside_tolerance_fail(
            raw in prop::collection::vec(0.01f64..10.0, 1..8),
            excess in 0.0011f64..0.5,
        ) {
            let sum: f64 = raw.iter().sum();
            let mut weights: Vec<f64> = raw.iter().map(|w| w / sum).collect();
            weights[0] += excess;
            prop_assert!(validate_weights(&weights, weights.len()).is_err());
        }
    }
}
