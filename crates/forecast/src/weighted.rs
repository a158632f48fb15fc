//! Four-week weighted forecast.

use serde::{Deserialize, Serialize};

use burnwise_core::{DomainResult, ensure_non_negative};

use crate::weights::{default_weights, validate_weights, weighted_average};

/// How many of the most recent weeks feed a forecast.
pub const MAX_FORECAST_WEEKS: usize = 4;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Fewer than four weeks of history were available.
    Building,
    /// A full four-week window fed the estimate.
    Established,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub forecast_value: f64,
    /// Oldest first, aligned with the weeks used.
    pub weights_applied: Vec<f64>,
    pub weeks_available: usize,
    pub confidence: Confidence,
}

/// Weighted forecast over the last (up to) four values of `values`.
///
/// Returns `Ok(None)` when fewer than `min_weeks` values exist. Explicit
/// `weights` must line up with the weeks actually used and sum to 1.
pub fn forecast(
    values: &[f64],
    weights: Option<&[f64]>,
    min_weeks: usize,
) -> DomainResult<Option<ForecastResult>> {
    ensure_non_negative(values, "values")?;

    if values.is_empty() || values.len() < min_weeks {
        return Ok(None);
    }

    let used = &values[values.len().saturating_sub(MAX_FORECAST_WEEKS)..];
    let weights = match weights {
        Some(w) => {
            validate_weights(w, used.len())?;
            w.to_vec()
        }
        None => default_weights(used.len()),
    };

    let confidence = if used.len() == MAX_FORECAST_WEEKS {
        Confidence::Established
    } else {
        Confidence::Building
    };

    Ok(Some(ForecastResult {
        forecast_value: weighted_average(used, &weights),
        weights_applied: weights,
        weeks_available: used.len(),
        confidence,
    }))
}
