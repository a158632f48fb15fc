//! Exponentially weighted moving average forecasts.

use chrono::{Datelike, Weekday};
use serde::{Deserialize, Serialize};

use burnwise_core::{DomainError, DomainResult, ensure_non_negative};

pub const DEFAULT_ALPHA: f64 = 0.3;

/// Minimum number of weekly values needed before smoothing means anything.
const MIN_VALUES: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EwmaForecast {
    /// Last smoothed value; the forecast for the next week.
    pub forecast_value: f64,
    /// Smoothed value after each input week.
    pub smoothed: Vec<f64>,
    pub alpha: f64,
    pub weeks_used: usize,
}

/// EWMA over a weekly series, independent of the PERT estimate.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct EwmaForecaster {
    alpha: f64,
}

impl EwmaForecaster {
    /// `alpha` must lie in `(0, 1]`.
    pub fn new(alpha: f64) -> DomainResult<Self> {
        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(DomainError::validation(format!(
                "alpha must be within (0, 1] (got {alpha})"
            )));
        }
        Ok(Self { alpha })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Returns `Ok(None)` with fewer than two values.
    pub fn forecast(&self, values: &[f64]) -> DomainResult<Option<EwmaForecast>> {
        ensure_non_negative(values, "values")?;
        if values.len() < MIN_VALUES {
            return Ok(None);
        }

        let mut smoothed = Vec::with_capacity(values.len());
        let mut current = values[0];
        smoothed.push(current);
        for v in &values[1..] {
            current = self.alpha * v + (1.0 - self.alpha) * current;
            smoothed.push(current);
        }

        Ok(Some(EwmaForecast {
            forecast_value: current,
            smoothed,
            alpha: self.alpha,
            weeks_used: values.len(),
        }))
    }
}

impl Default for EwmaForecaster {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
        }
    }
}

/// Share of the in-progress week that has elapsed: 1/7 on Monday, 1 on Sunday.
pub fn current_week_weight(day: Weekday) -> f64 {
    f64::from(day.num_days_from_monday() + 1) / 7.0
}

/// Blend a partial actual with the forecast for the in-progress week.
///
/// Moves linearly from forecast-dominated on Monday to exactly `actual` on
/// Sunday.
pub fn blend_current_week(actual: f64, forecast: f64, today: impl Datelike) -> f64 {
    let w = current_week_weight(today.weekday());
    w * actual + (1.0 - w) * forecast
}
