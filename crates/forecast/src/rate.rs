//! PERT-style rate estimation.

use serde::{Deserialize, Serialize};

use burnwise_core::{DomainError, DomainResult, WorkUnit, ensure_non_negative};
use burnwise_throughput::WeeklySeries;

use crate::weighted::MAX_FORECAST_WEEKS;
use crate::weights::{default_weights, weighted_average};

/// Weeks needed to finish `remaining` at `rate` per week.
///
/// Nothing left → 0; no progress → `+∞`.
pub fn time_to_completion(remaining: f64, rate: f64) -> f64 {
    if remaining <= 0.0 {
        return 0.0;
    }
    if rate <= 0.0 {
        return f64::INFINITY;
    }
    remaining / rate
}

/// Three-point rate estimate for one unit. Rates are per week, times in weeks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateEstimate {
    pub unit: WorkUnit,
    pub remaining_work: f64,
    pub optimistic_rate: f64,
    pub most_likely_rate: f64,
    pub pessimistic_rate: f64,
    pub optimistic_weeks: f64,
    pub most_likely_weeks: f64,
    pub pessimistic_weeks: f64,
    /// Non-zero weeks that fed the most-likely rate.
    pub weeks_used: usize,
    /// Non-zero weeks eligible as optimistic/pessimistic extremes.
    pub extremes_window: usize,
}

impl RateEstimate {
    /// The primary reported completion time.
    pub fn pert_weeks(&self) -> f64 {
        self.most_likely_weeks
    }

    /// Classic PERT expectation `(O + 4M + P) / 6`; infinite if any bound is.
    pub fn pert_expected_weeks(&self) -> f64 {
        (self.optimistic_weeks + 4.0 * self.most_likely_weeks + self.pessimistic_weeks) / 6.0
    }

    /// `(optimistic, pessimistic)` completion times in weeks.
    pub fn confidence_interval(&self) -> (f64, f64) {
        (self.optimistic_weeks, self.pessimistic_weeks)
    }

    pub fn daily_rates(&self) -> [f64; 3] {
        [
            self.optimistic_rate / 7.0,
            self.most_likely_rate / 7.0,
            self.pessimistic_rate / 7.0,
        ]
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RateEstimator {
    pert_factor: usize,
}

impl RateEstimator {
    /// `pert_factor`: how many of the latest non-zero weeks may supply the
    /// optimistic and pessimistic extremes. Must be at least 1.
    pub fn new(pert_factor: usize) -> DomainResult<Self> {
        if pert_factor == 0 {
            return Err(DomainError::validation("pert_factor must be at least 1"));
        }
        Ok(Self { pert_factor })
    }

    pub fn pert_factor(&self) -> usize {
        self.pert_factor
    }

    /// Estimate from a weekly series. Idle weeks are dropped first, so a
    /// gap-filled series can be passed as is.
    pub fn estimate(
        &self,
        series: &WeeklySeries,
        unit: WorkUnit,
        remaining: f64,
    ) -> DomainResult<Option<RateEstimate>> {
        let values = series.non_zero().values(unit);
        self.estimate_values(&values, unit, remaining)
    }

    /// Estimate from weekly rates that already exclude idle weeks (oldest first).
    ///
    /// `Ok(None)` when there is no history at all.
    pub fn estimate_values(
        &self,
        weekly: &[f64],
        unit: WorkUnit,
        remaining: f64,
    ) -> DomainResult<Option<RateEstimate>> {
        ensure_non_negative(weekly, "weekly rates")?;
        if !remaining.is_finite() {
            return Err(DomainError::validation("remaining work must be finite"));
        }
        if weekly.is_empty() {
            return Ok(None);
        }

        let recent = &weekly[weekly.len().saturating_sub(MAX_FORECAST_WEEKS)..];
        let most_likely = weighted_average(recent, &default_weights(recent.len()));

        let extremes = &weekly[weekly.len().saturating_sub(self.pert_factor)..];
        let optimistic = extremes.iter().copied().fold(f64::MIN, f64::max);
        let pessimistic = extremes.iter().copied().fold(f64::MAX, f64::min).max(0.0);

        let estimate = RateEstimate {
            unit,
            remaining_work: remaining,
            optimistic_rate: optimistic,
            most_likely_rate: most_likely,
            pessimistic_rate: pessimistic,
            optimistic_weeks: time_to_completion(remaining, optimistic),
            most_likely_weeks: time_to_completion(remaining, most_likely),
            pessimistic_weeks: time_to_completion(remaining, pessimistic),
            weeks_used: recent.len(),
            extremes_window: extremes.len(),
        };

        tracing::debug!(
            unit = %unit,
            remaining,
            optimistic,
            most_likely,
            pessimistic,
            "estimated completion rates"
        );

        Ok(Some(estimate))
    }
}

impl Default for RateEstimator {
    fn default() -> Self {
        Self { pert_factor: 6 }
    }
}
