//! Burndown / burnup projection curves.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use burnwise_core::{DomainError, DomainResult};

use crate::rate::RateEstimate;

/// Daily rates at or below this are treated as "no progress".
const MIN_DAILY_RATE: f64 = 0.001;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionMode {
    /// Remaining work trending to zero.
    Burndown,
    /// Completed work trending to total scope.
    Burnup,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    Average,
    Optimistic,
    Pessimistic,
    Ewma,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// A finished projection line. Dates strictly increase and the final point
/// sits exactly on the target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSeries {
    pub mode: ProjectionMode,
    pub scenario: Scenario,
    pub daily_rate: f64,
    /// Days until the line reaches its target (capped at the horizon).
    pub days_to_target: f64,
    pub target: f64,
    points: Vec<ProjectionPoint>,
}

impl ProjectionSeries {
    pub fn points(&self) -> &[ProjectionPoint] {
        &self.points
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProjectionPoint> + '_ {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&ProjectionPoint> {
        self.points.last()
    }

    pub fn completion_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }
}

impl<'a> IntoIterator for &'a ProjectionSeries {
    type Item = &'a ProjectionPoint;
    type IntoIter = core::slice::Iter<'a, ProjectionPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// Caps applied to every generated line.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionLimits {
    pub max_days: u32,
    /// Points per line, the closing point included.
    pub max_points_per_line: u32,
}

impl Default for ProjectionLimits {
    fn default() -> Self {
        Self {
            max_days: 730,
            max_points_per_line: 100,
        }
    }
}

impl ProjectionLimits {
    pub fn validate(&self) -> DomainResult<()> {
        if self.max_days == 0 {
            return Err(DomainError::validation("max_days must be at least 1"));
        }
        if self.max_points_per_line == 0 {
            return Err(DomainError::validation("max_points_per_line must be at least 1"));
        }
        Ok(())
    }
}

/// Input for a single projection line.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ProjectionRequest {
    pub mode: ProjectionMode,
    pub scenario: Scenario,
    pub start_date: NaiveDate,
    /// Remaining work (burndown) or completed work (burnup) at `start_date`.
    pub start_value: f64,
    /// Total scope; ignored for burndown, whose target is always zero.
    pub scope: f64,
    pub daily_rate: f64,
    /// Visible history span; sizes the horizon when there is no progress.
    pub span_days: u32,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct ProjectionGenerator {
    limits: ProjectionLimits,
}

impl ProjectionGenerator {
    pub fn new(limits: ProjectionLimits) -> DomainResult<Self> {
        limits.validate()?;
        Ok(Self { limits })
    }

    pub fn limits(&self) -> ProjectionLimits {
        self.limits
    }

    /// Days until `remaining` is done at `daily_rate`, capped at `max_days`.
    ///
    /// Without meaningful progress the line still terminates, at twice the
    /// visible span (also capped).
    pub fn days_to_target(&self, remaining: f64, daily_rate: f64, span_days: u32) -> f64 {
        let max_days = f64::from(self.limits.max_days);
        if remaining <= 0.0 {
            return 0.0;
        }
        if daily_rate > MIN_DAILY_RATE {
            (remaining / daily_rate).min(max_days)
        } else {
            (2.0 * f64::from(span_days)).min(max_days)
        }
    }

    pub fn generate(&self, request: &ProjectionRequest) -> DomainResult<ProjectionSeries> {
        let ProjectionRequest {
            mode,
            scenario,
            start_date,
            start_value,
            scope,
            daily_rate,
            span_days,
        } = *request;

        if !start_value.is_finite() || start_value < 0.0 {
            return Err(DomainError::validation(format!(
                "projection start value must be non-negative (got {start_value})"
            )));
        }
        if !daily_rate.is_finite() || daily_rate < 0.0 {
            return Err(DomainError::validation(format!(
                "daily rate must be non-negative (got {daily_rate})"
            )));
        }

        let (target, remaining) = match mode {
            ProjectionMode::Burndown => (0.0, start_value),
            ProjectionMode::Burnup => {
                if !scope.is_finite() || scope < 0.0 {
                    return Err(DomainError::validation(format!(
                        "burnup scope must be non-negative (got {scope})"
                    )));
                }
                (scope, scope - start_value)
            }
        };

        let days = self.days_to_target(remaining, daily_rate, span_days);
        let value_at = |t: f64| match mode {
            ProjectionMode::Burndown => (start_value - daily_rate * t).max(0.0),
            ProjectionMode::Burnup => (start_value + daily_rate * t).min(target),
        };

        // The closing point counts against the cap.
        let samples = self.limits.max_points_per_line.saturating_sub(1);
        let mut points = Vec::new();
        if days > 0.0 && samples > 0 {
            let interval = (days / f64::from(samples)).max(1.0);
            let mut i = 0u32;
            while i < samples {
                let t = f64::from(i) * interval;
                if t >= days - 1e-9 {
                    break;
                }
                points.push(ProjectionPoint {
                    date: start_date + Days::new(t.floor() as u64),
                    value: value_at(t),
                });
                i += 1;
            }
        }
        points.push(ProjectionPoint {
            date: start_date + Days::new(days.ceil() as u64),
            value: target,
        });

        Ok(ProjectionSeries {
            mode,
            scenario,
            daily_rate,
            days_to_target: days,
            target,
            points,
        })
    }

    /// Lines for every scenario: average (most likely), optimistic, pessimistic
    /// and, when available, EWMA. Weekly rates are converted to daily.
    pub fn scenarios(
        &self,
        mode: ProjectionMode,
        estimate: &RateEstimate,
        ewma_weekly_rate: Option<f64>,
        basis: &ProjectionBasis,
    ) -> DomainResult<ProjectionSet> {
        let ProjectionBasis {
            start_date,
            completed,
            scope,
            span_days,
        } = *basis;
        let start_value = match mode {
            ProjectionMode::Burndown => (scope - completed).max(0.0),
            ProjectionMode::Burnup => completed.min(scope),
        };

        let mut rates = vec![
            (Scenario::Average, estimate.most_likely_rate),
            (Scenario::Optimistic, estimate.optimistic_rate),
            (Scenario::Pessimistic, estimate.pessimistic_rate),
        ];
        if let Some(ewma) = ewma_weekly_rate {
            rates.push((Scenario::Ewma, ewma));
        }

        let series = rates
            .into_iter()
            .map(|(scenario, weekly)| {
                self.generate(&ProjectionRequest {
                    mode,
                    scenario,
                    start_date,
                    start_value,
                    scope,
                    daily_rate: weekly / 7.0,
                    span_days,
                })
            })
            .collect::<DomainResult<Vec<_>>>()?;

        Ok(ProjectionSet { mode, series })
    }
}

/// Where every scenario line of a set starts from.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ProjectionBasis {
    pub start_date: NaiveDate,
    /// Work completed so far.
    pub completed: f64,
    /// Total scope (completed + remaining).
    pub scope: f64,
    pub span_days: u32,
}

/// All scenario lines for one mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSet {
    pub mode: ProjectionMode,
    pub series: Vec<ProjectionSeries>,
}

impl ProjectionSet {
    pub fn get(&self, scenario: Scenario) -> Option<&ProjectionSeries> {
        self.series.iter().find(|s| s.scenario == scenario)
    }
}
