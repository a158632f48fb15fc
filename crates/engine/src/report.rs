use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use burnwise_budget::{BudgetSnapshot, CategoryCost};
use burnwise_core::{DomainError, WeekLabel, WorkUnit};
use burnwise_forecast::{
    EwmaForecast, ForecastResult, LoadRange, ProjectionSet, RateEstimate, TrendComparison,
};

use crate::cache::ReportKey;

/// A metric that could not be computed. The rest of the report is unaffected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricFailure {
    pub metric: String,
    pub error: String,
}

impl MetricFailure {
    pub fn new(metric: impl Into<String>, error: &DomainError) -> Self {
        Self {
            metric: metric.into(),
            error: error.to_string(),
        }
    }
}

/// Everything forecast for one unit. `None` fields mean "not enough data yet"
/// or a failure recorded in [`ForecastReport::failures`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitForecast {
    pub unit: WorkUnit,
    pub completed_to_date: f64,
    pub remaining: f64,
    pub rates: Option<RateEstimate>,
    /// Projected completion at the most-likely rate.
    pub pert_completion_date: Option<NaiveDate>,
    pub weighted: Option<ForecastResult>,
    pub ewma: Option<EwmaForecast>,
    /// Actual of the in-progress week so far.
    pub current_week_actual: Option<f64>,
    /// In-progress week blended with the weighted forecast.
    pub current_week_blend: Option<f64>,
    /// Last completed week against the forecast built from the weeks before it.
    pub trend: Option<TrendComparison>,
    pub load_range: Option<LoadRange>,
    pub burndown: Option<ProjectionSet>,
    pub burnup: Option<ProjectionSet>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastReport {
    pub key: ReportKey,
    pub generated_at: DateTime<Utc>,
    pub as_of: NaiveDate,
    pub items: UnitForecast,
    pub points: UnitForecast,
    pub budget: Option<BudgetSnapshot>,
    pub category_costs: Option<Vec<CategoryCost>>,
    pub failures: Vec<MetricFailure>,
}

impl ForecastReport {
    pub fn unit(&self, unit: WorkUnit) -> &UnitForecast {
        match unit {
            WorkUnit::Items => &self.items,
            WorkUnit::Points => &self.points,
        }
    }

    pub fn as_of_week(&self) -> WeekLabel {
        self.key.week()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}
