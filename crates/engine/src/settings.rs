//! Engine configuration.
//!
//! Loading (files, env, UI) is the caller's concern; this type only carries
//! and validates the values.

use serde::{Deserialize, Serialize};

use burnwise_budget::BudgetPolicy;
use burnwise_core::{DomainError, DomainResult};
use burnwise_forecast::{DEFAULT_ALPHA, ProjectionLimits};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsSettings {
    /// Latest non-zero weeks eligible as optimistic/pessimistic extremes.
    pub pert_factor: usize,
    pub ewma_alpha: f64,
    /// Weeks of history required before a weighted forecast is reported.
    pub min_forecast_weeks: usize,
    /// Restrict forecasting to the trailing N weeks of history (`None` = all).
    pub history_weeks: Option<u32>,
    /// Relative half-width of the expected load band around a forecast.
    pub load_range_percent: f64,
    pub projection: ProjectionLimits,
    pub budget: BudgetPolicy,
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            pert_factor: 6,
            ewma_alpha: DEFAULT_ALPHA,
            min_forecast_weeks: 2,
            history_weeks: None,
            load_range_percent: 0.2,
            projection: ProjectionLimits::default(),
            budget: BudgetPolicy::default(),
        }
    }
}

impl AnalyticsSettings {
    pub fn with_pert_factor(mut self, pert_factor: usize) -> Self {
        self.pert_factor = pert_factor;
        self
    }

    pub fn with_ewma_alpha(mut self, alpha: f64) -> Self {
        self.ewma_alpha = alpha;
        self
    }

    pub fn with_history_weeks(mut self, weeks: u32) -> Self {
        self.history_weeks = Some(weeks);
        self
    }

    pub fn with_projection_limits(mut self, limits: ProjectionLimits) -> Self {
        self.projection = limits;
        self
    }

    pub fn with_budget_policy(mut self, policy: BudgetPolicy) -> Self {
        self.budget = policy;
        self
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.pert_factor == 0 {
            return Err(DomainError::validation("pert_factor must be at least 1"));
        }
        if !(self.ewma_alpha > 0.0 && self.ewma_alpha <= 1.0) {
            return Err(DomainError::validation(format!(
                "ewma_alpha must be within (0, 1] (got {})",
                self.ewma_alpha
            )));
        }
        if self.history_weeks == Some(0) {
            return Err(DomainError::validation("history_weeks must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.load_range_percent) {
            return Err(DomainError::validation(format!(
                "load_range_percent must be within [0, 1] (got {})",
                self.load_range_percent
            )));
        }
        self.projection.validate()?;
        self.budget.validate()
    }
}
