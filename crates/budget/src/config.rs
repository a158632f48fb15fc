use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use burnwise_core::{DomainError, DomainResult, WeekLabel, WorkUnit};

use crate::revision::BudgetRevision;

/// Budget for one (profile, query).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetConfiguration {
    pub time_allocated_weeks: i64,
    /// Team cost per week.
    pub team_cost_per_period: f64,
    pub budget_total: f64,
    pub currency_symbol: String,
    pub baseline_velocity_items: f64,
    pub baseline_velocity_points: f64,
    pub created_at: DateTime<Utc>,
}

impl BudgetConfiguration {
    pub fn new(
        time_allocated_weeks: i64,
        team_cost_per_period: f64,
        budget_total: f64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            time_allocated_weeks,
            team_cost_per_period,
            budget_total,
            currency_symbol: "$".to_string(),
            baseline_velocity_items: 0.0,
            baseline_velocity_points: 0.0,
            created_at,
        }
    }

    pub fn with_currency(mut self, symbol: impl Into<String>) -> Self {
        self.currency_symbol = symbol.into();
        self
    }

    pub fn with_baseline_velocity(mut self, items: f64, points: f64) -> Self {
        self.baseline_velocity_items = items;
        self.baseline_velocity_points = points;
        self
    }

    pub fn baseline_velocity(&self, unit: WorkUnit) -> f64 {
        match unit {
            WorkUnit::Items => self.baseline_velocity_items,
            WorkUnit::Points => self.baseline_velocity_points,
        }
    }

    /// ISO week the budget started in.
    pub fn start_week(&self) -> WeekLabel {
        WeekLabel::from_date(self.created_at.date_naive())
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.time_allocated_weeks <= 0 {
            return Err(DomainError::validation(format!(
                "time_allocated_weeks must be positive (got {})",
                self.time_allocated_weeks
            )));
        }
        for (name, v) in [
            ("team_cost_per_period", self.team_cost_per_period),
            ("budget_total", self.budget_total),
            ("baseline_velocity_items", self.baseline_velocity_items),
            ("baseline_velocity_points", self.baseline_velocity_points),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(DomainError::validation(format!(
                    "{name} must be a non-negative number (got {v})"
                )));
            }
        }
        Ok(())
    }

    /// A copy with the revision's deltas added.
    pub(crate) fn applied(&self, revision: &BudgetRevision) -> Self {
        Self {
            time_allocated_weeks: self.time_allocated_weeks + revision.time_allocated_weeks_delta,
            team_cost_per_period: self.team_cost_per_period + revision.team_cost_delta,
            budget_total: self.budget_total + revision.budget_total_delta,
            ..self.clone()
        }
    }

    /// A copy with the revision's deltas removed.
    pub(crate) fn reverted(&self, revision: &BudgetRevision) -> Self {
        Self {
            time_allocated_weeks: self.time_allocated_weeks - revision.time_allocated_weeks_delta,
            team_cost_per_period: self.team_cost_per_period - revision.team_cost_delta,
            budget_total: self.budget_total - revision.budget_total_delta,
            ..self.clone()
        }
    }

    /// Field-wise equality with a tolerance on money amounts.
    pub(crate) fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        self.time_allocated_weeks == other.time_allocated_weeks
            && (self.team_cost_per_period - other.team_cost_per_period).abs() <= tolerance
            && (self.budget_total - other.budget_total).abs() <= tolerance
            && (self.baseline_velocity_items - other.baseline_velocity_items).abs() <= tolerance
            && (self.baseline_velocity_points - other.baseline_velocity_points).abs() <= tolerance
            && self.currency_symbol == other.currency_symbol
    }
}
