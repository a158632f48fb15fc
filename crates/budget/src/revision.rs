use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use burnwise_core::{DomainError, DomainResult, RevisionId, WeekLabel};

/// One immutable change to a budget, effective from `week_label` onwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetRevision {
    pub revision_id: RevisionId,
    pub revision_date: DateTime<Utc>,
    pub week_label: WeekLabel,
    pub time_allocated_weeks_delta: i64,
    pub team_cost_delta: f64,
    pub budget_total_delta: f64,
    pub reason: Option<String>,
    /// Free-form context supplied by whoever recorded the revision.
    pub metadata: JsonValue,
}

impl BudgetRevision {
    pub fn new(week_label: WeekLabel, revision_date: DateTime<Utc>) -> Self {
        Self {
            revision_id: RevisionId::new(),
            revision_date,
            week_label,
            time_allocated_weeks_delta: 0,
            team_cost_delta: 0.0,
            budget_total_delta: 0.0,
            reason: None,
            metadata: JsonValue::Null,
        }
    }

    pub fn with_id(mut self, revision_id: RevisionId) -> Self {
        self.revision_id = revision_id;
        self
    }

    pub fn with_time_delta(mut self, weeks: i64) -> Self {
        self.time_allocated_weeks_delta = weeks;
        self
    }

    pub fn with_team_cost_delta(mut self, delta: f64) -> Self {
        self.team_cost_delta = delta;
        self
    }

    pub fn with_budget_delta(mut self, delta: f64) -> Self {
        self.budget_total_delta = delta;
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_metadata(mut self, metadata: JsonValue) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn is_noop(&self) -> bool {
        self.time_allocated_weeks_delta == 0
            && self.team_cost_delta == 0.0
            && self.budget_total_delta == 0.0
    }

    pub fn validate(&self) -> DomainResult<()> {
        if !self.team_cost_delta.is_finite() || !self.budget_total_delta.is_finite() {
            return Err(DomainError::validation(format!(
                "revision {} has a non-numeric delta",
                self.revision_id
            )));
        }
        Ok(())
    }
}
