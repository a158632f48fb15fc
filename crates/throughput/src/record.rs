use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use burnwise_core::{DomainError, DomainResult, WeekLabel, WorkUnit};

/// One raw activity record (per event or per day) as delivered by a loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub date: NaiveDate,
    pub completed_items: u32,
    pub completed_points: f64,
    pub created_items: u32,
    pub created_points: f64,
}

impl ActivityRecord {
    pub fn completed(date: NaiveDate, items: u32, points: f64) -> Self {
        Self {
            date,
            completed_items: items,
            completed_points: points,
            created_items: 0,
            created_points: 0.0,
        }
    }

    pub fn with_created(mut self, items: u32, points: f64) -> Self {
        self.created_items = items;
        self.created_points = points;
        self
    }

    pub(crate) fn validate(&self) -> DomainResult<()> {
        for (name, v) in [
            ("completed_points", self.completed_points),
            ("created_points", self.created_points),
        ] {
            if !v.is_finite() {
                return Err(DomainError::validation(format!(
                    "{name} on {} is not a finite number",
                    self.date
                )));
            }
            if v < 0.0 {
                return Err(DomainError::validation(format!(
                    "{name} on {} is negative ({v})",
                    self.date
                )));
            }
        }
        Ok(())
    }
}

/// Completed/created work for one ISO week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyThroughputRecord {
    pub week_label: WeekLabel,
    /// Monday of `week_label`.
    pub start_date: NaiveDate,
    pub completed_items: u32,
    pub completed_points: f64,
    pub created_items: u32,
    pub created_points: f64,
}

impl WeeklyThroughputRecord {
    /// A zero-filled week.
    pub fn empty(week_label: WeekLabel) -> Self {
        Self {
            week_label,
            start_date: week_label.start_date(),
            completed_items: 0,
            completed_points: 0.0,
            created_items: 0,
            created_points: 0.0,
        }
    }

    pub fn completed(&self, unit: WorkUnit) -> f64 {
        match unit {
            WorkUnit::Items => f64::from(self.completed_items),
            WorkUnit::Points => self.completed_points,
        }
    }

    pub fn created(&self, unit: WorkUnit) -> f64 {
        match unit {
            WorkUnit::Items => f64::from(self.created_items),
            WorkUnit::Points => self.created_points,
        }
    }

    /// True when nothing was completed in either unit.
    pub fn is_idle(&self) -> bool {
        self.completed_items == 0 && self.completed_points == 0.0
    }

    pub(crate) fn absorb(&mut self, record: &ActivityRecord) {
        self.completed_items = self.completed_items.saturating_add(record.completed_items);
        self.completed_points += record.completed_points;
        self.created_items = self.created_items.saturating_add(record.created_items);
        self.created_points += record.created_points;
    }
}
