//! Ordered weekly series and its filtered views.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use burnwise_core::{DomainError, DomainResult, WeekLabel, WorkUnit};

use crate::record::WeeklyThroughputRecord;

/// Ordered, gap-free (unless filtered) weekly throughput.
///
/// `latest_date` is the date of the newest raw record, which can fall anywhere
/// inside the last week. Trailing windows are measured from it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WeeklySeries {
    records: Vec<WeeklyThroughputRecord>,
    latest_date: Option<NaiveDate>,
}

impl WeeklySeries {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(
        records: Vec<WeeklyThroughputRecord>,
        latest_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            records,
            latest_date,
        }
    }

    /// Build a series from already-bucketed weeks (e.g. loaded from storage).
    ///
    /// Weeks must be strictly ascending and unique. When `latest_date` is not
    /// given, the Sunday of the last week is used.
    pub fn from_weeks(
        records: Vec<WeeklyThroughputRecord>,
        latest_date: Option<NaiveDate>,
    ) -> DomainResult<Self> {
        for pair in records.windows(2) {
            if pair[0].week_label >= pair[1].week_label {
                return Err(DomainError::validation(format!(
                    "weekly records must be strictly ascending ({} then {})",
                    pair[0].week_label, pair[1].week_label
                )));
            }
        }
        for r in &records {
            if r.start_date != r.week_label.start_date() {
                return Err(DomainError::validation(format!(
                    "start_date {} does not begin week {}",
                    r.start_date, r.week_label
                )));
            }
            burnwise_core::ensure_non_negative(
                &[r.completed_points, r.created_points],
                &format!("points in {}", r.week_label),
            )?;
        }
        let latest_date = latest_date.or_else(|| records.last().map(|r| r.week_label.end_date()));
        Ok(Self {
            records,
            latest_date,
        })
    }

    pub fn records(&self) -> &[WeeklyThroughputRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.latest_date
    }

    pub fn first_week(&self) -> Option<WeekLabel> {
        self.records.first().map(|r| r.week_label)
    }

    pub fn last_week(&self) -> Option<WeekLabel> {
        self.records.last().map(|r| r.week_label)
    }

    pub fn get(&self, week: WeekLabel) -> Option<&WeeklyThroughputRecord> {
        self.records
            .binary_search_by(|r| r.week_label.cmp(&week))
            .ok()
            .map(|idx| &self.records[idx])
    }

    /// Weeks whose start date lies within the last `weeks` weeks of the latest
    /// record date. Date-based: sparse data yields fewer rows, never older ones.
    /// A window reaching past the calendar's start keeps every week.
    pub fn trailing(&self, weeks: u32) -> Self {
        let Some(latest) = self.latest_date else {
            return Self::empty();
        };
        let cutoff = latest.checked_sub_days(Days::new(7 * u64::from(weeks)));
        let records = self
            .records
            .iter()
            .filter(|r| cutoff.is_none_or(|c| r.start_date > c))
            .cloned()
            .collect();
        Self {
            records,
            latest_date: self.latest_date,
        }
    }

    /// Weeks up to and including `week`, as if the data ended there.
    pub fn up_to(&self, week: WeekLabel) -> Self {
        let records: Vec<_> = self
            .records
            .iter()
            .filter(|r| r.week_label <= week)
            .cloned()
            .collect();
        let latest_date = self.latest_date.map(|d| d.min(week.end_date()));
        Self {
            records,
            latest_date,
        }
    }

    /// Weeks from `week` onwards.
    pub fn since(&self, week: WeekLabel) -> Self {
        let records = self
            .records
            .iter()
            .filter(|r| r.week_label >= week)
            .cloned()
            .collect();
        Self {
            records,
            latest_date: self.latest_date,
        }
    }

    /// Drops weeks in which nothing was completed. Rate estimation only.
    pub fn non_zero(&self) -> Self {
        let records = self
            .records
            .iter()
            .filter(|r| !r.is_idle())
            .cloned()
            .collect();
        Self {
            records,
            latest_date: self.latest_date,
        }
    }

    pub fn values(&self, unit: WorkUnit) -> Vec<f64> {
        self.records.iter().map(|r| r.completed(unit)).collect()
    }

    pub fn created_values(&self, unit: WorkUnit) -> Vec<f64> {
        self.records.iter().map(|r| r.created(unit)).collect()
    }

    pub fn total_completed(&self, unit: WorkUnit) -> f64 {
        self.records.iter().map(|r| r.completed(unit)).sum()
    }

    pub fn total_created(&self, unit: WorkUnit) -> f64 {
        self.records.iter().map(|r| r.created(unit)).sum()
    }
}
