//! Weekly bucketing with gap filling.

use std::collections::BTreeMap;

use burnwise_core::{DomainResult, WeekLabel};

use crate::record::{ActivityRecord, WeeklyThroughputRecord};
use crate::series::WeeklySeries;

/// Groups raw activity into ISO weeks.
///
/// Every week between the earliest and latest record is present in the
/// output; weeks without activity are zero-filled so charts have no holes.
/// Rate math must go through [`WeeklySeries::non_zero`] so those synthetic
/// weeks never drag averages down.
#[derive(Debug, Default, Copy, Clone)]
pub struct ThroughputAggregator;

impl ThroughputAggregator {
    pub fn new() -> Self {
        Self
    }

    pub fn aggregate(&self, records: &[ActivityRecord]) -> DomainResult<WeeklySeries> {
        let mut buckets: BTreeMap<WeekLabel, WeeklyThroughputRecord> = BTreeMap::new();
        let mut latest = None;

        for record in records {
            record.validate()?;
            let week = WeekLabel::from_date(record.date);
            buckets
                .entry(week)
                .or_insert_with(|| WeeklyThroughputRecord::empty(week))
                .absorb(record);
            latest = latest.max(Some(record.date));
        }

        let (Some(first), Some(last)) = (
            buckets.keys().next().copied(),
            buckets.keys().next_back().copied(),
        ) else {
            return Ok(WeeklySeries::empty());
        };

        let mut weeks = Vec::with_capacity(first.weeks_until(last) as usize + 1);
        let mut cursor = first;
        while cursor <= last {
            let week = buckets
                .remove(&cursor)
                .unwrap_or_else(|| WeeklyThroughputRecord::empty(cursor));
            weeks.push(week);
            cursor = cursor.next();
        }

        tracing::debug!(
            raw_records = records.len(),
            weeks = weeks.len(),
            first = %first,
            last = %last,
            "aggregated weekly throughput"
        );

        Ok(WeeklySeries::from_parts(weeks, latest))
    }
}
