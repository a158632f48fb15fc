//! Report cache keyed by (profile, query, day).
//!
//! There is no process-wide instance. Construct one, share it through `Arc`
//! and invalidate a profile/query whenever its underlying data changes.
//! Only the newest day is kept per profile/query.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use burnwise_core::{ProfileId, QueryId, WeekLabel};

use crate::report::ForecastReport;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportKey {
    pub profile_id: ProfileId,
    pub query_id: QueryId,
    /// Blends, projections and completion dates move with the day.
    pub as_of: NaiveDate,
}

impl ReportKey {
    pub fn new(profile_id: ProfileId, query_id: QueryId, as_of: NaiveDate) -> Self {
        Self {
            profile_id,
            query_id,
            as_of,
        }
    }

    pub fn week(&self) -> WeekLabel {
        WeekLabel::from_date(self.as_of)
    }

    fn same_source(&self, other: &ReportKey) -> bool {
        self.profile_id == other.profile_id && self.query_id == other.query_id
    }
}

#[derive(Debug, Default)]
pub struct ReportCache {
    entries: RwLock<HashMap<ReportKey, ForecastReport>>,
}

impl ReportCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &ReportKey) -> Option<ForecastReport> {
        match self.entries.read() {
            Ok(entries) => entries.get(key).cloned(),
            Err(_) => None,
        }
    }

    /// Store a report, evicting older days of the same profile/query.
    ///
    /// A report older than one already cached is dropped.
    pub fn insert(&self, report: ForecastReport) {
        let Ok(mut entries) = self.entries.write() else {
            return;
        };
        let key = report.key;
        if entries.keys().any(|k| k.same_source(&key) && k.as_of > key.as_of) {
            return;
        }
        entries.retain(|k, _| !(k.same_source(&key) && k.as_of < key.as_of));
        entries.insert(key, report);
    }

    /// Drop everything cached for a profile/query.
    pub fn invalidate(&self, profile_id: ProfileId, query_id: QueryId) -> usize {
        let Ok(mut entries) = self.entries.write() else {
            return 0;
        };
        let before = entries.len();
        entries.retain(|k, _| !(k.profile_id == profile_id && k.query_id == query_id));
        before - entries.len()
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::UnitForecast;
    use burnwise_core::WorkUnit;
    use chrono::{TimeZone, Utc};

    fn empty_unit(unit: WorkUnit) -> UnitForecast {
        UnitForecast {
            unit,
            completed_to_date: 0.0,
            remaining: 0.0,
            rates: None,
            pert_completion_date: None,
            weighted: None,
            ewma: None,
            current_week_actual: None,
            current_week_blend: None,
            trend: None,
            load_range: None,
            burndown: None,
            burnup: None,
        }
    }

    fn report(key: ReportKey) -> ForecastReport {
        ForecastReport {
            key,
            generated_at: Utc.with_ymd_and_hms(2025, 10, 15, 9, 0, 0).unwrap(),
            as_of: key.as_of,
            items: empty_unit(WorkUnit::Items),
            points: empty_unit(WorkUnit::Points),
            budget: None,
            category_costs: None,
            failures: vec![],
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, d).unwrap()
    }

    #[test]
    fn invalidate_drops_only_matching_profile_query() {
        let cache = ReportCache::new();
        let profile = ProfileId::new();
        let query = QueryId::new();

        cache.insert(report(ReportKey::new(profile, query, day(15))));
        let other_query = ReportKey::new(profile, QueryId::new(), day(15));
        let other_profile = ReportKey::new(ProfileId::new(), query, day(15));
        cache.insert(report(other_query));
        cache.insert(report(other_profile));
        assert_eq!(cache.len(), 3);

        assert_eq!(cache.invalidate(profile, query), 1);
        assert_eq!(cache.len(), 2);
        assert!(cache.get(&other_query).is_some());
        assert!(cache.get(&other_profile).is_some());

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn insert_replaces_same_key() {
        let cache = ReportCache::new();
        let key = ReportKey::new(ProfileId::new(), QueryId::new(), day(15));
        cache.insert(report(key));
        let mut updated = report(key);
        updated.items.remaining = 5.0;
        cache.insert(updated);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&key).unwrap().items.remaining, 5.0);
    }

    #[test]
    fn newer_day_evicts_older_days() {
        let cache = ReportCache::new();
        let profile = ProfileId::new();
        let query = QueryId::new();
        let monday = ReportKey::new(profile, query, day(13));
        let tuesday = ReportKey::new(profile, query, day(14));
        let unrelated = ReportKey::new(profile, QueryId::new(), day(13));

        cache.insert(report(monday));
        cache.insert(report(unrelated));
        cache.insert(report(tuesday));

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&monday).is_none());
        assert!(cache.get(&tuesday).is_some());
        assert!(cache.get(&unrelated).is_some());

        // A late write for an older day does not displace the newer one.
        cache.insert(report(monday));
        assert_eq!(cache.len(), 2);
        assert!(cache.get(&monday).is_none());
    }

    #[test]
    fn key_week_follows_the_day() {
        let key = ReportKey::new(ProfileId::new(), QueryId::new(), day(19));
        assert_eq!(key.week(), "2025-W42".parse().unwrap());
    }
}
