//! ISO year-week labels ("2025-W42"), the canonical time bucket.

use core::str::FromStr;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// An ISO-8601 week.
///
/// Internally anchored on the Monday that starts the week, so ordering and
/// arithmetic follow the calendar and year boundaries (week 53 / week 1) need
/// no special handling.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WeekLabel {
    monday: NaiveDate,
}

impl WeekLabel {
    /// Build a label from an ISO year and week number.
    pub fn new(iso_year: i32, week: u32) -> DomainResult<Self> {
        let monday = NaiveDate::from_isoywd_opt(iso_year, week, Weekday::Mon).ok_or_else(|| {
            DomainError::invalid_week(format!("{iso_year}-W{week:02} does not exist"))
        })?;
        Ok(Self { monday })
    }

    /// The ISO week containing `date`.
    pub fn from_date(date: NaiveDate) -> Self {
        let offset = u64::from(date.weekday().num_days_from_monday());
        Self {
            monday: date - Days::new(offset),
        }
    }

    pub fn iso_year(&self) -> i32 {
        self.monday.iso_week().year()
    }

    pub fn week(&self) -> u32 {
        self.monday.iso_week().week()
    }

    /// Monday of the week.
    pub fn start_date(&self) -> NaiveDate {
        self.monday
    }

    /// Sunday of the week.
    pub fn end_date(&self) -> NaiveDate {
        self.monday + Days::new(6)
    }

    pub fn next(&self) -> Self {
        Self {
            monday: self.monday + Days::new(7),
        }
    }

    pub fn previous(&self) -> Self {
        Self {
            monday: self.monday - Days::new(7),
        }
    }

    /// Signed number of weeks from `self` to `other` (`other - self`).
    pub fn weeks_until(&self, other: WeekLabel) -> i64 {
        (other.monday - self.monday).num_days() / 7
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date() && date <= self.end_date()
    }
}

impl core::fmt::Display for WeekLabel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}-W{:02}", self.iso_year(), self.week())
    }
}

impl FromStr for WeekLabel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (year, week) = trimmed
            .split_once("-W")
            .ok_or_else(|| DomainError::invalid_week(format!("expected YYYY-Www, got {s:?}")))?;

        let year: i32 = year
            .parse()
            .map_err(|_| DomainError::invalid_week(format!("bad year in {s:?}")))?;
        let week: u32 = week
            .parse()
            .map_err(|_| DomainError::invalid_week(format!("bad week number in {s:?}")))?;

        Self::new(year, week)
    }
}

impl TryFrom<String> for WeekLabel {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WeekLabel> for String {
    fn from(value: WeekLabel) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_and_displays_iso_labels() {
        let w: WeekLabel = "2025-W42".parse().unwrap();
        assert_eq!(w.iso_year(), 2025);
        assert_eq!(w.week(), 42);
        assert_eq!(w.start_date(), date(2025, 10, 13));
        assert_eq!(w.end_date(), date(2025, 10, 19));
        assert_eq!(w.to_string(), "2025-W42");
    }

    #[test]
    fn single_digit_weeks_are_zero_padded() {
        let w = WeekLabel::new(2025, 3).unwrap();
        assert_eq!(w.to_string(), "2025-W03");
        assert_eq!("2025-W3".parse::<WeekLabel>().unwrap(), w);
    }

    #[test]
    fn year_boundary_uses_iso_year() {
        // 2024-12-30 is Monday of 2025-W01.
        let w = WeekLabel::from_date(date(2024, 12, 31));
        assert_eq!(w.to_string(), "2025-W01");
        // 2021-01-03 is Sunday of 2020-W53.
        let w = WeekLabel::from_date(date(2021, 1, 3));
        assert_eq!(w.to_string(), "2020-W53");
    }

    #[test]
    fn nonexistent_week_53_is_rejected() {
        assert!(WeekLabel::new(2021, 53).is_err());
        assert!(WeekLabel::new(2020, 53).is_ok());
        assert!("2025-W00".parse::<WeekLabel>().is_err());
        assert!("2025/42".parse::<WeekLabel>().is_err());
    }

    #[test]
    fn ordering_follows_calendar_across_years() {
        let a: WeekLabel = "2024-W52".parse().unwrap();
        let b: WeekLabel = "2025-W01".parse().unwrap();
        assert!(a < b);
        assert_eq!(a.next(), b);
        assert_eq!(b.previous(), a);
        assert_eq!(a.weeks_until(b), 1);
        assert_eq!(b.weeks_until(a), -1);
    }

    #[test]
    fn serde_uses_string_form() {
        let w: WeekLabel = "2025-W42".parse().unwrap();
        let json = serde_json::to_string(&w).unwrap();
        assert_eq!(json, "\"2025-W42\"");
        let back: WeekLabel = serde_json::from_str(&json).unwrap();
        assert_eq!(back, w);
        assert!(serde_json::from_str::<WeekLabel>("\"2021-W53\"").is_err());
    }

    proptest! {
        #[test]
        fn every_day_maps_into_its_own_week(days in 0i64..20_000) {
            let d = date(1990, 1, 1) + chrono::Duration::days(days);
            let w = WeekLabel::from_date(d);
            prop_assert!(w.contains(d));
            prop_assert_eq!(w.start_date().weekday(), Weekday::Mon);
            let reparsed: WeekLabel = w.to_string().parse().unwrap();
            prop_assert_eq!(reparsed, w);
        }
    }
}
