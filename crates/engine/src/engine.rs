//! Report assembly.
//!
//! Every metric is computed independently: a failure is recorded on the
//! report as a [`MetricFailure`] and the remaining metrics still run.

use std::sync::Arc;

use chrono::{Days, NaiveDate};

use burnwise_budget::{BudgetLedger, BudgetSnapshot, CategorySnapshot};
use burnwise_core::{Clock, DomainResult, ProfileId, QueryId, WeekLabel, WorkUnit};
use burnwise_forecast::{
    EwmaForecaster, MetricDirection, ProjectionBasis, ProjectionGenerator, ProjectionMode,
    RateEstimator, blend_current_week, flow_load_range, forecast, trend_vs_forecast,
};
use burnwise_throughput::WeeklySeries;

use crate::cache::{ReportCache, ReportKey};
use crate::report::{ForecastReport, MetricFailure, UnitForecast};
use crate::settings::AnalyticsSettings;

/// Budget side of a report request.
#[derive(Debug, Clone)]
pub struct BudgetInput {
    pub ledger: BudgetLedger,
    /// Unit velocity and cost per unit are measured in.
    pub unit: WorkUnit,
    pub categories: Vec<CategorySnapshot>,
}

/// Everything a report for one profile/query needs.
#[derive(Debug, Clone)]
pub struct ForecastInput {
    pub profile_id: ProfileId,
    pub query_id: QueryId,
    pub series: WeeklySeries,
    pub remaining_items: f64,
    pub remaining_points: f64,
    pub budget: Option<BudgetInput>,
}

impl ForecastInput {
    pub fn new(profile_id: ProfileId, query_id: QueryId, series: WeeklySeries) -> Self {
        Self {
            profile_id,
            query_id,
            series,
            remaining_items: 0.0,
            remaining_points: 0.0,
            budget: None,
        }
    }

    pub fn with_remaining(mut self, items: f64, points: f64) -> Self {
        self.remaining_items = items;
        self.remaining_points = points;
        self
    }

    pub fn with_budget(mut self, budget: BudgetInput) -> Self {
        self.budget = Some(budget);
        self
    }

    fn remaining(&self, unit: WorkUnit) -> f64 {
        match unit {
            WorkUnit::Items => self.remaining_items,
            WorkUnit::Points => self.remaining_points,
        }
    }
}

pub struct AnalyticsEngine {
    settings: AnalyticsSettings,
    clock: Arc<dyn Clock>,
    cache: Option<Arc<ReportCache>>,
    rates: RateEstimator,
    ewma: EwmaForecaster,
    projections: ProjectionGenerator,
}

impl AnalyticsEngine {
    pub fn new(settings: AnalyticsSettings, clock: Arc<dyn Clock>) -> DomainResult<Self> {
        settings.validate()?;
        Ok(Self {
            rates: RateEstimator::new(settings.pert_factor)?,
            ewma: EwmaForecaster::new(settings.ewma_alpha)?,
            projections: ProjectionGenerator::new(settings.projection)?,
            settings,
            clock,
            cache: None,
        })
    }

    pub fn with_cache(mut self, cache: Arc<ReportCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn settings(&self) -> &AnalyticsSettings {
        &self.settings
    }

    pub fn cache(&self) -> Option<&Arc<ReportCache>> {
        self.cache.as_ref()
    }

    /// Report for today, served from the cache when present.
    pub fn report(&self, input: &ForecastInput) -> ForecastReport {
        let key = ReportKey::new(input.profile_id, input.query_id, self.clock.today());

        if let Some(cached) = self.cache.as_ref().and_then(|c| c.get(&key)) {
            tracing::debug!(profile_id = %key.profile_id, query_id = %key.query_id, as_of = %key.as_of, "report cache hit");
            return cached;
        }

        let report = self.build(key, input);
        if let Some(cache) = &self.cache {
            cache.insert(report.clone());
        }
        report
    }

    /// Drop cached reports for a profile/query and build a fresh one.
    pub fn refresh(&self, input: &ForecastInput) -> ForecastReport {
        if let Some(cache) = &self.cache {
            cache.invalidate(input.profile_id, input.query_id);
        }
        self.report(input)
    }

    /// Budget snapshots for several weeks. One failing week does not affect the others.
    pub fn budget_snapshots(
        &self,
        ledger: &BudgetLedger,
        series: &WeeklySeries,
        unit: WorkUnit,
        weeks: &[WeekLabel],
    ) -> Vec<(WeekLabel, DomainResult<BudgetSnapshot>)> {
        weeks
            .iter()
            .map(|week| {
                let snapshot = ledger.snapshot(*week, series, unit, &self.settings.budget);
                if let Err(err) = &snapshot {
                    tracing::warn!(week = %week, error = %err, "budget snapshot failed");
                }
                (*week, snapshot)
            })
            .collect()
    }

    fn build(&self, key: ReportKey, input: &ForecastInput) -> ForecastReport {
        let today = key.as_of;
        let week = key.week();
        let mut failures = Vec::new();

        let items = self.unit_forecast(input, WorkUnit::Items, week, today, &mut failures);
        let points = self.unit_forecast(input, WorkUnit::Points, week, today, &mut failures);

        let (budget, category_costs) = match &input.budget {
            Some(b) => {
                let snapshot = isolate(
                    &mut failures,
                    "budget",
                    b.ledger
                        .snapshot(week, &input.series, b.unit, &self.settings.budget),
                );
                let costs = if b.categories.is_empty() {
                    None
                } else {
                    isolate(
                        &mut failures,
                        "category_costs",
                        b.ledger.cost_breakdown_by_category(
                            week,
                            &b.categories,
                            &input.series,
                            b.unit,
                            self.settings.budget.velocity_window,
                        ),
                    )
                };
                (snapshot, costs)
            }
            None => (None, None),
        };

        tracing::debug!(
            profile_id = %key.profile_id,
            query_id = %key.query_id,
            as_of = %key.as_of,
            failures = failures.len(),
            "built forecast report"
        );

        ForecastReport {
            key,
            generated_at: self.clock.now(),
            as_of: today,
            items,
            points,
            budget,
            category_costs,
            failures,
        }
    }

    fn unit_forecast(
        &self,
        input: &ForecastInput,
        unit: WorkUnit,
        as_of_week: WeekLabel,
        today: NaiveDate,
        failures: &mut Vec<MetricFailure>,
    ) -> UnitForecast {
        let series = &input.series;
        let remaining = input.remaining(unit);

        // Only fully elapsed weeks feed the forecasts.
        let completed_weeks = series.up_to(as_of_week.previous());
        let history = match self.settings.history_weeks {
            Some(n) => completed_weeks.trailing(n),
            None => completed_weeks,
        };
        let values = history.values(unit);
        let completed_to_date = series.up_to(as_of_week).total_completed(unit);

        let rates = isolate(
            failures,
            format!("{unit}.rates"),
            self.rates.estimate(&history, unit, remaining),
        )
        .flatten();
        let pert_completion_date = rates
            .as_ref()
            .and_then(|r| date_after_weeks(today, r.most_likely_weeks));

        let weighted = isolate(
            failures,
            format!("{unit}.weighted_forecast"),
            forecast(&values, None, self.settings.min_forecast_weeks),
        )
        .flatten();
        let ewma = isolate(failures, format!("{unit}.ewma"), self.ewma.forecast(&values)).flatten();

        let current_week_actual = series.get(as_of_week).map(|r| r.completed(unit));
        let current_week_blend = match (current_week_actual, &weighted) {
            (Some(actual), Some(w)) => Some(blend_current_week(actual, w.forecast_value, today)),
            _ => None,
        };

        let trend = match values.split_last() {
            Some((last, prior)) => isolate(
                failures,
                format!("{unit}.trend"),
                forecast(prior, None, self.settings.min_forecast_weeks).and_then(|f| {
                    f.map(|f| trend_vs_forecast(*last, f.forecast_value, MetricDirection::HigherBetter))
                        .transpose()
                }),
            )
            .flatten(),
            None => None,
        };

        let load_range = match &weighted {
            Some(w) if w.forecast_value > 0.0 => isolate(
                failures,
                format!("{unit}.load_range"),
                flow_load_range(w.forecast_value, self.settings.load_range_percent),
            ),
            _ => None,
        };

        let (burndown, burnup) = match &rates {
            Some(estimate) => {
                let basis = ProjectionBasis {
                    start_date: today,
                    completed: completed_to_date,
                    scope: completed_to_date + remaining.max(0.0),
                    span_days: history_span_days(&history),
                };
                let ewma_rate = ewma.as_ref().map(|e| e.forecast_value);
                let burndown = isolate(
                    failures,
                    format!("{unit}.burndown"),
                    self.projections
                        .scenarios(ProjectionMode::Burndown, estimate, ewma_rate, &basis),
                );
                let burnup = isolate(
                    failures,
                    format!("{unit}.burnup"),
                    self.projections
                        .scenarios(ProjectionMode::Burnup, estimate, ewma_rate, &basis),
                );
                (burndown, burnup)
            }
            None => (None, None),
        };

        UnitForecast {
            unit,
            completed_to_date,
            remaining,
            rates,
            pert_completion_date,
            weighted,
            ewma,
            current_week_actual,
            current_week_blend,
            trend,
            load_range,
            burndown,
            burnup,
        }
    }
}

fn isolate<T>(
    failures: &mut Vec<MetricFailure>,
    metric: impl Into<String>,
    result: DomainResult<T>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            let metric = metric.into();
            tracing::warn!(metric = %metric, error = %err, "metric computation failed");
            failures.push(MetricFailure::new(metric, &err));
            None
        }
    }
}

/// Calendar days covered by the history, at least one week.
fn history_span_days(history: &WeeklySeries) -> u32 {
    let weeks = match (history.first_week(), history.last_week()) {
        (Some(first), Some(last)) => first.weeks_until(last) + 1,
        _ => 1,
    };
    u32::try_from(weeks.max(1) * 7).unwrap_or(u32::MAX)
}

fn date_after_weeks(start: NaiveDate, weeks: f64) -> Option<NaiveDate> {
    let days = (weeks * 7.0).ceil();
    if !days.is_finite() || days < 0.0 || days > f64::from(u32::MAX) {
        return None;
    }
    start.checked_add_days(Days::new(days as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use burnwise_budget::{BudgetConfiguration, BudgetPolicy, WorkCategory};
    use burnwise_core::FixedClock;
    use burnwise_forecast::{Confidence, Scenario, TrendArrow};
    use burnwise_throughput::{ActivityRecord, ThroughputAggregator};
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // Mondays 2025-09-01 .. 2025-09-22 (W36..W39), plus Wednesday of W40.
    fn series() -> WeeklySeries {
        let records = vec![
            ActivityRecord::completed(date(2025, 9, 1), 10, 20.0),
            ActivityRecord::completed(date(2025, 9, 8), 12, 24.0),
            ActivityRecord::completed(date(2025, 9, 15), 15, 30.0),
            ActivityRecord::completed(date(2025, 9, 22), 18, 36.0),
            ActivityRecord::completed(date(2025, 10, 1), 7, 14.0),
        ];
        ThroughputAggregator::new().aggregate(&records).unwrap()
    }

    fn engine_on(day: NaiveDate) -> AnalyticsEngine {
        AnalyticsEngine::new(AnalyticsSettings::default(), Arc::new(FixedClock::on(day))).unwrap()
    }

    fn input() -> ForecastInput {
        ForecastInput::new(ProfileId::new(), QueryId::new(), series()).with_remaining(40.0, 80.0)
    }

    #[test]
    fn report_uses_completed_weeks_only() {
        // Wednesday 2025-10-01 is in W40; W36..W39 are history.
        let report = engine_on(date(2025, 10, 1)).report(&input());
        assert!(report.is_complete(), "{:?}", report.failures);
        assert_eq!(report.as_of_week(), "2025-W40".parse().unwrap());

        let items = report.unit(WorkUnit::Items);
        let weighted = items.weighted.as_ref().unwrap();
        assert!((weighted.forecast_value - 15.1).abs() < 1e-9);
        assert_eq!(weighted.confidence, Confidence::Established);
        assert_eq!(items.completed_to_date, 62.0);
        assert_eq!(items.current_week_actual, Some(7.0));

        // Wednesday weight is 3/7.
        let expected = 3.0 / 7.0 * 7.0 + 4.0 / 7.0 * 15.1;
        assert!((items.current_week_blend.unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn trend_compares_last_week_with_prior_forecast() {
        let report = engine_on(date(2025, 10, 1)).report(&input());
        let trend = report.items.trend.as_ref().unwrap();
        // Forecast of [10, 12, 15] with equal weights is 12.333..; 18 is above it.
        assert_eq!(trend.direction, TrendArrow::Up);
        assert!(trend.is_good);
    }

    #[test]
    fn projections_cover_every_scenario() {
        let report = engine_on(date(2025, 10, 1)).report(&input());
        let burndown = report.points.burndown.as_ref().unwrap();
        for scenario in [Scenario::Average, Scenario::Optimistic, Scenario::Pessimistic, Scenario::Ewma] {
            let line = burndown.get(scenario).unwrap();
            assert_eq!(line.points()[0].date, date(2025, 10, 1));
            assert_eq!(line.last().unwrap().value, 0.0);
        }
        assert!(report.points.pert_completion_date.unwrap() > date(2025, 10, 1));
    }

    #[test]
    fn empty_history_yields_no_forecasts_and_no_failures() {
        let input = ForecastInput::new(ProfileId::new(), QueryId::new(), WeeklySeries::empty());
        let report = engine_on(date(2025, 10, 1)).report(&input);
        assert!(report.is_complete());
        assert!(report.items.rates.is_none());
        assert!(report.items.weighted.is_none());
        assert!(report.items.burndown.is_none());
        assert!(report.items.pert_completion_date.is_none());
    }

    #[test]
    fn failing_metric_is_isolated() {
        let input = input().with_remaining(f64::NAN, 80.0);
        let report = engine_on(date(2025, 10, 1)).report(&input);

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].metric, "items.rates");
        // Other item metrics and the whole points side still compute.
        assert!(report.items.weighted.is_some());
        assert!(report.points.rates.is_some());
    }

    #[test]
    fn budget_and_categories_are_included() {
        let created = Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap();
        let ledger = BudgetLedger::new(BudgetConfiguration::new(20, 10_000.0, 200_000.0, created), vec![]).unwrap();
        let mut counts = BTreeMap::new();
        counts.insert(WorkCategory::Feature, 6);
        counts.insert(WorkCategory::Defect, 2);
        let categories = vec![CategorySnapshot {
            week_label: "2025-W39".parse().unwrap(),
            counts,
        }];
        let input = input().with_budget(BudgetInput {
            ledger,
            unit: WorkUnit::Items,
            categories,
        });

        let report = engine_on(date(2025, 10, 1)).report(&input);
        assert!(report.is_complete(), "{:?}", report.failures);
        let budget = report.budget.as_ref().unwrap();
        assert!(budget.velocity > 0.0);
        assert_eq!(report.category_costs.as_ref().unwrap().len(), WorkCategory::ALL.len());
    }

    #[test]
    fn cache_serves_until_refreshed() {
        let cache = Arc::new(ReportCache::new());
        let engine = engine_on(date(2025, 10, 1)).with_cache(Arc::clone(&cache));
        let input = input();

        let first = engine.report(&input);
        assert_eq!(cache.len(), 1);
        let second = engine.report(&input);
        assert_eq!(first, second);

        let refreshed = engine.refresh(&input.clone().with_remaining(0.0, 0.0));
        assert_eq!(cache.len(), 1);
        assert_eq!(refreshed.items.remaining, 0.0);
    }

    #[test]
    fn cached_report_follows_the_day() {
        let cache = Arc::new(ReportCache::new());
        let input = input();

        let monday = engine_on(date(2025, 9, 29)).with_cache(Arc::clone(&cache));
        let early = monday.report(&input);
        assert_eq!(early.as_of, date(2025, 9, 29));

        let sunday = engine_on(date(2025, 10, 5)).with_cache(Arc::clone(&cache));
        let late = sunday.report(&input);
        assert_eq!(late.as_of, date(2025, 10, 5));
        assert_eq!(late.as_of_week(), early.as_of_week());
        // By Sunday the blend is the actual.
        assert_eq!(late.items.current_week_blend, Some(7.0));
        assert_eq!(late, engine_on(date(2025, 10, 5)).report(&input));

        // Monday's entry was evicted by Sunday's.
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn oversized_windows_use_all_history() {
        let settings = AnalyticsSettings::default()
            .with_history_weeks(u32::MAX)
            .with_budget_policy(BudgetPolicy {
                velocity_window: u32::MAX,
                ..BudgetPolicy::default()
            });
        assert!(settings.validate().is_ok());
        let engine = AnalyticsEngine::new(settings, Arc::new(FixedClock::on(date(2025, 10, 1)))).unwrap();

        let created = Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap();
        let ledger = BudgetLedger::new(BudgetConfiguration::new(20, 10_000.0, 200_000.0, created), vec![]).unwrap();
        let input = input().with_budget(BudgetInput {
            ledger,
            unit: WorkUnit::Items,
            categories: vec![],
        });

        let report = engine.report(&input);
        assert!(report.is_complete(), "{:?}", report.failures);
        let unbounded = engine_on(date(2025, 10, 1)).report(&input);
        assert_eq!(report.items.weighted, unbounded.items.weighted);
        assert_eq!(report.items.rates, unbounded.items.rates);
        assert!(report.budget.unwrap().velocity > 0.0);
    }

    #[test]
    fn batch_snapshots_keep_going_past_errors() {
        let created = Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap();
        let ledger = BudgetLedger::new(BudgetConfiguration::new(20, 10_000.0, 200_000.0, created), vec![]).unwrap();
        let engine = AnalyticsEngine::new(
            AnalyticsSettings::default(),
            Arc::new(FixedClock::on(date(2025, 10, 1))),
        )
        .unwrap();
        let weeks: Vec<WeekLabel> = ["2025-W37", "2025-W38", "2025-W39"]
            .iter()
            .map(|w| w.parse().unwrap())
            .collect();

        let snapshots = engine.budget_snapshots(&ledger, &series(), WorkUnit::Items, &weeks);
        assert_eq!(snapshots.len(), 3);
        assert!(snapshots.iter().all(|(_, s)| s.is_ok()));
        assert_eq!(snapshots[2].0, weeks[2]);
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let settings = AnalyticsSettings::default().with_pert_factor(0);
        assert!(AnalyticsEngine::new(settings, Arc::new(FixedClock::on(date(2025, 10, 1)))).is_err());
    }

    #[test]
    fn span_is_at_least_a_week() {
        assert_eq!(history_span_days(&WeeklySeries::empty()), 7);
        assert_eq!(history_span_days(&series()), 35);
    }

    #[test]
    fn completion_date_ignores_infinite_estimates() {
        assert_eq!(date_after_weeks(date(2025, 10, 1), f64::INFINITY), None);
        assert_eq!(date_after_weeks(date(2025, 10, 1), 1.0), Some(date(2025, 10, 8)));
    }

    proptest::proptest! {
        #[test]
        fn any_history_yields_a_capped_report(
            weekly in proptest::collection::vec(0u32..40, 0..30),
            remaining in 0.0f64..500.0,
        ) {
            let start = date(2025, 1, 6);
            let records: Vec<ActivityRecord> = weekly
                .iter()
                .enumerate()
                .map(|(i, n)| ActivityRecord::completed(start + Days::new(7 * i as u64), *n, f64::from(*n)))
                .collect();
            let series = ThroughputAggregator::new().aggregate(&records).unwrap();
            let input = ForecastInput::new(ProfileId::new(), QueryId::new(), series)
                .with_remaining(remaining, remaining);

            let report = engine_on(date(2025, 10, 1)).report(&input);
            proptest::prop_assert!(report.is_complete());
            for set in [&report.items.burndown, &report.items.burnup].into_iter().flatten() {
                for line in &set.series {
                    proptest::prop_assert!(line.len() <= 100);
                    proptest::prop_assert!(line.days_to_target <= 730.0);
                }
            }
        }
    }
}
