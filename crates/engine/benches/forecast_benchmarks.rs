use std::hint::black_box;
use std::sync::Arc;

use criterion::{Criterion, criterion_group, criterion_main};

use burnwise_core::{FixedClock, ProfileId, QueryId};
use burnwise_engine::{AnalyticsEngine, AnalyticsSettings, ForecastInput};
use burnwise_forecast::{ProjectionGenerator, ProjectionMode, ProjectionRequest, Scenario};
use burnwise_throughput::{ActivityRecord, ThroughputAggregator, WeeklySeries};
use chrono::{Days, NaiveDate};

fn two_years_of_activity() -> Vec<ActivityRecord> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    (0..730u64)
        .map(|d| {
            let items = (d % 5) as u32;
            ActivityRecord::completed(start + Days::new(d), items, f64::from(items) * 1.5)
        })
        .collect()
}

fn series() -> WeeklySeries {
    ThroughputAggregator::new()
        .aggregate(&two_years_of_activity())
        .unwrap()
}

fn bench_aggregate(c: &mut Criterion) {
    let records = two_years_of_activity();
    let aggregator = ThroughputAggregator::new();
    c.bench_function("aggregate_two_years", |b| {
        b.iter(|| aggregator.aggregate(black_box(&records)).unwrap())
    });
}

fn bench_projection(c: &mut Criterion) {
    let generator = ProjectionGenerator::default();
    let request = ProjectionRequest {
        mode: ProjectionMode::Burndown,
        scenario: Scenario::Average,
        start_date: NaiveDate::from_ymd_opt(2025, 10, 15).unwrap(),
        start_value: 5_000.0,
        scope: 5_000.0,
        daily_rate: 3.0,
        span_days: 180,
    };
    c.bench_function("projection_capped_line", |b| {
        b.iter(|| generator.generate(black_box(&request)).unwrap())
    });
}

fn bench_report(c: &mut Criterion) {
    let clock = Arc::new(FixedClock::on(NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()));
    let engine = AnalyticsEngine::new(AnalyticsSettings::default(), clock).unwrap();
    let input = ForecastInput::new(ProfileId::new(), QueryId::new(), series()).with_remaining(400.0, 600.0);
    c.bench_function("uncached_report", |b| b.iter(|| engine.report(black_box(&input))));
}

criterion_group!(benches, bench_aggregate, bench_projection, bench_report);
criterion_main!(benches);
