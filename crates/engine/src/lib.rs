//! `burnwise-engine`
//!
//! Wires aggregation, forecasting and budget tracking into per-(profile,
//! query, week) reports. The engine owns no global state: the clock and the
//! optional report cache are constructed by the caller and injected.

pub mod cache;
pub mod engine;
pub mod report;
pub mod settings;

pub use cache::{ReportCache, ReportKey};
pub use engine::{AnalyticsEngine, BudgetInput, ForecastInput};
pub use report::{ForecastReport, MetricFailure, UnitForecast};
pub use settings::AnalyticsSettings;
