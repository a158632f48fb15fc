//! Weekly throughput aggregation.
//!
//! Turns raw activity records into a gap-free weekly series and exposes the
//! trailing-window and non-zero views that the forecasting code consumes.

pub mod aggregator;
pub mod record;
pub mod series;

pub use aggregator::ThroughputAggregator;
pub use record::{ActivityRecord, WeeklyThroughputRecord};
pub use series::WeeklySeries;
