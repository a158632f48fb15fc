//! Completion forecasting.
//!
//! Pure functions only: weighted and exponentially smoothed forecasts, PERT
//! rate estimation and capped burndown/burnup projections. Inputs are
//! immutable snapshots; nothing here touches IO or a clock.

pub mod ewma;
pub mod projection;
pub mod rate;
pub mod trend;
pub mod weighted;
pub mod weights;

pub use ewma::{DEFAULT_ALPHA, EwmaForecast, EwmaForecaster, blend_current_week, current_week_weight};
pub use projection::{
    ProjectionBasis, ProjectionGenerator, ProjectionLimits, ProjectionMode, ProjectionPoint, ProjectionRequest,
    ProjectionSeries, ProjectionSet, Scenario,
};
pub use rate::{RateEstimate, RateEstimator, time_to_completion};
pub use trend::{LoadRange, MetricDirection, TrendArrow, TrendComparison, flow_load_range, trend_vs_forecast};
pub use weighted::{Confidence, ForecastResult, MAX_FORECAST_WEEKS, forecast};
pub use weights::{RECENCY_WEIGHTS, WEIGHT_TOLERANCE, default_weights, truncated_recency_weights, validate_weights, weighted_average};
