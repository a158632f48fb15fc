//! Comparing actuals against a forecast, and forecast load ranges.

use serde::{Deserialize, Serialize};

use burnwise_core::{DomainError, DomainResult, ensure_non_negative};

/// Deviation (in percent) inside which a metric counts as on track.
const NEUTRAL_BAND_PCT: f64 = 5.0;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricDirection {
    /// Throughput, velocity: more is better.
    HigherBetter,
    /// Cycle time, WIP, load: less is better.
    LowerBetter,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendArrow {
    Up,
    Down,
    Flat,
}

impl TrendArrow {
    pub fn symbol(&self) -> &'static str {
        match self {
            TrendArrow::Up => "↗",
            TrendArrow::Down => "↘",
            TrendArrow::Flat => "→",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendComparison {
    /// `None` when the forecast was zero and no ratio exists.
    pub deviation_percent: Option<f64>,
    pub direction: TrendArrow,
    pub is_good: bool,
    pub status_text: String,
}

pub fn trend_vs_forecast(
    current: f64,
    forecast: f64,
    metric: MetricDirection,
) -> DomainResult<TrendComparison> {
    ensure_non_negative(&[current, forecast], "trend inputs")?;

    if forecast == 0.0 {
        return Ok(zero_baseline(current, metric));
    }

    let deviation = (current - forecast) / forecast * 100.0;
    let direction = if deviation > NEUTRAL_BAND_PCT {
        TrendArrow::Up
    } else if deviation < -NEUTRAL_BAND_PCT {
        TrendArrow::Down
    } else {
        TrendArrow::Flat
    };
    let is_good = match metric {
        MetricDirection::HigherBetter => deviation >= -NEUTRAL_BAND_PCT,
        MetricDirection::LowerBetter => deviation <= NEUTRAL_BAND_PCT,
    };
    let status_text = match direction {
        TrendArrow::Flat => "On track with forecast".to_string(),
        TrendArrow::Up => format!("{deviation:.1}% above forecast"),
        TrendArrow::Down => format!("{:.1}% below forecast", deviation.abs()),
    };

    Ok(TrendComparison {
        deviation_percent: Some(deviation),
        direction,
        is_good,
        status_text,
    })
}

fn zero_baseline(current: f64, metric: MetricDirection) -> TrendComparison {
    if current == 0.0 {
        return TrendComparison {
            deviation_percent: None,
            direction: TrendArrow::Flat,
            is_good: true,
            status_text: "No activity forecast or recorded".to_string(),
        };
    }
    TrendComparison {
        deviation_percent: None,
        direction: TrendArrow::Up,
        is_good: metric == MetricDirection::HigherBetter,
        status_text: "Activity recorded against a zero forecast".to_string(),
    }
}

/// Expected band around a forecast value.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadRange {
    pub lower: f64,
    pub upper: f64,
}

/// `forecast_value × (1 ± range_percent)`.
pub fn flow_load_range(forecast_value: f64, range_percent: f64) -> DomainResult<LoadRange> {
    if !(0.0..=1.0).contains(&range_percent) {
        return Err(DomainError::validation(format!(
            "range_percent must be within [0, 1] (got {range_percent})"
        )));
    }
    if !forecast_value.is_finite() || forecast_value <= 0.0 {
        return Err(DomainError::validation(format!(
            "range base must be positive (got {forecast_value})"
        )));
    }
    let delta = forecast_value * range_percent;
    Ok(LoadRange {
        lower: forecast_value - delta,
        upper: forecast_value + delta,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn above_forecast_for_higher_better_is_good() {
        let t = trend_vs_forecast(16.0, 13.0, MetricDirection::HigherBetter).unwrap();
        let dev = t.deviation_percent.unwrap();
        assert!((dev - 23.1).abs() < 0.05);
        assert_eq!(t.direction.symbol(), "↗");
        assert!(t.is_good);
    }

    #[test]
    fn above_forecast_for_lower_better_is_bad() {
        let t = trend_vs_forecast(16.0, 13.0, MetricDirection::LowerBetter).unwrap();
        assert!(!t.is_good);
    }

    #[test]
    fn small_deviation_is_flat() {
        let t = trend_vs_forecast(10.2, 10.0, MetricDirection::HigherBetter).unwrap();
        assert_eq!(t.direction, TrendArrow::Flat);
        assert!(t.is_good);
    }

    #[test]
    fn drop_is_down_and_bad_for_throughput() {
        let t = trend_vs_forecast(5.0, 10.0, MetricDirection::HigherBetter).unwrap();
        assert_eq!(t.direction.symbol(), "↘");
        assert!(!t.is_good);
        assert_eq!(t.status_text, "50.0% below forecast");
    }

    #[test]
    fn zero_forecast_uses_fixed_messages() {
        let t = trend_vs_forecast(0.0, 0.0, MetricDirection::HigherBetter).unwrap();
        assert_eq!(t.deviation_percent, None);
        assert_eq!(t.direction, TrendArrow::Flat);

        let t = trend_vs_forecast(3.0, 0.0, MetricDirection::LowerBetter).unwrap();
        assert_eq!(t.deviation_percent, None);
        assert_eq!(t.direction, TrendArrow::Up);
        assert!(!t.is_good);
    }

    #[test]
    fn load_range_around_forecast() {
        let r = flow_load_range(15.0, 0.20).unwrap();
        assert!((r.lower - 12.0).abs() < 1e-9);
        assert!((r.upper - 18.0).abs() < 1e-9);
    }

    #[test]
    fn load_range_rejects_bad_inputs() {
        assert!(flow_load_range(15.0, 1.5).is_err());
        assert!(flow_load_range(15.0, -0.1).is_err());
        assert!(flow_load_range(0.0, 0.2).is_err());
        assert!(flow_load_range(-3.0, 0.2).is_err());
        assert!(flow_load_range(15.0, f64::NAN).is_err());
    }
}
