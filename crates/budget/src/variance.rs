//! Variance against plan, health tiers and insights.

use serde::{Deserialize, Serialize};

use crate::config::BudgetConfiguration;
use crate::metrics::{Consumption, Runway};

/// Worst-last ordering, so the overall tier is the `max` of the metric tiers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthTier {
    Green,
    Yellow,
    Orange,
    Red,
}

impl HealthTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthTier::Green => "green",
            HealthTier::Yellow => "yellow",
            HealthTier::Orange => "orange",
            HealthTier::Red => "red",
        }
    }
}

impl core::fmt::Display for HealthTier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which direction of a variance is bad.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Polarity {
    HigherIsWorse,
    LowerIsWorse,
}

/// Bucket a signed variance (percent): `< -10` green, `< 10` yellow,
/// `< 25` orange, else red. Lower-is-worse metrics are mirrored first.
pub fn tier_for(variance_pct: f64, polarity: Polarity) -> HealthTier {
    let signed = match polarity {
        Polarity::HigherIsWorse => variance_pct,
        Polarity::LowerIsWorse => -variance_pct,
    };
    if signed < -10.0 {
        HealthTier::Green
    } else if signed < 10.0 {
        HealthTier::Yellow
    } else if signed < 25.0 {
        HealthTier::Orange
    } else {
        HealthTier::Red
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetVariance {
    pub elapsed_weeks: f64,
    pub weeks_remaining: f64,
    pub elapsed_pct: f64,
    /// `consumed_pct - elapsed_pct`; positive means spending ahead of schedule.
    pub utilization_vs_pace: f64,
    pub burn_rate_variance_pct: Option<f64>,
    pub runway_vs_baseline_pct: Option<f64>,
    pub cost_per_unit_variance_pct: Option<f64>,
    pub utilization_tier: HealthTier,
    pub burn_rate_tier: Option<HealthTier>,
    pub runway_tier: Option<HealthTier>,
    pub cost_per_unit_tier: Option<HealthTier>,
    /// Worst of the utilisation, burn-rate and runway tiers.
    pub health_tier: HealthTier,
}

impl BudgetVariance {
    pub fn compute(budget: &BudgetConfiguration, consumption: &Consumption, runway: &Runway) -> Self {
        let allocated = budget.time_allocated_weeks as f64;
        let elapsed_weeks = (budget.start_week().weeks_until(consumption.week_label) + 1).max(0) as f64;
        let weeks_remaining = (allocated - elapsed_weeks).max(0.0);
        let elapsed_pct = if allocated > 0.0 {
            elapsed_weeks / allocated * 100.0
        } else {
            0.0
        };

        let utilization_vs_pace = consumption.consumed_pct - elapsed_pct;

        let burn_rate_variance_pct = (budget.team_cost_per_period > 0.0).then(|| {
            (runway.burn_rate - budget.team_cost_per_period) / budget.team_cost_per_period * 100.0
        });

        let runway_vs_baseline_pct =
            (allocated > 0.0).then(|| (runway.runway_weeks - weeks_remaining) / allocated * 100.0);

        let baseline_velocity = budget.baseline_velocity(consumption.unit);
        let cost_per_unit_variance_pct = (baseline_velocity > 0.0
            && budget.team_cost_per_period > 0.0
            && consumption.velocity > 0.0)
            .then(|| {
                let baseline_cost = budget.team_cost_per_period / baseline_velocity;
                (consumption.cost_per_unit - baseline_cost) / baseline_cost * 100.0
            });

        let utilization_tier = tier_for(utilization_vs_pace, Polarity::HigherIsWorse);
        let burn_rate_tier = burn_rate_variance_pct.map(|v| tier_for(v, Polarity::HigherIsWorse));
        let runway_tier = runway_vs_baseline_pct.map(|v| tier_for(v, Polarity::LowerIsWorse));
        let cost_per_unit_tier =
            cost_per_unit_variance_pct.map(|v| tier_for(v, Polarity::HigherIsWorse));

        let health_tier = [Some(utilization_tier), burn_rate_tier, runway_tier]
            .into_iter()
            .flatten()
            .max()
            .unwrap_or(HealthTier::Green);

        Self {
            elapsed_weeks,
            weeks_remaining,
            elapsed_pct,
            utilization_vs_pace,
            burn_rate_variance_pct,
            runway_vs_baseline_pct,
            cost_per_unit_variance_pct,
            utilization_tier,
            burn_rate_tier,
            runway_tier,
            cost_per_unit_tier,
            health_tier,
        }
    }

    /// Human-readable notes for every variance beyond `materiality_pct`.
    pub fn insights(
        &self,
        budget: &BudgetConfiguration,
        consumption: &Consumption,
        runway: &Runway,
        materiality_pct: f64,
    ) -> Vec<String> {
        let currency = &budget.currency_symbol;
        let mut out = Vec::new();

        if consumption.budget_total > 0.0 && consumption.consumed_amount >= consumption.budget_total {
            out.push(format!(
                "Budget exhausted: {currency}{:.0} consumed of {currency}{:.0}",
                consumption.consumed_amount, consumption.budget_total
            ));
        }

        if self.utilization_vs_pace.abs() > materiality_pct {
            let side = if self.utilization_vs_pace > 0.0 { "ahead of" } else { "behind" };
            out.push(format!(
                "Spending is {:.1} points {side} schedule ({:.1}% consumed vs {:.1}% of time elapsed)",
                self.utilization_vs_pace.abs(),
                consumption.consumed_pct,
                self.elapsed_pct
            ));
        }

        if let Some(v) = self.burn_rate_variance_pct.filter(|v| v.abs() > materiality_pct) {
            let side = if v > 0.0 { "above" } else { "below" };
            out.push(format!(
                "Burn rate of {currency}{:.0}/week is {:.1}% {side} planned team cost of {currency}{:.0}/week",
                runway.burn_rate,
                v.abs(),
                budget.team_cost_per_period
            ));
        }

        if let Some(v) = self
            .runway_vs_baseline_pct
            .filter(|v| v.is_finite() && v.abs() > materiality_pct)
        {
            if v < 0.0 {
                out.push(format!(
                    "Runway of {:.1} weeks falls short of the {:.1} weeks left in the plan",
                    runway.runway_weeks, self.weeks_remaining
                ));
            } else {
                out.push(format!(
                    "Runway of {:.1} weeks exceeds the {:.1} weeks left in the plan",
                    runway.runway_weeks, self.weeks_remaining
                ));
            }
        }

        if let Some(v) = self.cost_per_unit_variance_pct.filter(|v| v.abs() > materiality_pct) {
            let side = if v > 0.0 { "above" } else { "below" };
            let noun = match consumption.unit {
                burnwise_core::WorkUnit::Items => "item",
                burnwise_core::WorkUnit::Points => "point",
            };
            out.push(format!(
                "Cost per {noun} of {currency}{:.2} is {:.1}% {side} baseline",
                consumption.cost_per_unit,
                v.abs()
            ));
        }

        out
    }
}
