//! Consumption, burn rate and runway.

use serde::{Deserialize, Serialize};

use burnwise_core::{DomainError, DomainResult, WeekLabel, WorkUnit};
use burnwise_forecast::{RECENCY_WEIGHTS, RateEstimator, truncated_recency_weights, weighted_average};
use burnwise_throughput::WeeklySeries;

use crate::ledger::BudgetLedger;

/// Weeks of budget left at `burn_rate`. No burn means unlimited runway.
pub fn runway_weeks(budget_total: f64, consumed: f64, burn_rate: f64) -> f64 {
    if burn_rate <= 0.0 {
        return f64::INFINITY;
    }
    ((budget_total - consumed) / burn_rate).max(0.0)
}

/// Money spent so far, derived from completed work and velocity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consumption {
    pub week_label: WeekLabel,
    pub unit: WorkUnit,
    /// Most-likely weekly rate over the trailing velocity window.
    pub velocity: f64,
    pub cost_per_unit: f64,
    /// Completed work from the budget's start week through `week_label`.
    pub completed_to_date: f64,
    pub consumed_amount: f64,
    pub consumed_pct: f64,
    pub budget_total: f64,
}

impl Consumption {
    pub fn remaining_amount(&self) -> f64 {
        self.budget_total - self.consumed_amount
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Runway {
    pub week_label: WeekLabel,
    /// Recency-weighted weekly spend.
    pub burn_rate: f64,
    pub runway_weeks: f64,
    /// Spend per week over the burn window, oldest first.
    pub weekly_costs: Vec<f64>,
}

impl BudgetLedger {
    /// Consumption as of `week`.
    ///
    /// `velocity_window` is the trailing window (in weeks) the most-likely
    /// rate is taken over.
    pub fn consumption(
        &self,
        week: WeekLabel,
        series: &WeeklySeries,
        unit: WorkUnit,
        velocity_window: u32,
    ) -> DomainResult<Consumption> {
        if velocity_window == 0 {
            return Err(DomainError::validation("velocity window must be at least 1 week"));
        }

        let budget = self.budget_at(week);
        let history = series.up_to(week);

        let velocity = RateEstimator::default()
            .estimate(&history.trailing(velocity_window), unit, 0.0)?
            .map(|e| e.most_likely_rate)
            .unwrap_or(0.0);

        let cost_per_unit = if velocity > 0.0 {
            budget.team_cost_per_period / velocity
        } else {
            0.0
        };

        let completed_to_date = history.since(budget.start_week()).total_completed(unit);
        let consumed_amount = completed_to_date * cost_per_unit;
        let consumed_pct = if budget.budget_total > 0.0 {
            consumed_amount / budget.budget_total * 100.0
        } else {
            0.0
        };

        Ok(Consumption {
            week_label: week,
            unit,
            velocity,
            cost_per_unit,
            completed_to_date,
            consumed_amount,
            consumed_pct,
            budget_total: budget.budget_total,
        })
    }

    /// Burn rate and runway as of `week`.
    ///
    /// `burn_window` (1..=4) selects how many trailing weeks of spend feed the
    /// weighted burn rate.
    pub fn runway(
        &self,
        week: WeekLabel,
        series: &WeeklySeries,
        unit: WorkUnit,
        velocity_window: u32,
        burn_window: usize,
    ) -> DomainResult<Runway> {
        let consumption = self.consumption(week, series, unit, velocity_window)?;
        self.runway_from(&consumption, series, burn_window)
    }

    pub(crate) fn runway_from(
        &self,
        consumption: &Consumption,
        series: &WeeklySeries,
        burn_window: usize,
    ) -> DomainResult<Runway> {
        if burn_window == 0 || burn_window > RECENCY_WEIGHTS.len() {
            return Err(DomainError::validation(format!(
                "burn window must be between 1 and {} weeks (got {burn_window})",
                RECENCY_WEIGHTS.len()
            )));
        }

        let start_week = self.budget_at(consumption.week_label).start_week();
        let window = series
            .up_to(consumption.week_label)
            .since(start_week)
            .trailing(burn_window as u32);
        let weekly_costs: Vec<f64> = window
            .values(consumption.unit)
            .iter()
            .map(|v| v * consumption.cost_per_unit)
            .collect();

        let burn_rate = if weekly_costs.is_empty() {
            0.0
        } else {
            weighted_average(&weekly_costs, &truncated_recency_weights(weekly_costs.len()))
        };

        Ok(Runway {
            week_label: consumption.week_label,
            burn_rate,
            runway_weeks: runway_weeks(consumption.budget_total, consumption.consumed_amount, burn_rate),
            weekly_costs,
        })
    }
}
