//! Point-in-time budget snapshot.

use serde::{Deserialize, Serialize};

use burnwise_core::{DomainError, DomainResult, WeekLabel, WorkUnit};
use burnwise_forecast::RECENCY_WEIGHTS;
use burnwise_throughput::WeeklySeries;

use crate::config::BudgetConfiguration;
use crate::ledger::BudgetLedger;
use crate::variance::{BudgetVariance, HealthTier};

/// Knobs for snapshot computation.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetPolicy {
    /// Trailing weeks for the velocity behind cost per unit.
    pub velocity_window: u32,
    /// Trailing weeks (1..=4) for the weighted burn rate.
    pub burn_window: usize,
    /// Variances beyond this many percent produce an insight.
    pub materiality_pct: f64,
}

impl Default for BudgetPolicy {
    fn default() -> Self {
        Self {
            velocity_window: 4,
            burn_window: 4,
            materiality_pct: 10.0,
        }
    }
}

impl BudgetPolicy {
    pub fn validate(&self) -> DomainResult<()> {
        if self.velocity_window == 0 {
            return Err(DomainError::validation("velocity_window must be at least 1"));
        }
        if self.burn_window == 0 || self.burn_window > RECENCY_WEIGHTS.len() {
            return Err(DomainError::validation(format!(
                "burn_window must be between 1 and {}",
                RECENCY_WEIGHTS.len()
            )));
        }
        if !self.materiality_pct.is_finite() || self.materiality_pct < 0.0 {
            return Err(DomainError::validation("materiality_pct must be non-negative"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetSnapshot {
    pub week_label: WeekLabel,
    pub unit: WorkUnit,
    /// Configuration in effect at `week_label`.
    pub budget: BudgetConfiguration,
    pub velocity: f64,
    pub cost_per_unit: f64,
    pub consumed_amount: f64,
    pub consumed_pct: f64,
    pub remaining_amount: f64,
    pub burn_rate: f64,
    pub runway_weeks: f64,
    pub variance: BudgetVariance,
    pub health_tier: HealthTier,
    pub insights: Vec<String>,
}

impl BudgetLedger {
    pub fn snapshot(
        &self,
        week: WeekLabel,
        series: &WeeklySeries,
        unit: WorkUnit,
        policy: &BudgetPolicy,
    ) -> DomainResult<BudgetSnapshot> {
        policy.validate()?;

        let budget = self.budget_at(week);
        let consumption = self.consumption(week, series, unit, policy.velocity_window)?;
        let runway = self.runway_from(&consumption, series, policy.burn_window)?;
        let variance = BudgetVariance::compute(&budget, &consumption, &runway);
        let insights = variance.insights(&budget, &consumption, &runway, policy.materiality_pct);

        tracing::debug!(
            week = %week,
            unit = %unit,
            consumed_pct = consumption.consumed_pct,
            burn_rate = runway.burn_rate,
            health = %variance.health_tier,
            "computed budget snapshot"
        );

        Ok(BudgetSnapshot {
            week_label: week,
            unit,
            velocity: consumption.velocity,
            cost_per_unit: consumption.cost_per_unit,
            consumed_amount: consumption.consumed_amount,
            consumed_pct: consumption.consumed_pct,
            remaining_amount: consumption.remaining_amount(),
            burn_rate: runway.burn_rate,
            runway_weeks: runway.runway_weeks,
            health_tier: variance.health_tier,
            variance,
            insights,
            budget,
        })
    }
}
