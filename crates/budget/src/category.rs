//! Cost split by work category.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use burnwise_core::{DomainError, DomainResult, WeekLabel, WorkUnit};
use burnwise_throughput::WeeklySeries;

use crate::ledger::BudgetLedger;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WorkCategory {
    Feature,
    Defect,
    TechDebt,
    Risk,
}

impl WorkCategory {
    pub const ALL: [WorkCategory; 4] = [
        WorkCategory::Feature,
        WorkCategory::Defect,
        WorkCategory::TechDebt,
        WorkCategory::Risk,
    ];
}

/// Completed-work counts per category as recorded for one week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySnapshot {
    pub week_label: WeekLabel,
    pub counts: BTreeMap<WorkCategory, u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCost {
    pub category: WorkCategory,
    pub cost: f64,
    pub count: u32,
    /// Share of the total cost, 0 when nothing was spent.
    pub percentage: f64,
}

/// Cost per category using the latest snapshot at or before `week`.
///
/// Always returns every category, in [`WorkCategory::ALL`] order; missing
/// data yields zero rows.
pub fn cost_breakdown_by_category(
    week: WeekLabel,
    snapshots: &[CategorySnapshot],
    cost_per_unit: f64,
) -> DomainResult<Vec<CategoryCost>> {
    if !cost_per_unit.is_finite() || cost_per_unit < 0.0 {
        return Err(DomainError::validation(format!(
            "cost_per_unit must be a non-negative number (got {cost_per_unit})"
        )));
    }

    let snapshot = snapshots
        .iter()
        .filter(|s| s.week_label <= week)
        .max_by_key(|s| s.week_label);

    let count_of = |c: WorkCategory| {
        snapshot
            .and_then(|s| s.counts.get(&c).copied())
            .unwrap_or(0)
    };

    let total: f64 = WorkCategory::ALL
        .iter()
        .map(|c| f64::from(count_of(*c)) * cost_per_unit)
        .sum();

    Ok(WorkCategory::ALL
        .iter()
        .map(|&category| {
            let count = count_of(category);
            let cost = f64::from(count) * cost_per_unit;
            let percentage = if total > 0.0 { cost / total * 100.0 } else { 0.0 };
            CategoryCost {
                category,
                cost,
                count,
                percentage,
            }
        })
        .collect())
}

impl BudgetLedger {
    /// Category breakdown priced at the cost per unit in effect at `week`.
    pub fn cost_breakdown_by_category(
        &self,
        week: WeekLabel,
        snapshots: &[CategorySnapshot],
        series: &WeeklySeries,
        unit: WorkUnit,
        velocity_window: u32,
    ) -> DomainResult<Vec<CategoryCost>> {
        let consumption = self.consumption(week, series, unit, velocity_window)?;
        cost_breakdown_by_category(week, snapshots, consumption.cost_per_unit)
    }
}
