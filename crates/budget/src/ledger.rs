//! Revision replay.
//!
//! The ledger keeps the *base* configuration (as first saved) and the ordered
//! revision log. The current configuration is never stored independently: it
//! is the fold of every revision onto the base, so
//! `budget_at(latest_week) == current_budget()` holds by construction and a
//! delta can never be applied twice.

use std::collections::HashSet;

use burnwise_core::{DomainError, DomainResult, WeekLabel};

use crate::config::BudgetConfiguration;
use crate::revision::BudgetRevision;

/// Money tolerance when checking a persisted "current" configuration against
/// the replayed one.
const RECONCILE_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq)]
pub struct BudgetLedger {
    base: BudgetConfiguration,
    revisions: Vec<BudgetRevision>,
    current: BudgetConfiguration,
}

impl BudgetLedger {
    /// Build from the base configuration and its revisions (any order).
    ///
    /// Revisions are sorted by week; revisions within the same week keep
    /// their given order. Duplicate revision ids are rejected.
    pub fn new(base: BudgetConfiguration, mut revisions: Vec<BudgetRevision>) -> DomainResult<Self> {
        base.validate()?;

        let mut seen = HashSet::with_capacity(revisions.len());
        for r in &revisions {
            r.validate()?;
            if !seen.insert(r.revision_id) {
                return Err(DomainError::validation(format!(
                    "revision {} appears more than once",
                    r.revision_id
                )));
            }
        }
        revisions.sort_by_key(|r| r.week_label);

        let current = replay(&base, revisions.iter());
        current.validate()?;

        Ok(Self {
            base,
            revisions,
            current,
        })
    }

    /// Build from a persisted *current* configuration that already includes
    /// every revision. The base is recovered by removing all deltas.
    pub fn from_current(
        current: BudgetConfiguration,
        revisions: Vec<BudgetRevision>,
    ) -> DomainResult<Self> {
        let base = revisions.iter().fold(current.clone(), |c, r| c.reverted(r));
        let ledger = Self::new(base, revisions)?;
        ledger.reconcile(&current)?;
        Ok(ledger)
    }

    pub fn base(&self) -> &BudgetConfiguration {
        &self.base
    }

    pub fn revisions(&self) -> &[BudgetRevision] {
        &self.revisions
    }

    pub fn latest_week(&self) -> Option<WeekLabel> {
        self.revisions.last().map(|r| r.week_label)
    }

    /// The configuration with every revision applied.
    pub fn current_budget(&self) -> &BudgetConfiguration {
        &self.current
    }

    /// The configuration as of `week`: base plus every revision with
    /// `week_label <= week`, in order.
    pub fn budget_at(&self, week: WeekLabel) -> BudgetConfiguration {
        replay(
            &self.base,
            self.revisions.iter().take_while(|r| r.week_label <= week),
        )
    }

    /// Append a revision.
    ///
    /// Returns `Ok(false)` if the identical revision is already recorded, so
    /// redelivery is harmless. A revision older than the latest recorded week,
    /// or reusing an id with different content, is rejected.
    pub fn append(&mut self, revision: BudgetRevision) -> DomainResult<bool> {
        revision.validate()?;

        if let Some(existing) = self
            .revisions
            .iter()
            .find(|r| r.revision_id == revision.revision_id)
        {
            if *existing == revision {
                return Ok(false);
            }
            return Err(DomainError::invariant(format!(
                "revision {} already recorded with different content",
                revision.revision_id
            )));
        }

        if let Some(latest) = self.latest_week() {
            if revision.week_label < latest {
                return Err(DomainError::validation(format!(
                    "revision for {} is older than latest recorded week {latest}",
                    revision.week_label
                )));
            }
        }

        let next = self.current.applied(&revision);
        next.validate()?;

        tracing::debug!(
            revision_id = %revision.revision_id,
            week = %revision.week_label,
            budget_total = next.budget_total,
            "applied budget revision"
        );

        self.current = next;
        self.revisions.push(revision);
        Ok(true)
    }

    /// Check a separately persisted "current" configuration against replay.
    pub fn reconcile(&self, persisted: &BudgetConfiguration) -> DomainResult<()> {
        if self.current.approx_eq(persisted, RECONCILE_TOLERANCE) {
            return Ok(());
        }
        Err(DomainError::invariant(format!(
            "persisted budget (total {}, team cost {}, weeks {}) disagrees with revision replay (total {}, team cost {}, weeks {})",
            persisted.budget_total,
            persisted.team_cost_per_period,
            persisted.time_allocated_weeks,
            self.current.budget_total,
            self.current.team_cost_per_period,
            self.current.time_allocated_weeks,
        )))
    }
}

fn replay<'a>(
    base: &BudgetConfiguration,
    revisions: impl Iterator<Item = &'a BudgetRevision>,
) -> BudgetConfiguration {
    revisions.fold(base.clone(), |config, r| config.applied(r))
}
