//! Budget tracking over an append-only revision ledger.
//!
//! Pure domain logic only: the ledger replays revisions onto a base
//! configuration, and consumption / burn rate / runway / variance are derived
//! from it together with the weekly throughput series. No IO, no persistence.

pub mod category;
pub mod config;
pub mod ledger;
pub mod metrics;
pub mod revision;
pub mod snapshot;
pub mod variance;

pub use category::{CategoryCost, CategorySnapshot, WorkCategory, cost_breakdown_by_category};
pub use config::BudgetConfiguration;
pub use ledger::BudgetLedger;
pub use metrics::{Consumption, Runway, runway_weeks};
pub use revision::BudgetRevision;
pub use snapshot::{BudgetPolicy, BudgetSnapshot};
pub use variance::{BudgetVariance, HealthTier, Polarity, tier_for};
