//! `burnwise-core`: shared building blocks for the analytics crates.
//!
//! Pure primitives only: errors, identifiers, ISO week labels, the clock seam.

pub mod clock;
pub mod error;
pub mod id;
pub mod unit;
pub mod week;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{DomainError, DomainResult, ensure_non_negative};
pub use id::{ProfileId, QueryId, RevisionId};
pub use unit::WorkUnit;
pub use week::WeekLabel;
