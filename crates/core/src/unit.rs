//! Units of work.

use serde::{Deserialize, Serialize};

/// What a rate or count is measured in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkUnit {
    Items,
    Points,
}

impl WorkUnit {
    pub const ALL: [WorkUnit; 2] = [WorkUnit::Items, WorkUnit::Points];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkUnit::Items => "items",
            WorkUnit::Points => "points",
        }
    }
}

impl core::fmt::Display for WorkUnit {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
