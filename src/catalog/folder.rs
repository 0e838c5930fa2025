use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A catalog folder, kept separately from the queries it holds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Folder {
    pub name: String,
    pub created_at: DateTime<Utc>,
    /// Created on purpose; survives while empty. Implicit folders vanish with their last entry.
    #[serde(default)]
    pub explicit: bool,
}

impl Folder {
    #[must_use]
    pub const fn new(name: String, created_at: DateTime<Utc>, explicit: bool) -> Self {
        Self {
            name,
            created_at,
            explicit,
        }
    }
}
