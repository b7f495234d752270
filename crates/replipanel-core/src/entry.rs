//! Identity of a replication configuration entry

use serde::{Deserialize, Serialize};

/// Identity of one configuration entry: where it lives and which
/// implementation renders it.
///
/// Controllers snapshot this at construction or dialog-open time and keep
/// using the snapshot even if the panel markup is replaced underneath them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfigEntry {
    /// Repository path of the entry, e.g. `/conf/site1/replication/publish`
    pub path: String,
    /// Implementation type used to derive view and dialog URLs,
    /// e.g. `remote` or `inplace`
    pub entry_type: String,
}

impl ConfigEntry {
    pub fn new(path: impl Into<String>, entry_type: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            entry_type: entry_type.into(),
        }
    }
}

impl std::fmt::Display for ConfigEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.path, self.entry_type)
    }
}
