//! Site derivation for cross-panel notifications
//!
//! A configuration entry lives somewhere below a site's `/conf` subtree,
//! e.g. `/conf/site1/replication/publish`. Panels that announce a change
//! publish the owning site path so unrelated consoles showing the same
//! site can refresh themselves.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Matches a configuration path and captures the site path: everything up
/// to (but not including) the last `/replication` segment.
static SITE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(/conf(?:/.*)?)/replication(?:/.*)?$").expect("valid site pattern"));

/// Payload announced when a site's replication configuration changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteChange {
    /// The `/conf/...` subtree owning the changed entry
    pub site_path: String,
    /// The collection path the change happened under
    pub config_path: String,
}

impl SiteChange {
    pub fn new(site_path: impl Into<String>, config_path: impl Into<String>) -> Self {
        Self {
            site_path: site_path.into(),
            config_path: config_path.into(),
        }
    }
}

/// Derive the owning site path from a configuration path.
///
/// Returns `None` when the path does not sit below a `/conf` subtree with
/// a `/replication` segment; callers log and skip the notification then.
pub fn derive_site_path(config_path: &str) -> Option<String> {
    SITE_PATTERN
        .captures(config_path)
        .map(|caps| caps[1].to_string())
}

/// Build the [`SiteChange`] payload for a collection path, if derivable.
pub fn site_change_for(config_path: &str) -> Option<SiteChange> {
    derive_site_path(config_path).map(|site_path| SiteChange::new(site_path, config_path))
}
