//! Panel flavor configuration
//!
//! Both panel flavors run the same component code; a [`PanelConfig`] carries
//! what differs between them: the feature base for subtree endpoints,
//! whether a successful create is announced to other panels, and the
//! default form tab. URL composition lives in [`Endpoints`] so every view
//! builds its addresses the same way.

use std::path::Path;

use serde::Deserialize;

use replipanel_core::prelude::*;
use replipanel_core::ConfigEntry;

use crate::profile::DEFAULT_TAB;

/// Base for type-derived node views and dialogs, shared by both flavors.
pub const DEFAULT_VIEW_BASE: &str = "/libs";

/// Configuration of one panel flavor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Feature mount for subtree endpoints (setup reload, create, delete,
    /// empty form)
    pub base_path: String,
    /// Base for type-derived node view and dialog URLs
    pub view_base: String,
    /// Whether a successful create announces the owning site on the bus
    pub cross_panel_notify: bool,
    /// Tab shown when the profile holds no preference for the subtree
    pub default_tab: String,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self::config_tree()
    }
}

impl PanelConfig {
    /// The configuration console flavor: quiet, refreshes only itself.
    pub fn config_tree() -> Self {
        Self {
            base_path: "/libs/platform/replication/config".to_string(),
            view_base: DEFAULT_VIEW_BASE.to_string(),
            cross_panel_notify: false,
            default_tab: DEFAULT_TAB.to_string(),
        }
    }

    /// The site console flavor: announces created entries to other panels.
    pub fn replication_tree() -> Self {
        Self {
            base_path: "/libs/platform/replication".to_string(),
            view_base: DEFAULT_VIEW_BASE.to_string(),
            cross_panel_notify: true,
            default_tab: DEFAULT_TAB.to_string(),
        }
    }

    /// Load a panel configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints::new(self.clone())
    }
}

/// URL composition for one panel flavor.
///
/// Subtree operations hang off the flavor's `base_path`; per-entry views
/// and dialogs are derived from the entry's implementation type under
/// `view_base`.
#[derive(Debug, Clone)]
pub struct Endpoints {
    config: PanelConfig,
}

impl Endpoints {
    pub fn new(config: PanelConfig) -> Self {
        Self { config }
    }

    /// `{base}/setup.reload.html{path}` - full subtree fragment
    pub fn setup_reload(&self, subtree_path: &str) -> String {
        format!("{}/setup.reload.html{}", self.config.base_path, subtree_path)
    }

    /// `{base}/node.create.html{path}` - create dialog for a collection
    pub fn node_create(&self, subtree_path: &str) -> String {
        format!("{}/node.create.html{}", self.config.base_path, subtree_path)
    }

    /// `{base}/node.delete.html{path}` - delete confirmation for an entry
    pub fn node_delete(&self, entry_path: &str) -> String {
        format!("{}/node.delete.html{}", self.config.base_path, entry_path)
    }

    /// `{base}/{type}.empty.html{path}` - unfilled form body for a type
    pub fn empty_form(&self, entry_type: &str, subtree_path: &str) -> String {
        format!(
            "{}/{}.empty.html{}",
            self.config.base_path, entry_type, subtree_path
        )
    }

    /// `{view_base}/{type}.reload.html{path}` - one entry's display fragment
    pub fn node_reload(&self, entry: &ConfigEntry) -> String {
        format!(
            "{}/{}.reload.html{}",
            self.config.view_base, entry.entry_type, entry.path
        )
    }

    /// `{view_base}/{type}.dialog.html{path}` - one entry's edit dialog
    pub fn node_dialog(&self, entry: &ConfigEntry) -> String {
        format!(
            "{}/{}.dialog.html{}",
            self.config.view_base, entry.entry_type, entry.path
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_dialog_url_is_type_derived() {
        let endpoints = PanelConfig::config_tree().endpoints();
        let entry = ConfigEntry::new("/conf/x/replication/y", "remote");
        assert_eq!(
            endpoints.node_dialog(&entry),
            "/libs/remote.dialog.html/conf/x/replication/y"
        );
    }

    #[test]
    fn test_node_reload_url_is_type_derived() {
        let endpoints = PanelConfig::config_tree().endpoints();
        let entry = ConfigEntry::new("/conf/x/replication/y", "inplace");
        assert_eq!(
            endpoints.node_reload(&entry),
            "/libs/inplace.reload.html/conf/x/replication/y"
        );
    }

    #[test]
    fn test_subtree_urls_use_feature_base() {
        let endpoints = PanelConfig::config_tree().endpoints();
        assert_eq!(
            endpoints.setup_reload("/conf/site1/replication"),
            "/libs/platform/replication/config/setup.reload.html/conf/site1/replication"
        );
        assert_eq!(
            endpoints.node_create("/conf/site1/replication"),
            "/libs/platform/replication/config/node.create.html/conf/site1/replication"
        );
        assert_eq!(
            endpoints.node_delete("/conf/site1/replication/a"),
            "/libs/platform/replication/config/node.delete.html/conf/site1/replication/a"
        );
        assert_eq!(
            endpoints.empty_form("remote", "/conf/site1/replication"),
            "/libs/platform/replication/config/remote.empty.html/conf/site1/replication"
        );
    }

    #[test]
    fn test_flavors_differ_in_base_and_notification() {
        let config = PanelConfig::config_tree();
        let site = PanelConfig::replication_tree();
        assert!(!config.cross_panel_notify);
        assert!(site.cross_panel_notify);
        assert_ne!(config.base_path, site.base_path);
        assert_eq!(config.view_base, site.view_base);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: PanelConfig =
            toml::from_str(r#"base_path = "/libs/custom""#).unwrap();
        assert_eq!(config.base_path, "/libs/custom");
        assert_eq!(config.view_base, DEFAULT_VIEW_BASE);
        assert_eq!(config.default_tab, DEFAULT_TAB);
        assert!(!config.cross_panel_notify);
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let result = PanelConfig::load(&temp_dir.path().join("absent.toml"));
        assert!(matches!(result, Err(Error::ConfigNotFound { .. })));
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("panel.toml");
        std::fs::write(
            &path,
            "base_path = \"/libs/platform/replication\"\ncross_panel_notify = true\n",
        )
        .unwrap();

        let config = PanelConfig::load(&path).unwrap();
        assert_eq!(config, PanelConfig::replication_tree());
    }
}
