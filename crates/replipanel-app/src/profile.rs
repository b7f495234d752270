//! Tab preference persistence
//!
//! The setup form remembers which tab the user viewed last, keyed by the
//! configuration subtree, and restores it on the next mount. The store is
//! process-wide key/value: [`MemoryProfile`] for embedders and tests,
//! [`FileProfile`] for persistence across restarts.

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::RwLock;

use fs2::FileExt;

use replipanel_core::prelude::*;

/// Tab shown when the profile has no stored preference.
pub const DEFAULT_TAB: &str = "path";

/// Profile key for a subtree's tab preference.
pub fn tab_key(subtree_path: &str) -> String {
    format!("setup.tab:{subtree_path}")
}

/// Process-wide preference store.
///
/// `set` is fire-and-forget: persistence failures are logged, never
/// surfaced, so a broken profile file cannot break tab switching.
pub trait ProfileStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

/// In-memory store, the default for embedders that bring no persistence.
#[derive(Debug, Default)]
pub struct MemoryProfile {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryProfile {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProfileStore for MemoryProfile {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().ok().and_then(|map| map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut map) = self.entries.write() {
            map.insert(key.to_string(), value.to_string());
        } else {
            warn!("profile map lock poisoned; dropping preference {key}");
        }
    }
}

/// TOML-backed store persisted on every write.
#[derive(Debug)]
pub struct FileProfile {
    path: PathBuf,
    entries: RwLock<HashMap<String, String>>,
}

impl FileProfile {
    /// Default profile location under the local data directory.
    pub fn default_path() -> PathBuf {
        let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        base.join("replipanel").join("profile.toml")
    }

    /// Open a profile file, loading existing preferences if present.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            toml::from_str::<HashMap<String, String>>(&content)
                .map_err(|e| Error::profile(format!("Failed to parse {}: {}", path.display(), e)))?
        } else {
            HashMap::new()
        };
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    fn persist(&self, entries: &HashMap<String, String>) -> Result<()> {
        let content = toml::to_string(entries)
            .map_err(|e| Error::profile(format!("Failed to serialize profile: {}", e)))?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::profile(format!("Failed to create profile directory: {}", e))
            })?;
        }

        // Open file with exclusive lock for concurrent write protection
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)
            .map_err(|e| Error::profile(format!("Failed to open profile file: {}", e)))?;

        // Acquire exclusive lock (blocks if another process has lock)
        file.lock_exclusive()
            .map_err(|e| Error::profile(format!("Failed to lock profile file: {}", e)))?;

        let mut file = file;
        file.write_all(content.as_bytes())
            .map_err(|e| Error::profile(format!("Failed to write profile file: {}", e)))?;
        file.flush()
            .map_err(|e| Error::profile(format!("Failed to flush profile file: {}", e)))?;

        // Lock is automatically released when file is dropped
        Ok(())
    }
}

impl ProfileStore for FileProfile {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().ok().and_then(|map| map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) {
        let snapshot = match self.entries.write() {
            Ok(mut map) => {
                map.insert(key.to_string(), value.to_string());
                map.clone()
            }
            Err(_) => {
                warn!("profile map lock poisoned; dropping preference {key}");
                return;
            }
        };
        if let Err(err) = self.persist(&snapshot) {
            warn!(
                "profile write to {} failed ({}); keeping in-memory value",
                self.path.display(),
                err
            );
        }
    }
}
