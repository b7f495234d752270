//! # replipanel-core - Core Domain Types
//!
//! Foundation crate for Replipanel. Provides entry identity, site
//! derivation, fragment scanning, error handling, and logging setup.
//!
//! This crate has **zero internal dependencies** -- it only depends on
//! external crates (serde, thiserror, regex, tracing).
//!
//! ## Public API
//!
//! ### Entry Identity (`entry`)
//! - [`ConfigEntry`] - Path plus implementation type of one configuration entry
//!
//! ### Site Derivation (`site`)
//! - [`SiteChange`] - Payload announced when a site's configuration changed
//! - [`derive_site_path()`] - Owning `/conf` subtree of a configuration path
//!
//! ### Fragment Scanning (`fragment`)
//! - [`scan_entries()`] - Per-entry wiring found in a setup fragment
//! - [`data_path()`], [`data_type()`] - Root element bindings
//! - [`TitleBinding`] - Label text and hover hint of a node fragment
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Custom error enum with `fatal` vs `recoverable` classification
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//! - [`ResultExt`] - Extension trait for adding error context
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use replipanel_core::prelude::*;
//! ```

pub mod entry;
pub mod error;
pub mod fragment;
pub mod logging;
pub mod site;

/// Prelude for common imports used throughout all Replipanel crates
pub mod prelude {
    pub use super::error::{Error, Result, ResultExt};
    pub use tracing::{debug, error, info, trace, warn};
}

// Re-export commonly used types at crate root for convenience
pub use entry::ConfigEntry;
pub use error::{Error, Result, ResultExt};
pub use fragment::{
    data_path, data_type, scan_entries, title_binding, EntryElement, TitleBinding,
};
pub use site::{derive_site_path, site_change_for, SiteChange};
