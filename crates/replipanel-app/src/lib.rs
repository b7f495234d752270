//! replipanel-app - Panel orchestration for Replipanel
//!
//! This crate implements the replication setup panel: the view hierarchy and
//! reload protocol, the dialog controllers, fragment transport, cross-panel
//! change notification, and tab preference persistence.

pub mod bus;
pub mod client;
pub mod config;
pub mod config_dialog;
pub mod config_setup;
pub mod context;
pub mod create_dialog;
pub mod dialog;
pub mod guard;
pub mod node_view;
pub mod profile;
pub mod setup_form;
pub mod view;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_utils;

// Re-export primary types
pub use bus::SiteChangeBus;
pub use client::FragmentClient;
pub use config::{Endpoints, PanelConfig, DEFAULT_VIEW_BASE};
pub use config_dialog::ConfigDialog;
pub use config_setup::ConfigSetup;
pub use context::PanelContext;
pub use create_dialog::{CreateDialog, TYPE_FIELD};
pub use dialog::{
    drive_to_outcome, DialogEvent, DialogHost, DialogOutcome, DialogRequest, DialogSession,
};
pub use guard::{FetchGuard, FetchTicket};
pub use node_view::ConfigNodeView;
pub use profile::{tab_key, FileProfile, MemoryProfile, ProfileStore, DEFAULT_TAB};
pub use setup_form::SetupForm;
pub use view::View;

#[cfg(feature = "http-client")]
pub use client::http::HttpFragmentClient;

// Re-export core types for embedders
pub use replipanel_core::{ConfigEntry, Error, Result, SiteChange};
