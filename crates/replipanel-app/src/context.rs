//! Shared collaborators of one panel

use std::sync::Arc;

use crate::bus::SiteChangeBus;
use crate::client::FragmentClient;
use crate::config::{Endpoints, PanelConfig};
use crate::dialog::DialogHost;
use crate::profile::ProfileStore;

/// Everything a panel's views share: the fragment transport, the dialog
/// host, the preference store, the notification bus, and the flavor
/// configuration. Wired once at mount and handed down explicitly.
pub struct PanelContext {
    pub client: Arc<dyn FragmentClient>,
    pub dialogs: Arc<dyn DialogHost>,
    pub profile: Arc<dyn ProfileStore>,
    pub bus: SiteChangeBus,
    pub config: PanelConfig,
    pub endpoints: Endpoints,
}

impl PanelContext {
    pub fn new(
        client: Arc<dyn FragmentClient>,
        dialogs: Arc<dyn DialogHost>,
        profile: Arc<dyn ProfileStore>,
        bus: SiteChangeBus,
        config: PanelConfig,
    ) -> Arc<Self> {
        let endpoints = config.endpoints();
        Arc::new(Self {
            client,
            dialogs,
            profile,
            bus,
            config,
            endpoints,
        })
    }
}

impl std::fmt::Debug for PanelContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PanelContext")
            .field("client", &"<fragment client>")
            .field("dialogs", &"<dialog host>")
            .field("profile", &"<profile store>")
            .field("config", &self.config)
            .finish()
    }
}
