//! Tabbed form holding the entry list
//!
//! One [`SetupForm`] is built per setup fragment. It owns a node view for
//! each editable entry element, the add-entry affordance, and the tab
//! state restored from the profile. Entry views are never created
//! dynamically: new entries appear only through a full subtree reload,
//! which builds a fresh form.

use std::sync::{Arc, RwLock, Weak};

use replipanel_core::fragment;
use replipanel_core::prelude::*;

use crate::config_setup::ConfigSetup;
use crate::context::PanelContext;
use crate::create_dialog::CreateDialog;
use crate::dialog::{DialogOutcome, DialogRequest};
use crate::guard::FetchGuard;
use crate::node_view::ConfigNodeView;
use crate::profile::tab_key;
use crate::view::View;

pub struct SetupForm {
    ctx: Arc<PanelContext>,
    config_setup: Weak<ConfigSetup>,
    path: String,
    nodes: Vec<Arc<ConfigNodeView>>,
    active_tab: RwLock<String>,
    guard: FetchGuard,
}

impl SetupForm {
    pub(crate) fn bind(
        ctx: Arc<PanelContext>,
        config_setup: Weak<ConfigSetup>,
        path: &str,
        markup: &str,
    ) -> Arc<Self> {
        let restored = ctx
            .profile
            .get(&tab_key(path))
            .unwrap_or_else(|| ctx.config.default_tab.clone());
        let path = path.to_string();
        Arc::new_cyclic(|form| {
            let nodes = fragment::scan_entries(markup)
                .into_iter()
                .filter(|element| element.editable)
                .map(|element| ConfigNodeView::bind(Arc::clone(&ctx), form.clone(), element))
                .collect();
            Self {
                ctx,
                config_setup,
                path,
                nodes,
                active_tab: RwLock::new(restored),
                guard: FetchGuard::new(),
            }
        })
    }

    /// The configuration subtree this form edits.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Node views of the editable entries, in fragment order.
    pub fn nodes(&self) -> &[Arc<ConfigNodeView>] {
        &self.nodes
    }

    /// Find the node view for an entry path.
    pub fn node(&self, path: &str) -> Option<&Arc<ConfigNodeView>> {
        self.nodes.iter().find(|node| node.path() == path)
    }

    /// The currently selected tab key.
    pub fn active_tab(&self) -> String {
        self.active_tab
            .read()
            .ok()
            .map(|slot| slot.clone())
            .unwrap_or_else(|| self.ctx.config.default_tab.clone())
    }

    /// Switch tabs and remember the choice for this subtree.
    pub fn set_active_tab(&self, key: &str) {
        if let Ok(mut slot) = self.active_tab.write() {
            *slot = key.to_string();
        }
        self.ctx.profile.set(&tab_key(&self.path), key);
        debug!("tab {key} selected for {}", self.path);
    }

    pub(crate) fn config_setup(&self) -> Weak<ConfigSetup> {
        self.config_setup.clone()
    }

    /// Reload the whole subtree through the owning panel.
    pub async fn reload_setup(&self) -> Result<()> {
        match self.config_setup.upgrade() {
            Some(setup) => setup.reload().await,
            None => {
                warn!("panel owning {} is gone; skipping subtree reload", self.path);
                Ok(())
            }
        }
    }

    /// Open the create dialog for this collection and drive it to its
    /// outcome. A successful create reloads the subtree.
    pub async fn add_config(&self) -> Result<DialogOutcome> {
        let url = self.ctx.endpoints.node_create(&self.path);
        info!("opening create dialog for {}", self.path);
        let session = self.ctx.dialogs.open(DialogRequest::new(url)).await?;
        let dialog = CreateDialog::new(Arc::clone(&self.ctx), self.path.clone());
        let outcome = dialog.run(session).await?;
        if outcome == DialogOutcome::Submitted {
            self.reload_setup().await?;
        }
        Ok(outcome)
    }
}

impl View for SetupForm {
    fn is_attached(&self) -> bool {
        self.guard.is_attached()
    }

    fn dispose(&self) {
        self.guard.detach();
        for node in &self.nodes {
            node.dispose();
        }
    }
}
