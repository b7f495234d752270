//! View of one configuration entry
//!
//! Renders the per-entry region inside the setup form's list. The view
//! snapshots the entry's path and implementation type at bind time; every
//! later operation (reload, dialog) uses that snapshot, so a panel reload
//! happening underneath never redirects an in-flight operation.

use std::sync::{Arc, RwLock, Weak};

use replipanel_core::prelude::*;
use replipanel_core::{fragment, ConfigEntry, EntryElement, TitleBinding};

use crate::config_dialog::ConfigDialog;
use crate::context::PanelContext;
use crate::dialog::{DialogOutcome, DialogRequest};
use crate::guard::{FetchGuard, FetchTicket};
use crate::setup_form::SetupForm;
use crate::view::View;

pub struct ConfigNodeView {
    ctx: Arc<PanelContext>,
    setup_form: Weak<SetupForm>,
    entry: ConfigEntry,
    editable: bool,
    markup: RwLock<String>,
    title: RwLock<Option<TitleBinding>>,
    guard: FetchGuard,
}

impl ConfigNodeView {
    pub(crate) fn bind(
        ctx: Arc<PanelContext>,
        setup_form: Weak<SetupForm>,
        element: EntryElement,
    ) -> Arc<Self> {
        let title = fragment::title_binding(&element.markup);
        Arc::new(Self {
            ctx,
            setup_form,
            entry: element.entry,
            editable: element.editable,
            markup: RwLock::new(element.markup),
            title: RwLock::new(title),
            guard: FetchGuard::new(),
        })
    }

    pub fn entry(&self) -> &ConfigEntry {
        &self.entry
    }

    pub fn path(&self) -> &str {
        &self.entry.path
    }

    pub fn entry_type(&self) -> &str {
        &self.entry.entry_type
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    /// The markup currently displayed for this entry.
    pub fn markup(&self) -> String {
        self.markup
            .read()
            .ok()
            .map(|slot| slot.clone())
            .unwrap_or_default()
    }

    /// Title affordance bound from the current markup.
    pub fn title(&self) -> Option<TitleBinding> {
        self.title.read().ok().and_then(|slot| slot.clone())
    }

    /// Fetch this entry's fragment and replace the displayed markup.
    ///
    /// Always safe to call again: a newer reload supersedes an older one,
    /// and a completion arriving after the view was detached is dropped.
    /// On fetch failure the previous markup stays.
    pub async fn reload(&self) -> Result<()> {
        let ticket = self.guard.begin();
        let url = self.ctx.endpoints.node_reload(&self.entry);
        debug!("reloading node {} via {url}", self.entry.path);
        let markup = self.ctx.client.get_fragment(&url).await?;
        self.apply(ticket, markup);
        Ok(())
    }

    /// Open the edit dialog for this entry and drive it to its outcome.
    ///
    /// After a successful save only this node reloads; a delete from
    /// inside the dialog already reloaded the whole subtree.
    pub async fn open_dialog(&self) -> Result<DialogOutcome> {
        if !self.guard.is_attached() {
            warn!("ignoring dialog open on detached node {}", self.entry.path);
            return Ok(DialogOutcome::Cancelled);
        }
        // Snapshot identity at open time; the dialog stays correct even if
        // the panel markup is replaced while it is open.
        let dialog = ConfigDialog::new(
            Arc::clone(&self.ctx),
            self.entry.clone(),
            self.setup_form.clone(),
        );
        let url = self.ctx.endpoints.node_dialog(&self.entry);
        info!("opening edit dialog for {}", self.entry);
        let session = self.ctx.dialogs.open(DialogRequest::new(url)).await?;
        let outcome = dialog.run(session).await?;
        if outcome == DialogOutcome::Submitted {
            self.reload().await?;
        }
        Ok(outcome)
    }

    fn apply(&self, ticket: FetchTicket, markup: String) {
        let admitted = match self.markup.write() {
            Ok(mut slot) => {
                if self.guard.admits(ticket) {
                    *slot = markup;
                    true
                } else {
                    false
                }
            }
            Err(_) => {
                warn!("markup lock poisoned for {}", self.entry.path);
                false
            }
        };
        if admitted {
            self.init_content();
        } else {
            debug!("discarding stale fragment for {}", self.entry.path);
        }
    }

    /// Re-bind the affordances carried by the fragment markup.
    fn init_content(&self) {
        let title = self
            .markup
            .read()
            .ok()
            .and_then(|slot| fragment::title_binding(&slot));
        if let Ok(mut slot) = self.title.write() {
            *slot = title;
        }
    }
}

impl View for ConfigNodeView {
    fn is_attached(&self) -> bool {
        self.guard.is_attached()
    }

    fn dispose(&self) {
        self.guard.detach();
    }
}
