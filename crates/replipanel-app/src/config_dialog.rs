//! Edit dialog controller for one configuration entry
//!
//! The dialog markup comes from the entry's type-derived dialog URL; the
//! controller here only reacts to its events. Save is handled by the
//! dialog form itself, so the interesting part is the delete affordance:
//! a nested confirmation whose success makes the edit dialog moot.

use std::sync::{Arc, Weak};

use replipanel_core::prelude::*;
use replipanel_core::ConfigEntry;

use crate::context::PanelContext;
use crate::dialog::{drive_to_outcome, DialogEvent, DialogOutcome, DialogRequest, DialogSession};
use crate::setup_form::SetupForm;

/// Controller for an open edit dialog.
///
/// Holds the entry identity snapshotted at open time and a weak link to
/// the setup form that owned the node, for the subtree reload after a
/// delete.
pub struct ConfigDialog {
    ctx: Arc<PanelContext>,
    entry: ConfigEntry,
    setup_form: Weak<SetupForm>,
}

impl ConfigDialog {
    pub fn new(ctx: Arc<PanelContext>, entry: ConfigEntry, setup_form: Weak<SetupForm>) -> Self {
        Self {
            ctx,
            entry,
            setup_form,
        }
    }

    pub fn entry(&self) -> &ConfigEntry {
        &self.entry
    }

    /// Drive the dialog until it ends.
    ///
    /// Returns [`DialogOutcome::Deleted`] when the entry was removed via
    /// the delete affordance; the subtree reload already happened then and
    /// the opener must not touch the dead entry.
    pub async fn run(self, mut session: Box<dyn DialogSession>) -> Result<DialogOutcome> {
        loop {
            match session.next_event().await {
                Some(DialogEvent::DeleteRequested) => {
                    if self.delete_config().await? == DialogOutcome::Submitted {
                        session.close().await;
                        return Ok(DialogOutcome::Deleted);
                    }
                    // confirmation declined; the edit dialog stays open
                }
                Some(DialogEvent::Submitted) => return Ok(DialogOutcome::Submitted),
                Some(DialogEvent::Cancelled) | None => return Ok(DialogOutcome::Cancelled),
                Some(DialogEvent::TypeSelected(_)) => {
                    // edit dialogs have no type selector
                }
            }
        }
    }

    /// Open the delete confirmation; on success reload the whole subtree.
    async fn delete_config(&self) -> Result<DialogOutcome> {
        let url = self.ctx.endpoints.node_delete(&self.entry.path);
        info!("requesting delete confirmation for {}", self.entry.path);
        let confirm = self.ctx.dialogs.open(DialogRequest::new(url)).await?;
        let outcome = drive_to_outcome(confirm).await;
        if outcome == DialogOutcome::Submitted {
            match self.setup_form.upgrade() {
                Some(form) => form.reload_setup().await?,
                None => warn!(
                    "owning form of {} is gone; skipping subtree reload",
                    self.entry.path
                ),
            }
        }
        Ok(outcome)
    }
}
