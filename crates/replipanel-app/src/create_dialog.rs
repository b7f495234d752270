//! Create dialog controller
//!
//! Creating an entry starts from a type selector. Every selection fetches
//! that type's unfilled form body and swaps it into the dialog. Selections
//! can change faster than fetches return, so each fetch is tagged with its
//! type; a completion is applied only while its tag still matches the
//! current selection, otherwise it is discarded.

use std::sync::Arc;

use tokio::task::{JoinError, JoinSet};

use replipanel_core::prelude::*;
use replipanel_core::site_change_for;

use crate::context::PanelContext;
use crate::dialog::{DialogEvent, DialogOutcome, DialogSession};

/// Form field carrying the selected implementation type.
pub const TYPE_FIELD: &str = "type";

/// Controller for an open create dialog.
pub struct CreateDialog {
    ctx: Arc<PanelContext>,
    collection_path: String,
}

/// What woke the dialog loop: a user event or a finished form fetch.
enum Step {
    Event(Option<DialogEvent>),
    Swap(std::result::Result<(String, Result<String>), JoinError>),
}

impl CreateDialog {
    pub fn new(ctx: Arc<PanelContext>, collection_path: impl Into<String>) -> Self {
        Self {
            ctx,
            collection_path: collection_path.into(),
        }
    }

    pub fn collection_path(&self) -> &str {
        &self.collection_path
    }

    /// Drive the dialog until it ends.
    ///
    /// On a successful submit the owning site is announced on the bus if
    /// this panel flavor notifies cross-panel; the caller reloads its own
    /// subtree either way. Returning drops all in-flight form fetches, so
    /// nothing can swap content into a closed dialog.
    pub async fn run(self, mut session: Box<dyn DialogSession>) -> Result<DialogOutcome> {
        let mut swaps: JoinSet<(String, Result<String>)> = JoinSet::new();

        // The selector has an initial value once the dialog markup is up;
        // load that type's form body right away.
        let mut selected = session.field_value(TYPE_FIELD);
        if let Some(ty) = selected.clone() {
            self.spawn_swap(&mut swaps, ty);
        }

        loop {
            let step = tokio::select! {
                event = session.next_event() => Step::Event(event),
                Some(joined) = swaps.join_next(), if !swaps.is_empty() => Step::Swap(joined),
            };
            match step {
                Step::Event(Some(DialogEvent::TypeSelected(ty))) => {
                    selected = Some(ty.clone());
                    self.spawn_swap(&mut swaps, ty);
                }
                Step::Event(Some(DialogEvent::Submitted)) => {
                    info!("created entry under {}", self.collection_path);
                    self.announce_created();
                    return Ok(DialogOutcome::Submitted);
                }
                Step::Event(Some(DialogEvent::Cancelled)) | Step::Event(None) => {
                    return Ok(DialogOutcome::Cancelled);
                }
                Step::Event(Some(DialogEvent::DeleteRequested)) => {
                    // create dialogs have no delete affordance
                }
                Step::Swap(Ok((ty, Ok(markup)))) => {
                    if selected.as_deref() == Some(ty.as_str()) {
                        session.replace_content(&markup).await?;
                    } else {
                        debug!("discarding {ty} form body; selection moved on");
                    }
                }
                Step::Swap(Ok((ty, Err(err)))) => {
                    // previous form body stays; the dialog remains open
                    warn!("empty form fetch for {ty} failed: {err}");
                }
                Step::Swap(Err(err)) => {
                    warn!("empty form task failed: {err}");
                }
            }
        }
    }

    fn spawn_swap(&self, swaps: &mut JoinSet<(String, Result<String>)>, ty: String) {
        let url = self.ctx.endpoints.empty_form(&ty, &self.collection_path);
        let client = Arc::clone(&self.ctx.client);
        debug!("fetching empty {ty} form via {url}");
        swaps.spawn(async move {
            let result = client.get_fragment(&url).await;
            (ty, result)
        });
    }

    /// Announce the owning site on the bus, if this flavor notifies.
    fn announce_created(&self) {
        if !self.ctx.config.cross_panel_notify {
            return;
        }
        match site_change_for(&self.collection_path) {
            Some(change) => {
                info!(
                    "announcing site change for {} (created under {})",
                    change.site_path, change.config_path
                );
                self.ctx.bus.broadcast(change);
            }
            None => warn!(
                "{} has no owning site; skipping cross-panel notification",
                self.collection_path
            ),
        }
    }
}
