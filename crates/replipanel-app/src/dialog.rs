//! Dialog presentation seam
//!
//! The panel decides *when* a dialog opens and *what* happens on its
//! events; the embedding console decides how it looks. A [`DialogHost`]
//! loads the dialog fragment for a URL and hands back a [`DialogSession`]
//! the controllers drive until the user submits or walks away.

use async_trait::async_trait;

use replipanel_core::Result;

/// Request to present the dialog rendered at `url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogRequest {
    pub url: String,
}

impl DialogRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// User interaction reported by an open dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogEvent {
    /// The type selector changed; carries the selected implementation type.
    TypeSelected(String),
    /// The delete affordance of an edit dialog was pressed.
    DeleteRequested,
    /// The form was submitted and the server accepted it.
    Submitted,
    /// The dialog was dismissed without submitting.
    Cancelled,
}

/// How a dialog interaction ended, as seen by the opener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogOutcome {
    /// Submitted successfully; the opener refreshes its display.
    Submitted,
    /// The entry was deleted out from under the edit dialog; the subtree
    /// was already reloaded, the opener must not refresh the dead entry.
    Deleted,
    /// Dismissed; nothing changed.
    Cancelled,
}

/// Presents dialogs for the panel.
#[async_trait]
pub trait DialogHost: Send + Sync {
    /// Load the fragment behind `request.url` and present it.
    async fn open(&self, request: DialogRequest) -> Result<Box<dyn DialogSession>>;
}

/// One open dialog, driven by a controller until it closes.
#[async_trait]
pub trait DialogSession: Send {
    /// Current value of a named form field, e.g. the create dialog's type
    /// selector.
    fn field_value(&self, name: &str) -> Option<String>;

    /// Swap the dialog's content region for new markup and re-initialize
    /// its widgets.
    async fn replace_content(&mut self, markup: &str) -> Result<()>;

    /// Next interaction event; `None` once the dialog is gone.
    ///
    /// Must be cancel-safe: controllers poll this inside `select!` and a
    /// dropped poll must not lose an event.
    async fn next_event(&mut self) -> Option<DialogEvent>;

    /// Dismiss the dialog.
    async fn close(&mut self);
}

/// Drive a plain dialog (no custom affordances) to its outcome.
pub async fn drive_to_outcome(mut session: Box<dyn DialogSession>) -> DialogOutcome {
    loop {
        match session.next_event().await {
            Some(DialogEvent::Submitted) => return DialogOutcome::Submitted,
            Some(DialogEvent::Cancelled) | None => return DialogOutcome::Cancelled,
            Some(_) => {}
        }
    }
}
