//! Common view surface

/// Lifecycle surface shared by every markup-bound view.
///
/// A disposed view keeps answering queries with its last state, but
/// pending fetch completions become no-ops and background listeners stop.
pub trait View: Send + Sync {
    /// Whether the view is still bound to live markup.
    fn is_attached(&self) -> bool;

    /// Detach the view from its markup.
    ///
    /// Idempotent and one-way; parents dispose their children before
    /// replacing the region those children were bound to.
    fn dispose(&self);
}
