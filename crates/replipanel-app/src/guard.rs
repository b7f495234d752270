//! Stale-fetch and liveness guard
//!
//! Every view that replaces its own markup asynchronously carries a
//! [`FetchGuard`]. Starting a fetch takes a ticket; applying the result is
//! allowed only while that ticket is still the latest one and the view has
//! not been detached. A completion that lost the race is discarded, which
//! keeps the displayed markup equal to the last requested fragment.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Ticket identifying one fetch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

/// Race and liveness guard for markup-replacing fetches.
#[derive(Debug)]
pub struct FetchGuard {
    generation: AtomicU64,
    attached: AtomicBool,
}

impl FetchGuard {
    pub fn new() -> Self {
        Self {
            generation: AtomicU64::new(0),
            attached: AtomicBool::new(true),
        }
    }

    /// Start a new fetch attempt, superseding all earlier tickets.
    pub fn begin(&self) -> FetchTicket {
        FetchTicket(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether a completion holding `ticket` may still mutate the view.
    pub fn admits(&self, ticket: FetchTicket) -> bool {
        self.is_attached() && self.generation.load(Ordering::SeqCst) == ticket.0
    }

    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }

    /// Detach the owning view. All outstanding tickets become stale and no
    /// further ones are admitted.
    pub fn detach(&self) {
        self.attached.store(false, Ordering::SeqCst);
    }
}

impl Default for FetchGuard {
    fn default() -> Self {
        Self::new()
    }
}
