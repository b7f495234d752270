//! Cross-panel notification bus
//!
//! Panels mounted in different consoles of the same process share one
//! [`SiteChangeBus`]. A panel that created an entry announces the owning
//! site; every mounted panel listening on the bus refreshes itself in
//! response. Delivery is broadcast, so the announcing panel hears its own
//! notification too.

use tokio::sync::broadcast;

use replipanel_core::SiteChange;

const DEFAULT_CAPACITY: usize = 16;

/// Broadcast channel for [`SiteChange`] notifications.
#[derive(Debug, Clone)]
pub struct SiteChangeBus {
    event_tx: broadcast::Sender<SiteChange>,
}

impl SiteChangeBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (event_tx, _) = broadcast::channel(capacity);
        Self { event_tx }
    }

    /// Subscribe to site change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<SiteChange> {
        self.event_tx.subscribe()
    }

    /// Broadcast a site change to all subscribers
    pub fn broadcast(&self, change: SiteChange) {
        // Ignore send errors (no subscribers is fine)
        let _ = self.event_tx.send(change);
    }

    /// Number of live subscribers, mostly useful in tests
    pub fn receiver_count(&self) -> usize {
        self.event_tx.receiver_count()
    }
}

impl Default for SiteChangeBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_broadcast_reaches_all_subscribers() {
        let bus = SiteChangeBus::new();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        bus.broadcast(SiteChange::new("/conf/site1", "/conf/site1/replication"));

        let change = first.recv().await.unwrap();
        assert_eq!(change.site_path, "/conf/site1");
        let change = second.recv().await.unwrap();
        assert_eq!(change.config_path, "/conf/site1/replication");
    }

    #[test]
    fn test_broadcast_without_subscribers_is_fine() {
        let bus = SiteChangeBus::new();
        bus.broadcast(SiteChange::new("/conf/site1", "/conf/site1/replication"));
        assert_eq!(bus.receiver_count(), 0);
    }
}
