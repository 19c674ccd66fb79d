//! # Invalidation Bus
//!
//! Fan-out of [`InvalidationTag`]s to whoever renders cached views.
//!
//! ```text
//! TransactionPoster ──commit──► InvalidationBus::invalidate(tag)
//!                                     │ broadcast
//!                     ┌───────────────┼───────────────┐
//!                     ▼               ▼               ▼
//!               product list      dashboard       tx history
//!               (subscriber)     (subscriber)    (subscriber)
//! ```
//!
//! Fire-and-forget: with no subscribers the tag is dropped, and a slow
//! subscriber that lags only misses notices, never blocks a posting.

use stockroom_core::{InvalidationTag, Invalidator};
use tokio::sync::broadcast;
use tracing::debug;

/// Default channel depth. A lagging subscriber should simply refresh everything.
pub const DEFAULT_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct InvalidationBus {
    sender: broadcast::Sender<InvalidationTag>,
}

impl InvalidationBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        InvalidationBus { sender }
    }

    /// Registers a new listener. It sees only tags published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<InvalidationTag> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for InvalidationBus {
    fn default() -> Self {
        InvalidationBus::new(DEFAULT_CAPACITY)
    }
}

impl Invalidator for InvalidationBus {
    fn invalidate(&self, tag: InvalidationTag) {
        // Err only means nobody is listening.
        let delivered = self.sender.send(tag).unwrap_or(0);
        debug!(tag = tag.as_str(), delivered, "Published invalidation");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_tags_in_order() {
        let bus = InvalidationBus::default();
        let mut rx = bus.subscribe();

        bus.invalidate(InvalidationTag::Transactions);
        bus.invalidate(InvalidationTag::Products);

        assert_eq!(rx.recv().await.unwrap(), InvalidationTag::Transactions);
        assert_eq!(rx.recv().await.unwrap(), InvalidationTag::Products);
    }

    #[test]
    fn test_publish_without_subscribers_is_harmless() {
        let bus = InvalidationBus::new(4);
        assert_eq!(bus.subscriber_count(), 0);
        bus.invalidate(InvalidationTag::Reports);
    }
}
