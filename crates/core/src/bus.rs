//! In-process change bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`ChangeBus`] is the fan-out hub behind
//! [`PosterStore::subscribe`](crate::store::PosterStore::subscribe). Store
//! adapters own one and publish a [`StoreEvent`] after every successful
//! write.

use tokio::sync::broadcast;

use crate::store::{StoreEvent, Subscription};

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 64;

/// Fan-out bus for [`StoreEvent`]s.
///
/// When the buffer is full the oldest events are dropped and slow
/// subscribers observe a lag, after which they are expected to refetch.
#[derive(Debug, Clone)]
pub struct ChangeBus {
    sender: broadcast::Sender<StoreEvent>,
}

impl ChangeBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// Events published with no subscribers are dropped.
    pub fn publish(&self, event: StoreEvent) {
        let _ = self.sender.send(event);
    }

    /// Open a new subscription. Dropping it unsubscribes.
    pub fn subscribe(&self) -> Subscription {
        Subscription::new(self.sender.subscribe())
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
