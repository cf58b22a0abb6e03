//! The data store adapter seam.
//!
//! [`PosterStore`] is the only interface through which the rest of the
//! system touches persisted posters and settings. Adapters exist for an
//! in-process store ([`crate::memory_store::MemoryStore`]), PostgreSQL
//! (`poster-db`) and the HTTP API (`poster-client`).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::error::CoreError;
use crate::poster::{NewPoster, PosterPatch, PosterRecord};
use crate::settings::Settings;
use crate::types::PosterId;

/// Convenience alias for adapter results.
pub type StoreResult<T> = Result<T, CoreError>;

/// CRUD operations over the poster collection and the settings document.
///
/// Policies every implementation follows:
///
/// - `list_posters` on an empty collection returns an empty vector.
/// - `get_settings` returns [`Settings::default`] when nothing was saved.
/// - `update_poster` on an unknown id fails with [`CoreError::NotFound`].
/// - `delete_poster` on an unknown id succeeds (idempotent).
/// - `delete_posters_batch` is all-or-nothing; unknown ids are skipped and
///   the number of removed posters is returned.
/// - `save_settings` is an upsert.
#[async_trait]
pub trait PosterStore: Send + Sync {
    /// All posters in display order.
    async fn list_posters(&self) -> StoreResult<Vec<PosterRecord>>;

    /// A single poster, or `None` when the id is unknown.
    async fn get_poster(&self, id: &str) -> StoreResult<Option<PosterRecord>>;

    /// Insert a poster, assigning an id unless the caller pre-assigned one.
    async fn add_poster(&self, poster: NewPoster) -> StoreResult<PosterRecord>;

    /// Replace the fields present in `patch`.
    async fn update_poster(&self, id: &str, patch: PosterPatch) -> StoreResult<PosterRecord>;

    /// Remove a poster. Unknown ids are a successful no-op.
    async fn delete_poster(&self, id: &str) -> StoreResult<()>;

    /// Remove many posters atomically, returning how many existed.
    async fn delete_posters_batch(&self, ids: &[PosterId]) -> StoreResult<usize>;

    /// The settings document, defaulted when absent.
    async fn get_settings(&self) -> StoreResult<Settings>;

    /// Upsert the settings document.
    async fn save_settings(&self, settings: Settings) -> StoreResult<Settings>;

    /// Open a push subscription, or `None` when the adapter can only be polled.
    fn subscribe(&self) -> Option<Subscription>;
}

// ---------------------------------------------------------------------------
// Change events
// ---------------------------------------------------------------------------

/// A change notification pushed to subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum StoreEvent {
    /// Full ordered snapshot of the poster collection after a write.
    Posters(Vec<PosterRecord>),
    /// The settings document after a save.
    Settings(Settings),
}

/// What a [`Subscription`] yields on each receive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionEvent {
    Event(StoreEvent),
    /// Events were dropped because this subscriber fell behind; refetch.
    Lagged,
    /// The store side went away; fall back to polling.
    Closed,
}

/// A live change subscription. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    receiver: broadcast::Receiver<StoreEvent>,
}

impl Subscription {
    pub fn new(receiver: broadcast::Receiver<StoreEvent>) -> Self {
        Self { receiver }
    }

    /// Wait for the next change.
    pub async fn recv(&mut self) -> SubscriptionEvent {
        match self.receiver.recv().await {
            Ok(event) => SubscriptionEvent::Event(event),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "Store subscription lagged");
                SubscriptionEvent::Lagged
            }
            Err(broadcast::error::RecvError::Closed) => SubscriptionEvent::Closed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_event_wire_format_is_tagged() {
        let json = serde_json::to_value(StoreEvent::Settings(Settings::new(5))).unwrap();
        assert_eq!(json["type"], "settings");
        assert_eq!(json["data"]["cycle_speed_secs"], 5);

        let back: StoreEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, StoreEvent::Settings(Settings::new(5)));
    }

    #[test]
    fn posters_event_carries_snapshot() {
        let json = serde_json::json!({
            "type": "posters",
            "data": [{"id": "a", "name": "Heat"}]
        });
        let event: StoreEvent = serde_json::from_value(json).unwrap();
        match event {
            StoreEvent::Posters(list) => {
                assert_eq!(list.len(), 1);
                assert_eq!(list[0].id, "a");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
