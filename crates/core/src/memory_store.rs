//! In-process [`PosterStore`] backed by an insertion-ordered vector.
//!
//! Used when no database is configured and throughout the test suites.
//! Supports push subscriptions through a [`ChangeBus`].

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::bus::ChangeBus;
use crate::error::CoreError;
use crate::poster::{NewPoster, PosterPatch, PosterRecord};
use crate::settings::Settings;
use crate::store::{PosterStore, StoreEvent, StoreResult, Subscription};
use crate::types::{new_poster_id, PosterId};

#[derive(Debug, Default)]
pub struct MemoryStore {
    posters: RwLock<Vec<PosterRecord>>,
    settings: RwLock<Option<Settings>>,
    bus: ChangeBus,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with the given records, in order.
    pub fn with_posters(posters: Vec<PosterRecord>) -> Self {
        Self {
            posters: RwLock::new(posters),
            ..Self::default()
        }
    }

    fn publish_posters(&self, posters: &[PosterRecord]) {
        if self.bus.subscriber_count() > 0 {
            self.bus.publish(StoreEvent::Posters(posters.to_vec()));
        }
    }
}

#[async_trait]
impl PosterStore for MemoryStore {
    async fn list_posters(&self) -> StoreResult<Vec<PosterRecord>> {
        Ok(self.posters.read().await.clone())
    }

    async fn get_poster(&self, id: &str) -> StoreResult<Option<PosterRecord>> {
        Ok(self
            .posters
            .read()
            .await
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn add_poster(&self, poster: NewPoster) -> StoreResult<PosterRecord> {
        let mut posters = self.posters.write().await;

        let id = match &poster.id {
            Some(id) if posters.iter().any(|p| &p.id == id) => {
                return Err(CoreError::Conflict(format!(
                    "Poster with id {id} already exists"
                )));
            }
            Some(id) => id.clone(),
            None => new_poster_id(),
        };

        let record = PosterRecord::from_new(id, poster);
        posters.push(record.clone());
        self.publish_posters(&posters);
        Ok(record)
    }

    async fn update_poster(&self, id: &str, patch: PosterPatch) -> StoreResult<PosterRecord> {
        let mut posters = self.posters.write().await;
        let record = posters
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| CoreError::poster_not_found(id))?;

        record.apply_patch(&patch);
        let updated = record.clone();
        self.publish_posters(&posters);
        Ok(updated)
    }

    async fn delete_poster(&self, id: &str) -> StoreResult<()> {
        let mut posters = self.posters.write().await;
        let before = posters.len();
        posters.retain(|p| p.id != id);
        if posters.len() != before {
            self.publish_posters(&posters);
        }
        Ok(())
    }

    async fn delete_posters_batch(&self, ids: &[PosterId]) -> StoreResult<usize> {
        let mut posters = self.posters.write().await;
        let before = posters.len();
        posters.retain(|p| !ids.contains(&p.id));
        let removed = before - posters.len();
        if removed > 0 {
            self.publish_posters(&posters);
        }
        Ok(removed)
    }

    async fn get_settings(&self) -> StoreResult<Settings> {
        Ok(self.settings.read().await.unwrap_or_default())
    }

    async fn save_settings(&self, settings: Settings) -> StoreResult<Settings> {
        *self.settings.write().await = Some(settings);
        self.bus.publish(StoreEvent::Settings(settings));
        Ok(settings)
    }

    fn subscribe(&self) -> Option<Subscription> {
        Some(self.bus.subscribe())
    }
}
