//! [`PosterStore`] backed by PostgreSQL.
//!
//! Subscriptions only observe writes made through this process; other
//! writers to the same database are picked up by polling clients.

use async_trait::async_trait;
use poster_core::bus::ChangeBus;
use poster_core::error::CoreError;
use poster_core::poster::{NewPoster, PosterPatch, PosterRecord};
use poster_core::settings::{Settings, SETTINGS_DOCUMENT_ID};
use poster_core::store::{PosterStore, StoreEvent, StoreResult, Subscription};
use poster_core::types::{new_poster_id, PosterId};

use crate::repositories::{PosterRepo, SettingsRepo};
use crate::DbPool;

/// Map a sqlx error onto the shared domain error.
///
/// - Unique violations (23505) become `Conflict`.
/// - Pool timeouts and I/O failures become `Network`.
/// - Everything else is `Internal`.
pub fn classify_sqlx_error(err: sqlx::Error) -> CoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
            CoreError::Conflict(format!(
                "Duplicate value violates {}",
                db_err.constraint().unwrap_or("a unique constraint")
            ))
        }
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            tracing::warn!(error = %err, "Database unreachable");
            CoreError::Network(err.to_string())
        }
        _ => {
            tracing::error!(error = %err, "Database error");
            CoreError::Internal(err.to_string())
        }
    }
}

#[derive(Debug, Clone)]
pub struct PgPosterStore {
    pool: DbPool,
    bus: ChangeBus,
}

impl PgPosterStore {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            bus: ChangeBus::default(),
        }
    }

    /// Push a fresh snapshot to subscribers. Failures only lose the push.
    async fn publish_posters(&self) {
        if self.bus.subscriber_count() == 0 {
            return;
        }
        match self.list_posters().await {
            Ok(posters) => self.bus.publish(StoreEvent::Posters(posters)),
            Err(e) => tracing::warn!(error = %e, "Failed to load poster snapshot for subscribers"),
        }
    }
}

#[async_trait]
impl PosterStore for PgPosterStore {
    async fn list_posters(&self) -> StoreResult<Vec<PosterRecord>> {
        let rows = PosterRepo::list(&self.pool)
            .await
            .map_err(classify_sqlx_error)?;
        Ok(rows.into_iter().map(PosterRecord::from).collect())
    }

    async fn get_poster(&self, id: &str) -> StoreResult<Option<PosterRecord>> {
        let row = PosterRepo::find_by_id(&self.pool, id)
            .await
            .map_err(classify_sqlx_error)?;
        Ok(row.map(PosterRecord::from))
    }

    async fn add_poster(&self, poster: NewPoster) -> StoreResult<PosterRecord> {
        let id = poster.id.clone().unwrap_or_else(new_poster_id);
        let row = PosterRepo::create(&self.pool, &id, &poster)
            .await
            .map_err(classify_sqlx_error)?;
        self.publish_posters().await;
        Ok(row.into())
    }

    async fn update_poster(&self, id: &str, patch: PosterPatch) -> StoreResult<PosterRecord> {
        let row = PosterRepo::update(&self.pool, id, &patch)
            .await
            .map_err(classify_sqlx_error)?
            .ok_or_else(|| CoreError::poster_not_found(id))?;
        self.publish_posters().await;
        Ok(row.into())
    }

    async fn delete_poster(&self, id: &str) -> StoreResult<()> {
        let removed = PosterRepo::delete(&self.pool, id)
            .await
            .map_err(classify_sqlx_error)?;
        if removed {
            self.publish_posters().await;
        }
        Ok(())
    }

    async fn delete_posters_batch(&self, ids: &[PosterId]) -> StoreResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let removed = PosterRepo::delete_many(&self.pool, ids)
            .await
            .map_err(classify_sqlx_error)?;
        if removed > 0 {
            self.publish_posters().await;
        }
        Ok(removed as usize)
    }

    async fn get_settings(&self) -> StoreResult<Settings> {
        match SettingsRepo::find(&self.pool, SETTINGS_DOCUMENT_ID)
            .await
            .map_err(classify_sqlx_error)?
        {
            Some(row) => Settings::try_from(row),
            None => Ok(Settings::default()),
        }
    }

    async fn save_settings(&self, settings: Settings) -> StoreResult<Settings> {
        let secs = i32::try_from(settings.cycle_speed_secs).map_err(|_| {
            CoreError::Validation(format!(
                "Cycle speed {} is out of range",
                settings.cycle_speed_secs
            ))
        })?;
        let row = SettingsRepo::upsert(&self.pool, SETTINGS_DOCUMENT_ID, secs)
            .await
            .map_err(classify_sqlx_error)?;
        let saved = Settings::try_from(row)?;
        self.bus.publish(StoreEvent::Settings(saved));
        Ok(saved)
    }

    fn subscribe(&self) -> Option<Subscription> {
        Some(self.bus.subscribe())
    }
}
