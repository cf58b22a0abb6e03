use async_trait::async_trait;
use poster_core::bus::ChangeBus;
use poster_core::error::CoreError;
use poster_core::poster::{NewPoster, PosterPatch, PosterRecord};
use poster_core::settings::Settings;
use poster_core::store::{PosterStore, StoreResult, Subscription};
use poster_core::types::PosterId;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::api::{is_not_found, PosterApi};
use crate::error::ClientError;
use crate::push::spawn_push_listener;
use crate::reconnect::ReconnectConfig;

#[derive(Serialize)]
struct BatchDeleteRequest<'a> {
    ids: &'a [PosterId],
}

#[derive(Deserialize)]
struct BatchDeleteResult {
    deleted: usize,
}

/// [`PosterStore`] backed by a remote `poster-api` service.
///
/// Without [`with_push`](Self::with_push) the adapter can only be polled
/// and [`subscribe`](PosterStore::subscribe) returns `None`.
#[derive(Debug)]
pub struct HttpPosterStore {
    api: PosterApi,
    push: Option<ChangeBus>,
}

impl HttpPosterStore {
    pub fn new(api: PosterApi) -> Self {
        Self { api, push: None }
    }

    /// Start a WebSocket listener feeding [`subscribe`](PosterStore::subscribe).
    ///
    /// The listener reconnects with backoff until `cancel` fires. Must be
    /// called inside a Tokio runtime.
    pub fn with_push(
        mut self,
        reconnect: ReconnectConfig,
        cancel: CancellationToken,
    ) -> Result<Self, ClientError> {
        let bus = ChangeBus::default();
        spawn_push_listener(self.api.ws_url()?, bus.clone(), reconnect, cancel);
        self.push = Some(bus);
        Ok(self)
    }
}

const POSTERS: &str = "posters";
const SETTINGS: &str = "settings";

#[async_trait]
impl PosterStore for HttpPosterStore {
    async fn list_posters(&self) -> StoreResult<Vec<PosterRecord>> {
        Ok(self.api.get(&[POSTERS]).await?)
    }

    async fn get_poster(&self, id: &str) -> StoreResult<Option<PosterRecord>> {
        match self.api.get(&[POSTERS, id]).await {
            Ok(poster) => Ok(Some(poster)),
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn add_poster(&self, poster: NewPoster) -> StoreResult<PosterRecord> {
        Ok(self.api.send_json(Method::POST, &[POSTERS], &poster).await?)
    }

    async fn update_poster(&self, id: &str, patch: PosterPatch) -> StoreResult<PosterRecord> {
        self.api
            .send_json(Method::PATCH, &[POSTERS, id], &patch)
            .await
            .map_err(|e| {
                if is_not_found(&e) {
                    CoreError::poster_not_found(id)
                } else {
                    e.into()
                }
            })
    }

    async fn delete_poster(&self, id: &str) -> StoreResult<()> {
        match self.api.delete(&[POSTERS, id]).await {
            Err(e) if !is_not_found(&e) => Err(e.into()),
            _ => Ok(()),
        }
    }

    async fn delete_posters_batch(&self, ids: &[PosterId]) -> StoreResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result: BatchDeleteResult = self
            .api
            .send_json(
                Method::POST,
                &[POSTERS, "batchDelete"],
                &BatchDeleteRequest { ids },
            )
            .await?;
        Ok(result.deleted)
    }

    async fn get_settings(&self) -> StoreResult<Settings> {
        Ok(self.api.get(&[SETTINGS]).await?)
    }

    async fn save_settings(&self, settings: Settings) -> StoreResult<Settings> {
        Ok(self.api.send_json(Method::PUT, &[SETTINGS], &settings).await?)
    }

    fn subscribe(&self) -> Option<Subscription> {
        self.push.as_ref().map(ChangeBus::subscribe)
    }
}
