//! Handlers for the poster collection.
//!
//! Reads are public; writes go through [`RequireAdmin`].

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use poster_core::error::CoreError;
use poster_core::info_file::{info_file_name, render_info_file};
use poster_core::poster::{NewPoster, PosterPatch, PosterRecord};
use poster_core::types::PosterId;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::admin::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /posters/batchDelete`.
#[derive(Debug, Deserialize)]
pub struct BatchDeleteRequest {
    pub ids: Vec<PosterId>,
}

/// Response payload for `POST /posters/batchDelete`.
#[derive(Debug, Serialize)]
pub struct BatchDeleteResult {
    pub deleted: usize,
}

async fn find_poster(state: &AppState, id: &str) -> AppResult<PosterRecord> {
    state
        .store
        .get_poster(id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::poster_not_found(id)))
}

/// GET /api/v1/posters
///
/// List every poster in display order.
pub async fn list_posters(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let posters = state.store.list_posters().await?;
    Ok(Json(DataResponse { data: posters }))
}

/// GET /api/v1/posters/{id}
pub async fn get_poster(
    State(state): State<AppState>,
    Path(id): Path<PosterId>,
) -> AppResult<impl IntoResponse> {
    let poster = find_poster(&state, &id).await?;
    Ok(Json(DataResponse { data: poster }))
}

/// POST /api/v1/posters
///
/// Add a poster. The store assigns an id unless one is supplied.
pub async fn create_poster(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<NewPoster>,
) -> AppResult<impl IntoResponse> {
    input.validate().map_err(CoreError::from)?;

    let poster = state.store.add_poster(input).await?;

    tracing::info!(poster_id = %poster.id, name = %poster.name, "Poster created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: poster })))
}

/// PATCH /api/v1/posters/{id}
///
/// Replace the supplied fields. Unknown ids are a 404.
pub async fn update_poster(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<PosterId>,
    Json(input): Json<PosterPatch>,
) -> AppResult<impl IntoResponse> {
    input.validate().map_err(CoreError::from)?;

    let poster = state.store.update_poster(&id, input).await?;

    tracing::info!(poster_id = %id, "Poster updated");

    Ok(Json(DataResponse { data: poster }))
}

/// DELETE /api/v1/posters/{id}
///
/// Always 204, whether or not the poster existed.
pub async fn delete_poster(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<PosterId>,
) -> AppResult<StatusCode> {
    state.store.delete_poster(&id).await?;

    tracing::info!(poster_id = %id, "Poster deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/posters/batchDelete
///
/// Delete many posters at once. Unknown ids are skipped.
pub async fn batch_delete(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<BatchDeleteRequest>,
) -> AppResult<impl IntoResponse> {
    let deleted = state.store.delete_posters_batch(&input.ids).await?;

    tracing::info!(requested = input.ids.len(), deleted, "Posters batch deleted");

    Ok(Json(DataResponse {
        data: BatchDeleteResult { deleted },
    }))
}

/// GET /api/v1/posters/{id}/info
///
/// Download the poster's details as an info text file, in the same format
/// bulk upload accepts.
pub async fn export_info(
    State(state): State<AppState>,
    Path(id): Path<PosterId>,
) -> AppResult<impl IntoResponse> {
    let poster = find_poster(&state, &id).await?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        info_file_name(&poster.name).replace('"', "")
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        render_info_file(&poster),
    ))
}
