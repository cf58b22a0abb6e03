//! Handlers for the display settings document.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use poster_core::error::CoreError;
use poster_core::settings::Settings;
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::admin::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/settings
///
/// Returns the defaults when nothing has been saved yet.
pub async fn get_settings(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let settings = state.store.get_settings().await?;
    Ok(Json(DataResponse { data: settings }))
}

/// PUT /api/v1/settings
///
/// Upsert the settings document.
pub async fn save_settings(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<Settings>,
) -> AppResult<impl IntoResponse> {
    input.validate().map_err(CoreError::from)?;

    let settings = state.store.save_settings(input).await?;

    tracing::info!(
        cycle_speed_secs = settings.cycle_speed_secs,
        "Settings saved",
    );

    Ok(Json(DataResponse { data: settings }))
}
