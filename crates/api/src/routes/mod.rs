pub mod health;
pub mod posters;
pub mod settings;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws                          WebSocket change push
///
/// /posters                     list, create
/// /posters/batchDelete         delete many (POST)
/// /posters/upload              bulk multipart upload (POST)
/// /posters/{id}                get, update (PATCH), delete
/// /posters/{id}/info           info text file export
///
/// /settings                    get, save (PUT)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .nest("/posters", posters::router())
        .nest("/settings", settings::router())
}
