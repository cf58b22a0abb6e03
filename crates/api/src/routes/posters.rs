//! Route definitions for posters, mounted at `/posters`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{posters, upload};
use crate::state::AppState;

/// ```text
/// GET    /              -> list_posters
/// POST   /              -> create_poster
/// POST   /batchDelete   -> batch_delete
/// POST   /upload        -> upload_posters
/// GET    /{id}          -> get_poster
/// PATCH  /{id}          -> update_poster
/// DELETE /{id}          -> delete_poster
/// GET    /{id}/info     -> export_info
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(posters::list_posters).post(posters::create_poster))
        .route("/batchDelete", post(posters::batch_delete))
        .route("/upload", post(upload::upload_posters))
        .route(
            "/{id}",
            get(posters::get_poster)
                .patch(posters::update_poster)
                .delete(posters::delete_poster),
        )
        .route("/{id}/info", get(posters::export_info))
}
