//! Poster row model.

use poster_core::poster::PosterRecord;
use poster_core::types::{PosterId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `posters` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PosterRow {
    pub seq: i64,
    pub id: PosterId,
    pub name: String,
    pub poster_url: String,
    pub logo_url: String,
    pub description: String,
    pub starring: String,
    pub director: String,
    pub runtime: String,
    pub genre: String,
    pub rating: String,
    pub poster_ai_hint: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<PosterRow> for PosterRecord {
    fn from(row: PosterRow) -> Self {
        PosterRecord {
            id: row.id,
            name: row.name,
            poster_url: row.poster_url,
            logo_url: row.logo_url,
            description: row.description,
            starring: row.starring,
            director: row.director,
            runtime: row.runtime,
            genre: row.genre,
            rating: row.rating,
            poster_ai_hint: row.poster_ai_hint,
        }
    }
}
