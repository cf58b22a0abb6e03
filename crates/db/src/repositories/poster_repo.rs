//! Repository for the `posters` table.

use poster_core::poster::{NewPoster, PosterPatch};
use sqlx::PgPool;

use crate::models::poster::PosterRow;

/// Column list for `posters` queries.
const COLUMNS: &str = "\
    seq, id, name, poster_url, logo_url, description, starring, director, \
    runtime, genre, rating, poster_ai_hint, created_at, updated_at";

/// Provides CRUD operations for posters.
pub struct PosterRepo;

impl PosterRepo {
    /// List all posters in insertion order.
    pub async fn list(pool: &PgPool) -> Result<Vec<PosterRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM posters ORDER BY seq ASC");
        sqlx::query_as::<_, PosterRow>(&query).fetch_all(pool).await
    }

    /// Find a poster by its ID.
    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<PosterRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM posters WHERE id = $1");
        sqlx::query_as::<_, PosterRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert a poster under `id`. A duplicate id fails with a unique violation.
    pub async fn create(
        pool: &PgPool,
        id: &str,
        dto: &NewPoster,
    ) -> Result<PosterRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO posters \
                 (id, name, poster_url, logo_url, description, starring, director, \
                  runtime, genre, rating, poster_ai_hint) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PosterRow>(&query)
            .bind(id)
            .bind(&dto.name)
            .bind(&dto.poster_url)
            .bind(&dto.logo_url)
            .bind(&dto.description)
            .bind(&dto.starring)
            .bind(&dto.director)
            .bind(&dto.runtime)
            .bind(&dto.genre)
            .bind(&dto.rating)
            .bind(&dto.poster_ai_hint)
            .fetch_one(pool)
            .await
    }

    /// Partially update a poster.
    ///
    /// Uses `COALESCE` so only provided fields are changed. Returns `None`
    /// if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: &str,
        dto: &PosterPatch,
    ) -> Result<Option<PosterRow>, sqlx::Error> {
        let query = format!(
            "UPDATE posters SET \
                 name = COALESCE($2, name), \
                 poster_url = COALESCE($3, poster_url), \
                 logo_url = COALESCE($4, logo_url), \
                 description = COALESCE($5, description), \
                 starring = COALESCE($6, starring), \
                 director = COALESCE($7, director), \
                 runtime = COALESCE($8, runtime), \
                 genre = COALESCE($9, genre), \
                 rating = COALESCE($10, rating), \
                 poster_ai_hint = COALESCE($11, poster_ai_hint) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PosterRow>(&query)
            .bind(id)
            .bind(&dto.name)
            .bind(&dto.poster_url)
            .bind(&dto.logo_url)
            .bind(&dto.description)
            .bind(&dto.starring)
            .bind(&dto.director)
            .bind(&dto.runtime)
            .bind(&dto.genre)
            .bind(&dto.rating)
            .bind(&dto.poster_ai_hint)
            .fetch_optional(pool)
            .await
    }

    /// Delete a poster by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM posters WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every poster whose id is in `ids` inside one transaction.
    ///
    /// Unknown ids are skipped. Returns the number of rows removed.
    pub async fn delete_many(pool: &PgPool, ids: &[String]) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let result = sqlx::query("DELETE FROM posters WHERE id = ANY($1)")
            .bind(ids)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected())
    }

    /// Number of stored posters.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM posters")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }
}
