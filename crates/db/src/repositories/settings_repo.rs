//! Repository for the `settings` table.

use sqlx::PgPool;

use crate::models::settings::SettingsRow;

/// Column list for `settings` queries.
const COLUMNS: &str = "id, cycle_speed_secs, created_at, updated_at";

/// Provides data access for settings documents.
pub struct SettingsRepo;

impl SettingsRepo {
    /// Find a settings document by ID.
    ///
    /// Returns `None` if it has never been saved.
    pub async fn find(pool: &PgPool, id: &str) -> Result<Option<SettingsRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM settings WHERE id = $1");
        sqlx::query_as::<_, SettingsRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert or update a settings document.
    ///
    /// Uses `ON CONFLICT (id) DO UPDATE` so repeated saves are idempotent.
    pub async fn upsert(
        pool: &PgPool,
        id: &str,
        cycle_speed_secs: i32,
    ) -> Result<SettingsRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO settings (id, cycle_speed_secs) \
             VALUES ($1, $2) \
             ON CONFLICT (id) DO UPDATE SET \
                 cycle_speed_secs = EXCLUDED.cycle_speed_secs \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SettingsRow>(&query)
            .bind(id)
            .bind(cycle_speed_secs)
            .fetch_one(pool)
            .await
    }
}
