//! Settings row model.

use poster_core::error::CoreError;
use poster_core::settings::Settings;
use poster_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `settings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SettingsRow {
    pub id: String,
    pub cycle_speed_secs: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<SettingsRow> for Settings {
    type Error = CoreError;

    fn try_from(row: SettingsRow) -> Result<Self, Self::Error> {
        let secs = u32::try_from(row.cycle_speed_secs).map_err(|_| {
            CoreError::Internal(format!(
                "Stored cycle speed {} is out of range",
                row.cycle_speed_secs
            ))
        })?;
        Ok(Settings::new(secs))
    }
}
