//! Process-wide display settings (a single document, upserted on save).

use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Seconds between automatic poster advances when nothing has been saved.
pub const DEFAULT_CYCLE_SPEED_SECS: u32 = 7;

/// Identifier of the singleton settings document.
pub const SETTINGS_DOCUMENT_ID: &str = "user-settings";

/// The singleton settings record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Settings {
    /// Seconds between automatic advances.
    #[validate(range(min = 1, max = 3600))]
    pub cycle_speed_secs: u32,
}

impl Settings {
    pub fn new(cycle_speed_secs: u32) -> Self {
        Self { cycle_speed_secs }
    }

    /// The rotation interval as a [`Duration`].
    pub fn cycle_duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.cycle_speed_secs))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new(DEFAULT_CYCLE_SPEED_SECS)
    }
}
