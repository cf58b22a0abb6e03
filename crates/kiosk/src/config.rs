use std::time::Duration;

use poster_client::reconnect::ReconnectConfig;
use poster_core::rotation::ListChangePolicy;

/// Errors raised while reading kiosk configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a valid {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Kiosk configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct KioskConfig {
    /// Base URL of the poster API (default: `http://localhost:3000`).
    pub api_url: String,
    /// Bearer token for writes. Reads never need one.
    pub api_token: Option<String>,
    /// Refetch period used while change push is unavailable.
    pub poll_interval: Duration,
    /// Index behaviour when the poster list changes.
    pub list_change_policy: ListChangePolicy,
    /// Backoff for the initial load and the push connection.
    pub retry: ReconnectConfig,
}

impl KioskConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var              | Default                 |
    /// |----------------------|-------------------------|
    /// | `POSTER_API_URL`     | `http://localhost:3000` |
    /// | `POSTER_API_TOKEN`   | unset                   |
    /// | `POLL_INTERVAL_SECS` | `15`                    |
    /// | `LIST_CHANGE_POLICY` | `clamp`                 |
    /// | `RETRY_INITIAL_MS`   | `1000`                  |
    /// | `RETRY_MAX_MS`       | `30000`                 |
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url =
            std::env::var("POSTER_API_URL").unwrap_or_else(|_| "http://localhost:3000".into());
        let api_token = std::env::var("POSTER_API_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());

        let poll_secs: u64 = parse_var("POLL_INTERVAL_SECS", "15", "u64")?;
        if poll_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "POLL_INTERVAL_SECS",
                expected: "positive u64",
                value: "0".into(),
            });
        }
        let list_change_policy = parse_var("LIST_CHANGE_POLICY", "clamp", "list change policy")?;
        let initial_ms: u64 = parse_var("RETRY_INITIAL_MS", "1000", "u64")?;
        let max_ms: u64 = parse_var("RETRY_MAX_MS", "30000", "u64")?;

        Ok(Self {
            api_url,
            api_token,
            poll_interval: Duration::from_secs(poll_secs),
            list_change_policy,
            retry: ReconnectConfig {
                initial_delay: Duration::from_millis(initial_ms.max(1)),
                max_delay: Duration::from_millis(max_ms.max(initial_ms)),
                ..ReconnectConfig::default()
            },
        })
    }
}

fn parse_var<T: std::str::FromStr>(
    name: &'static str,
    default: &str,
    expected: &'static str,
) -> Result<T, ConfigError> {
    let value = std::env::var(name).unwrap_or_else(|_| default.to_string());
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        expected,
        value,
    })
}
