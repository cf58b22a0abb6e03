use poster_core::bulk_upload::MissingFilePolicy;
use sha2::{Digest, Sha256};

/// Default request body ceiling (covers multipart poster uploads).
const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Errors raised while reading configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a valid {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// PostgreSQL URL. `None` runs the in-memory store.
    pub database_url: Option<String>,
    /// SHA-256 digest of the admin bearer token. `None` leaves writes open.
    pub admin_token_digest: Option<[u8; 32]>,
    /// Insert the demo posters into an empty store at startup.
    pub seed_demo_posters: bool,
    /// How bulk uploads treat incomplete file groups.
    pub upload_missing_policy: MissingFilePolicy,
    /// Maximum request body size in bytes.
    pub max_upload_bytes: usize,
    /// Seconds between WebSocket pings to kiosks (default: `30`).
    pub ws_heartbeat_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                 |
    /// |-------------------------|-------------------------|
    /// | `HOST`                  | `0.0.0.0`               |
    /// | `PORT`                  | `3000`                  |
    /// | `CORS_ORIGINS`          | `http://localhost:9002` |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                    |
    /// | `DATABASE_URL`          | unset (in-memory store) |
    /// | `ADMIN_TOKEN`           | unset (writes open)     |
    /// | `SEED_DEMO_POSTERS`     | `false`                 |
    /// | `UPLOAD_MISSING_POLICY` | `report`                |
    /// | `MAX_UPLOAD_BYTES`      | `52428800`              |
    /// | `WS_HEARTBEAT_SECS`     | `30`                    |
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = parse_var("PORT", "3000", "u16")?;

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:9002".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs = parse_var("REQUEST_TIMEOUT_SECS", "30", "u64")?;

        let database_url = non_empty_var("DATABASE_URL");
        let admin_token_digest = non_empty_var("ADMIN_TOKEN").map(|t| token_digest(&t));

        let seed_demo_posters = parse_var("SEED_DEMO_POSTERS", "false", "bool")?;
        let upload_missing_policy = parse_var("UPLOAD_MISSING_POLICY", "report", "policy")?;
        let max_upload_bytes =
            parse_var("MAX_UPLOAD_BYTES", &DEFAULT_MAX_UPLOAD_BYTES.to_string(), "usize")?;
        let ws_heartbeat_secs: u64 = parse_var("WS_HEARTBEAT_SECS", "30", "u64")?;
        if ws_heartbeat_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "WS_HEARTBEAT_SECS",
                expected: "positive number of seconds",
                value: "0".into(),
            });
        }

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            database_url,
            admin_token_digest,
            seed_demo_posters,
            upload_missing_policy,
            max_upload_bytes,
            ws_heartbeat_secs,
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["http://localhost:9002".to_string()],
            request_timeout_secs: 30,
            database_url: None,
            admin_token_digest: None,
            seed_demo_posters: false,
            upload_missing_policy: MissingFilePolicy::default(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            ws_heartbeat_secs: 30,
        }
    }
}

/// SHA-256 of a bearer token. Tokens are only ever compared as digests.
pub fn token_digest(token: &str) -> [u8; 32] {
    Sha256::digest(token.as_bytes()).into()
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
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
