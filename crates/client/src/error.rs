use poster_core::error::CoreError;

/// Errors from the poster API client layer.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request itself failed (connect, DNS, TLS, timeout, decode).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error("Poster API error ({status} {code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// The base URL could not be turned into a WebSocket URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The WebSocket connection could not be established.
    #[error("WebSocket connection error: {0}")]
    Connection(String),
}

impl ClientError {
    /// HTTP status of an API error, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<ClientError> for CoreError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Request(e) if e.is_decode() => {
                CoreError::Internal(format!("Malformed API response: {e}"))
            }
            ClientError::Request(e) => CoreError::Network(e.to_string()),
            ClientError::Api {
                status, message, ..
            } => match status {
                400 | 422 => CoreError::Validation(message),
                401 | 403 => CoreError::Unauthorized(message),
                404 => CoreError::NotFound {
                    entity: "Resource",
                    id: message,
                },
                409 => CoreError::Conflict(message),
                502..=504 => CoreError::Network(format!("{status}: {message}")),
                _ => CoreError::Internal(format!("{status}: {message}")),
            },
            ClientError::Connection(msg) => CoreError::Network(msg),
            ClientError::InvalidUrl(msg) => CoreError::Validation(msg),
        }
    }
}
