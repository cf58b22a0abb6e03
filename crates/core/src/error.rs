use crate::types::PosterId;

/// Domain error shared by every store adapter and the services above them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: PosterId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// The backing store could not be reached or timed out.
    #[error("Network failure: {0}")]
    Network(String),

    /// Some items of a multi-item operation failed while others succeeded.
    #[error("Partial batch failure: {failed} of {total} failed")]
    PartialBatch { failed: usize, total: usize },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a missing poster.
    pub fn poster_not_found(id: impl Into<PosterId>) -> Self {
        CoreError::NotFound {
            entity: "Poster",
            id: id.into(),
        }
    }

    /// Whether retrying the same call later could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, CoreError::Network(_))
    }
}

impl From<validator::ValidationErrors> for CoreError {
    fn from(errors: validator::ValidationErrors) -> Self {
        CoreError::Validation(errors.to_string())
    }
}
