/// Poster identifiers are opaque strings, either store-assigned or
/// pre-assigned by the caller.
pub type PosterId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Generate a fresh poster identifier for stores that do not assign one.
pub fn new_poster_id() -> PosterId {
    uuid::Uuid::new_v4().to_string()
}
