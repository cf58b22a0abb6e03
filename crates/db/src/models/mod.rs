//! Database row structs.
//!
//! Rows carry bookkeeping columns (`created_at`, `updated_at`) that the
//! domain records in `poster-core` do not expose; each row converts into
//! its domain type.

pub mod poster;
pub mod settings;
