//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod poster_repo;
pub mod settings_repo;

pub use poster_repo::PosterRepo;
pub use settings_repo::SettingsRepo;
