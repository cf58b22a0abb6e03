//! Poster Buddy domain crate.
//!
//! Shared by the HTTP service, the PostgreSQL store and the kiosk client:
//!
//! - [`poster`] / [`settings`] -- record types and DTOs.
//! - [`store`] -- the [`store::PosterStore`] adapter trait and change events.
//! - [`bus`] -- broadcast hub behind store subscriptions.
//! - [`memory_store`] -- in-process store implementation.
//! - [`rotation`] -- pure rotation state machine.
//! - [`bulk_upload`], [`info_file`], [`image_fit`] -- upload ingestion.

pub mod bulk_upload;
pub mod bus;
pub mod error;
pub mod image_fit;
pub mod info_file;
pub mod memory_store;
pub mod poster;
pub mod rotation;
pub mod seed;
pub mod settings;
pub mod store;
pub mod types;
