//! Request extractors guarding write routes.
//!
//! - [`admin::RequireAdmin`] -- requires the configured admin bearer token.

pub mod admin;
