//! Poster Buddy HTTP client.
//!
//! [`store::HttpPosterStore`] implements `PosterStore` against a running
//! `poster-api` service, with optional WebSocket change push.

pub mod api;
pub mod error;
pub mod push;
pub mod reconnect;
pub mod store;
