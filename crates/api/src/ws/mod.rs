//! WebSocket push of store changes to kiosk clients.
//!
//! Provides connection management, heartbeat, the store-change forwarder
//! and the HTTP upgrade handler used by the `/api/v1/ws` route.

mod forwarder;
mod handler;
mod heartbeat;
pub mod manager;

pub use forwarder::{encode_event, start_change_forwarder};
pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
