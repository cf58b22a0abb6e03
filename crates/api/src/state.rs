use std::sync::Arc;

use poster_core::store::PosterStore;

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything lives behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// The poster store adapter (PostgreSQL or in-memory).
    pub store: Arc<dyn PosterStore>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// WebSocket connection manager (kiosk clients).
    pub ws_manager: Arc<WsManager>,
}
