use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use poster_core::store::{PosterStore, StoreEvent};

use crate::state::AppState;
use crate::ws::forwarder::encode_event;
use crate::ws::manager::WsManager;

/// HTTP handler that upgrades the connection to WebSocket.
///
/// After the upgrade the connection is registered with `WsManager`, sent the
/// current posters and settings, and then receives every store change.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.store, state.ws_manager))
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Registers the connection with `WsManager`, queueing the current
///      posters and settings ahead of any broadcast.
///   2. Spawns a sender task that forwards messages from the manager channel.
///   3. Drains inbound frames until the client goes away.
async fn handle_socket(socket: WebSocket, store: Arc<dyn PosterStore>, ws_manager: Arc<WsManager>) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, "WebSocket connected");

    let mut rx = ws_manager
        .add_with(conn_id.clone(), || snapshot(store.as_ref(), &conn_id))
        .await;

    let (mut sink, mut stream) = socket.split();

    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let closing = matches!(msg, Message::Close(_));
            if sink.send(msg).await.is_err() || closing {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            // Kiosks only listen; inbound data frames are ignored.
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    ws_manager.remove(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, "WebSocket disconnected");
}

/// Current posters and settings as push messages. Empty if the store fails.
async fn snapshot(store: &dyn PosterStore, conn_id: &str) -> Vec<Message> {
    let posters = match store.list_posters().await {
        Ok(posters) => posters,
        Err(e) => {
            tracing::warn!(conn_id, error = %e, "Failed to load initial poster snapshot");
            return Vec::new();
        }
    };
    let settings = match store.get_settings().await {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!(conn_id, error = %e, "Failed to load initial settings");
            return Vec::new();
        }
    };

    [StoreEvent::Posters(posters), StoreEvent::Settings(settings)]
        .iter()
        .filter_map(encode_event)
        .collect()
}
