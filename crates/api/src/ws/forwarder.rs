use std::sync::Arc;

use axum::extract::ws::Message;
use poster_core::store::{PosterStore, StoreEvent, SubscriptionEvent};
use tokio_util::sync::CancellationToken;

use crate::ws::manager::WsManager;

/// Serialize a store event into the JSON text frame kiosks receive.
pub fn encode_event(event: &StoreEvent) -> Option<Message> {
    match serde_json::to_string(event) {
        Ok(json) => Some(Message::Text(json.into())),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode store event");
            None
        }
    }
}

/// Spawn a task relaying store change events to every WebSocket client.
///
/// A lagged subscription is recovered by broadcasting a fresh poster
/// snapshot. The task ends on cancellation, when the store closes its
/// subscription, or immediately if the store cannot push changes.
pub fn start_change_forwarder(
    store: Arc<dyn PosterStore>,
    ws_manager: Arc<WsManager>,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let Some(mut subscription) = store.subscribe() else {
            tracing::warn!("Store does not support change push; kiosks must poll");
            return;
        };

        loop {
            let event = tokio::select! {
                () = cancel.cancelled() => break,
                event = subscription.recv() => event,
            };

            let event = match event {
                SubscriptionEvent::Event(event) => event,
                SubscriptionEvent::Lagged => match store.list_posters().await {
                    Ok(posters) => StoreEvent::Posters(posters),
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to refetch posters after lag");
                        continue;
                    }
                },
                SubscriptionEvent::Closed => {
                    tracing::info!("Store subscription closed");
                    break;
                }
            };

            if let Some(message) = encode_event(&event) {
                ws_manager.broadcast(message).await;
            }
        }

        tracing::info!("Change forwarder stopped");
    })
}
