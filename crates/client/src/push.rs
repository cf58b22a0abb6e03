//! WebSocket change-push listener.
//!
//! Connects to the API's `/api/v1/ws` endpoint, decodes each text frame
//! into a [`StoreEvent`] and republishes it on a local [`ChangeBus`].
//! The server sends a full snapshot on every connect, so a reconnect
//! also resynchronises subscribers.

use std::time::Duration;

use futures::StreamExt;
use poster_core::bus::ChangeBus;
use poster_core::store::StoreEvent;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

use crate::error::ClientError;
use crate::reconnect::{next_delay, ReconnectConfig};

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Decode one text frame. Unknown payloads are logged and skipped.
pub fn decode_event(text: &str) -> Option<StoreEvent> {
    match serde_json::from_str(text) {
        Ok(event) => Some(event),
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring unrecognised push frame");
            None
        }
    }
}

/// Spawn the listener task. It runs until `cancel` fires.
pub fn spawn_push_listener(
    ws_url: String,
    bus: ChangeBus,
    config: ReconnectConfig,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut delay = config.initial_delay;

        loop {
            let connected = tokio::select! {
                () = cancel.cancelled() => break,
                result = connect(&ws_url) => result,
            };

            match connected {
                Ok(mut stream) => {
                    tracing::info!(url = %ws_url, "Connected to change push");
                    delay = config.initial_delay;
                    tokio::select! {
                        () = cancel.cancelled() => {
                            let _ = stream.close(None).await;
                            break;
                        }
                        () = pump(&mut stream, &bus) => {}
                    }
                    tracing::warn!(url = %ws_url, "Change push disconnected");
                }
                Err(e) => {
                    tracing::warn!(
                        url = %ws_url,
                        error = %e,
                        retry_in_ms = delay.as_millis() as u64,
                        "Change push connect failed",
                    );
                }
            }

            if !wait(delay, &cancel).await {
                break;
            }
            delay = next_delay(delay, &config);
        }

        tracing::debug!("Change push listener stopped");
    })
}

async fn connect(url: &str) -> Result<WsStream, ClientError> {
    let (stream, _response) = connect_async(url)
        .await
        .map_err(|e| ClientError::Connection(format!("Failed to connect to {url}: {e}")))?;
    Ok(stream)
}

/// Forward frames to the bus until the socket closes or errors.
async fn pump(stream: &mut WsStream, bus: &ChangeBus) {
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                if let Some(event) = decode_event(&text) {
                    bus.publish(event);
                }
            }
            Ok(Message::Close(frame)) => {
                tracing::debug!(?frame, "Change push closed by server");
                break;
            }
            // Pings are answered by tungstenite.
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Change push receive error");
                break;
            }
        }
    }
}

/// Sleep for `delay`; `false` if cancelled first.
async fn wait(delay: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        () = cancel.cancelled() => false,
        () = tokio::time::sleep(delay) => true,
    }
}

#[cfg(test)]
mod tests {
    use poster_core::settings::Settings;

    use super::*;

    #[test]
    fn decodes_tagged_frames() {
        let event = decode_event(r#"{"type":"settings","data":{"cycle_speed_secs":12}}"#);
        assert_eq!(event, Some(StoreEvent::Settings(Settings::new(12))));
    }

    #[test]
    fn skips_unknown_frames() {
        assert_eq!(decode_event(r#"{"type":"ping"}"#), None);
        assert_eq!(decode_event("not json"), None);
    }

    #[tokio::test]
    async fn listener_stops_on_cancel_while_backing_off() {
        let cancel = CancellationToken::new();
        let handle = spawn_push_listener(
            "ws://127.0.0.1:9/api/v1/ws".into(),
            ChangeBus::default(),
            ReconnectConfig::default(),
            cancel.clone(),
        );
        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("listener should stop")
            .unwrap();
    }
}
