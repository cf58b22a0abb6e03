//! Keep-alive pings for kiosk push connections.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::ws::manager::WsManager;

/// Ping every kiosk each `period` and drop connections whose outbound
/// channel has closed. Stops when `cancel` fires.
pub fn start_heartbeat(
    ws_manager: Arc<WsManager>,
    period: Duration,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                _ = interval.tick() => {}
            }
            let dropped = ws_manager.ping_all().await;
            if dropped > 0 {
                tracing::info!(dropped, "Dropped closed kiosk connections");
            }
            let count = ws_manager.connection_count().await;
            tracing::debug!(count, "Kiosk heartbeat sent");
        }

        tracing::debug!("Heartbeat stopped");
    })
}
