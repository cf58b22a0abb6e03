//! `poster-kiosk` -- terminal poster rotation.
//!
//! Connects to a `poster-api` service, rotates through its posters and
//! redraws on every change. Reads navigation keys from stdin; see
//! [`poster_kiosk::input::parse_key`]. Logs go to stderr.

use std::sync::Arc;

use anyhow::Context;
use poster_client::api::PosterApi;
use poster_client::store::HttpPosterStore;
use poster_core::store::PosterStore;
use poster_kiosk::config::KioskConfig;
use poster_kiosk::controller::{ControllerOptions, RotationController};
use poster_kiosk::input::{parse_key, KeyAction};
use poster_kiosk::render::render_view;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "poster_kiosk=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = KioskConfig::from_env().context("Invalid kiosk configuration")?;
    tracing::info!(
        api_url = %config.api_url,
        policy = ?config.list_change_policy,
        "Starting kiosk",
    );

    let push_cancel = CancellationToken::new();
    let api = PosterApi::new(config.api_url.clone(), config.api_token.clone())
        .context("Failed to build HTTP client")?;
    let store = HttpPosterStore::new(api)
        .with_push(config.retry.clone(), push_cancel.clone())
        .context("Failed to start change push")?;
    let store: Arc<dyn PosterStore> = Arc::new(store);

    let controller = RotationController::spawn(store, ControllerOptions::from(&config));

    let mut views = controller.view();
    let renderer = tokio::spawn(async move {
        loop {
            let text = render_view(&views.borrow_and_update());
            println!("\n{text}");
            if views.changed().await.is_err() {
                break;
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read stdin")?,
            result = tokio::signal::ctrl_c() => {
                result.context("Failed to install Ctrl-C handler")?;
                tracing::info!("Received Ctrl-C");
                break;
            }
        };
        let Some(line) = line else {
            tracing::info!("stdin closed");
            break;
        };

        let result = match parse_key(&line) {
            Some(KeyAction::Navigate(direction)) => controller.navigate(direction).await,
            Some(KeyAction::Jump(index)) => controller.jump(index).await,
            Some(KeyAction::Refresh) => controller.refresh().await,
            Some(KeyAction::Quit) => break,
            None => Ok(()),
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, "Command rejected");
        }
    }

    controller.shutdown().await;
    push_cancel.cancel();
    let _ = renderer.await;
    tracing::info!("Kiosk stopped");
    Ok(())
}
