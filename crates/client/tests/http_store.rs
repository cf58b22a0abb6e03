//! `HttpPosterStore` against a live `poster-api` router on a loopback port.

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use poster_api::config::{token_digest, ServerConfig};
use poster_api::router::build_app_router;
use poster_api::state::AppState;
use poster_api::ws::{start_change_forwarder, WsManager};
use poster_client::api::PosterApi;
use poster_client::reconnect::ReconnectConfig;
use poster_client::store::HttpPosterStore;
use poster_core::error::CoreError;
use poster_core::memory_store::MemoryStore;
use poster_core::poster::{NewPoster, PosterPatch};
use poster_core::settings::Settings;
use poster_core::store::{PosterStore, StoreEvent, Subscription, SubscriptionEvent};
use tokio_util::sync::CancellationToken;

const TOKEN: &str = "kiosk-admin";

/// Serve the API over a fresh in-memory store; returns the base URL.
async fn spawn_server(config: ServerConfig, cancel: CancellationToken) -> String {
    let store: Arc<dyn PosterStore> = Arc::new(MemoryStore::new());
    let ws_manager = Arc::new(WsManager::new());
    start_change_forwarder(Arc::clone(&store), Arc::clone(&ws_manager), cancel.clone());

    let state = AppState {
        store,
        config: Arc::new(config.clone()),
        ws_manager,
    };
    let app = build_app_router(state, &config);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { cancel.cancelled().await })
            .await
            .unwrap();
    });
    format!("http://{addr}")
}

async fn next(subscription: &mut Subscription) -> SubscriptionEvent {
    tokio::time::timeout(Duration::from_secs(5), subscription.recv())
        .await
        .expect("push event")
}

fn store_for(base_url: &str, token: Option<&str>) -> HttpPosterStore {
    HttpPosterStore::new(PosterApi::new(base_url, token.map(str::to_string)).unwrap())
}

#[tokio::test]
async fn crud_round_trip_over_http() {
    let cancel = CancellationToken::new();
    let url = spawn_server(ServerConfig::default(), cancel.clone()).await;
    let store = store_for(&url, None);

    assert!(store.list_posters().await.unwrap().is_empty());

    let heat = store.add_poster(NewPoster::named("Heat")).await.unwrap();
    let alien = store.add_poster(NewPoster::named("Alien")).await.unwrap();

    let names: Vec<_> = store
        .list_posters()
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, vec!["Heat", "Alien"]);

    let patch = PosterPatch {
        director: Some("Michael Mann".into()),
        ..Default::default()
    };
    let updated = store.update_poster(&heat.id, patch).await.unwrap();
    assert_eq!(updated.director, "Michael Mann");
    assert_eq!(updated.name, "Heat");

    assert_eq!(
        store.get_poster(&heat.id).await.unwrap().unwrap().director,
        "Michael Mann"
    );

    store.delete_poster(&alien.id).await.unwrap();
    // Unknown ids are a no-op.
    store.delete_poster(&alien.id).await.unwrap();
    assert_eq!(store.list_posters().await.unwrap().len(), 1);

    let removed = store
        .delete_posters_batch(&[heat.id.clone(), "missing".into()])
        .await
        .unwrap();
    assert_eq!(removed, 1);
    assert_eq!(store.delete_posters_batch(&[]).await.unwrap(), 0);

    cancel.cancel();
}

#[tokio::test]
async fn ids_with_reserved_characters_address_only_their_poster() {
    let cancel = CancellationToken::new();
    let url = spawn_server(ServerConfig::default(), cancel.clone()).await;
    let store = store_for(&url, None);

    for id in ["m1", "m1?x", "a/b#c%20"] {
        let new = NewPoster {
            id: Some(id.into()),
            ..NewPoster::named(id)
        };
        store.add_poster(new).await.unwrap();
    }

    let odd = store.get_poster("a/b#c%20").await.unwrap().unwrap();
    assert_eq!(odd.name, "a/b#c%20");

    let patch = PosterPatch {
        genre: Some("Drama".into()),
        ..Default::default()
    };
    let updated = store.update_poster("a/b#c%20", patch).await.unwrap();
    assert_eq!(updated.id, "a/b#c%20");
    assert_eq!(store.get_poster("m1").await.unwrap().unwrap().genre, "");

    store.delete_poster("m1?x").await.unwrap();
    store.delete_poster("a/b#c%20").await.unwrap();
    let ids: Vec<_> = store
        .list_posters()
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(ids, vec!["m1"]);

    cancel.cancel();
}

#[tokio::test]
async fn settings_default_then_upsert() {
    let cancel = CancellationToken::new();
    let url = spawn_server(ServerConfig::default(), cancel.clone()).await;
    let store = store_for(&url, None);

    assert_eq!(store.get_settings().await.unwrap(), Settings::default());
    store.save_settings(Settings::new(15)).await.unwrap();
    assert_eq!(store.get_settings().await.unwrap().cycle_speed_secs, 15);

    let err = store.save_settings(Settings::new(0)).await.unwrap_err();
    assert_matches!(err, CoreError::Validation(_));

    cancel.cancel();
}

#[tokio::test]
async fn missing_poster_maps_to_not_found() {
    let cancel = CancellationToken::new();
    let url = spawn_server(ServerConfig::default(), cancel.clone()).await;
    let store = store_for(&url, None);

    assert_eq!(store.get_poster("nope").await.unwrap(), None);

    let err = store
        .update_poster("nope", PosterPatch::default())
        .await
        .unwrap_err();
    assert_eq!(err, CoreError::poster_not_found("nope"));

    cancel.cancel();
}

#[tokio::test]
async fn writes_require_the_admin_token_when_configured() {
    let cancel = CancellationToken::new();
    let config = ServerConfig {
        admin_token_digest: Some(token_digest(TOKEN)),
        ..ServerConfig::default()
    };
    let url = spawn_server(config, cancel.clone()).await;

    let anonymous = store_for(&url, None);
    let err = anonymous
        .add_poster(NewPoster::named("Heat"))
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::Unauthorized(_));
    // Reads stay open.
    assert!(anonymous.list_posters().await.unwrap().is_empty());

    let admin = store_for(&url, Some(TOKEN));
    admin.add_poster(NewPoster::named("Heat")).await.unwrap();

    cancel.cancel();
}

#[tokio::test]
async fn unreachable_service_is_a_network_error() {
    let store = store_for("http://127.0.0.1:1", None);
    let err = store.list_posters().await.unwrap_err();
    assert!(err.is_transient(), "unexpected error: {err:?}");
}

#[tokio::test]
async fn push_delivers_snapshot_and_changes() {
    let cancel = CancellationToken::new();
    let url = spawn_server(ServerConfig::default(), cancel.clone()).await;
    let store = store_for(&url, None)
        .with_push(ReconnectConfig::default(), cancel.clone())
        .unwrap();
    let mut subscription = store.subscribe().expect("push enabled");

    // Connect snapshot.
    assert_eq!(
        next(&mut subscription).await,
        SubscriptionEvent::Event(StoreEvent::Posters(Vec::new()))
    );

    let created = store.add_poster(NewPoster::named("Heat")).await.unwrap();

    loop {
        match next(&mut subscription).await {
            SubscriptionEvent::Event(StoreEvent::Posters(list))
                if list.iter().any(|p| p.id == created.id) =>
            {
                break
            }
            SubscriptionEvent::Closed => panic!("subscription closed"),
            _ => {}
        }
    }

    cancel.cancel();
}

#[tokio::test]
async fn polling_store_has_no_subscription() {
    let store = store_for("http://127.0.0.1:1", None);
    assert!(store.subscribe().is_none());
}
