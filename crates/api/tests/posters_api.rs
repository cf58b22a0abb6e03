//! HTTP-level integration tests for the poster endpoints.
//!
//! Uses tower's `ServiceExt::oneshot` against the full router over an
//! in-memory store.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{body_bytes, body_json, delete, get, patch_json, post_json, post_json_auth};
use poster_core::memory_store::MemoryStore;
use poster_core::poster::NewPoster;
use poster_core::store::PosterStore;
use serde_json::json;

fn store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new())
}

async fn seeded(names: &[&str]) -> (Arc<MemoryStore>, Vec<String>) {
    let store = store();
    let mut ids = Vec::new();
    for name in names {
        ids.push(store.add_poster(NewPoster::named(*name)).await.unwrap().id);
    }
    (store, ids)
}

// ---------------------------------------------------------------------------
// Create / read
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_poster_returns_201_with_assigned_id() {
    let store = store();
    let app = common::build_test_app(store.clone());

    let response = post_json(
        app,
        "/api/v1/posters",
        json!({"name": "Heat", "director": "Michael Mann"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["name"], "Heat");
    assert_eq!(json["data"]["director"], "Michael Mann");
    assert_eq!(json["data"]["rating"], "");
    assert!(!json["data"]["id"].as_str().unwrap().is_empty());
    assert_eq!(store.list_posters().await.unwrap().len(), 1);
}

#[tokio::test]
async fn create_poster_without_name_is_rejected() {
    let app = common::build_test_app(store());
    let response = post_json(app, "/api/v1/posters", json!({"name": ""})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn create_with_duplicate_id_conflicts() {
    let app = common::build_test_app(store());
    let body = json!({"id": "heat", "name": "Heat"});

    let first = post_json(app.clone(), "/api/v1/posters", body.clone()).await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = post_json(app, "/api/v1/posters", body).await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn list_returns_posters_in_insertion_order() {
    let (store, _) = seeded(&["Zulu", "Alpha", "Mike"]).await;
    let app = common::build_test_app(store);

    let json = body_json(get(app, "/api/v1/posters").await).await;
    let names: Vec<_> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap().to_string())
        .collect();

    assert_eq!(names, vec!["Zulu", "Alpha", "Mike"]);
}

#[tokio::test]
async fn empty_list_is_an_empty_array() {
    let app = common::build_test_app(store());
    let json = body_json(get(app, "/api/v1/posters").await).await;
    assert_eq!(json["data"], json!([]));
}

#[tokio::test]
async fn get_unknown_poster_returns_404() {
    let app = common::build_test_app(store());
    let response = get(app, "/api/v1/posters/ghost").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Update / delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn patch_changes_only_supplied_fields() {
    let (store, ids) = seeded(&["Heat"]).await;
    let app = common::build_test_app(store);

    let response = patch_json(
        app,
        &format!("/api/v1/posters/{}", ids[0]),
        json!({"rating": "R"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["name"], "Heat");
    assert_eq!(json["data"]["rating"], "R");
}

#[tokio::test]
async fn patch_unknown_poster_returns_404() {
    let app = common::build_test_app(store());
    let response = patch_json(app, "/api/v1/posters/ghost", json!({"rating": "R"})).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_returns_204_even_for_unknown_ids() {
    let (store, ids) = seeded(&["Heat"]).await;
    let app = common::build_test_app(store.clone());

    let response = delete(app.clone(), &format!("/api/v1/posters/{}", ids[0])).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(store.list_posters().await.unwrap().is_empty());

    let response = delete(app, "/api/v1/posters/ghost").await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn batch_delete_skips_missing_ids() {
    let (store, ids) = seeded(&["A", "B", "C"]).await;
    let app = common::build_test_app(store.clone());

    let response = post_json(
        app,
        "/api/v1/posters/batchDelete",
        json!({"ids": [ids[0], "missing", ids[2]]}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["deleted"], 2);

    let remaining = store.list_posters().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].name, "B");
}

// ---------------------------------------------------------------------------
// Info export
// ---------------------------------------------------------------------------

#[tokio::test]
async fn info_export_is_a_text_attachment() {
    let store = store();
    let created = store
        .add_poster(NewPoster {
            name: "Blade Runner".to_string(),
            genre: "Sci-Fi".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    let app = common::build_test_app(store);

    let response = get(app, &format!("/api/v1/posters/{}/info", created.id)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-disposition"],
        "attachment; filename=\"Blade_Runner_info.txt\""
    );
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));

    let text = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(text.starts_with("Name: Blade Runner\n"));
    assert!(text.contains("Genre: Sci-Fi"));
}

// ---------------------------------------------------------------------------
// Admin token
// ---------------------------------------------------------------------------

#[tokio::test]
async fn writes_require_admin_token_when_configured() {
    let store = store();
    let app = common::build_secured_app(store.clone());

    let anonymous = post_json(app.clone(), "/api/v1/posters", json!({"name": "Heat"})).await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let wrong = post_json_auth(
        app.clone(),
        "/api/v1/posters",
        json!({"name": "Heat"}),
        "not-the-token",
    )
    .await;
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

    let ok = post_json_auth(
        app.clone(),
        "/api/v1/posters",
        json!({"name": "Heat"}),
        common::ADMIN_TOKEN,
    )
    .await;
    assert_eq!(ok.status(), StatusCode::CREATED);

    // Reads stay public.
    let list = get(app, "/api/v1/posters").await;
    assert_eq!(list.status(), StatusCode::OK);
    assert_eq!(store.list_posters().await.unwrap().len(), 1);
}
