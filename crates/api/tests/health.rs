//! Integration tests for the health check endpoint and general HTTP behaviour.

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{body_json, get, send};
use poster_api::config::ServerConfig;
use poster_core::memory_store::MemoryStore;

#[tokio::test]
async fn health_check_returns_ok_with_json() {
    let app = common::build_test_app(Arc::new(MemoryStore::new()));
    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["store_healthy"], true);
    assert_eq!(json["ws_connections"], 0);
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let app = common::build_test_app(Arc::new(MemoryStore::new()));
    let response = get(app, "/this-route-does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn response_contains_x_request_id_header() {
    let app = common::build_test_app(Arc::new(MemoryStore::new()));
    let response = get(app, "/health").await;

    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("Response must contain an x-request-id header");
    assert_eq!(request_id.to_str().unwrap().len(), 36);
}

fn preflight(origin: &str) -> Request<Body> {
    Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/v1/posters")
        .header("origin", origin)
        .header("access-control-request-method", "PATCH")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn cors_admits_only_configured_origins() {
    let config = ServerConfig {
        cors_origins: vec!["http://admin.local".to_string()],
        ..common::test_config()
    };
    let app = common::build_app_with_config(Arc::new(MemoryStore::new()), config);

    let allowed = send(app.clone(), preflight("http://admin.local")).await;
    assert_eq!(
        allowed.headers()["access-control-allow-origin"],
        "http://admin.local"
    );
    assert_eq!(allowed.headers()["access-control-allow-credentials"], "true");

    let other = send(app, preflight("http://elsewhere.local")).await;
    assert!(other.headers().get("access-control-allow-origin").is_none());
}

#[tokio::test]
async fn wildcard_cors_admits_any_kiosk_origin() {
    let config = ServerConfig {
        cors_origins: vec!["*".to_string()],
        ..common::test_config()
    };
    let app = common::build_app_with_config(Arc::new(MemoryStore::new()), config);

    let response = send(app, preflight("http://kiosk-7.lan")).await;
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    assert!(response
        .headers()
        .get("access-control-allow-credentials")
        .is_none());
}
