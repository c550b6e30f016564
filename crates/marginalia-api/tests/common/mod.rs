//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use http_body_util::BodyExt;
use marginalia_api::build_app;
use marginalia_api::rate_limit::RateLimit;
use marginalia_api::state::AppState;
use marginalia_comments::domain::commands::CommentLimits;
use marginalia_core::clock::Clock;
use marginalia_test_support::{FixedClock, InMemoryStore};
use tower::ServiceExt;

/// Fixed timestamp used across all integration tests.
fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock::at(2026, 1, 15, 10, 0, 0))
}

/// A store with the `add-comment` feature flag switched on.
pub fn enabled_store() -> Arc<InMemoryStore> {
    Arc::new(InMemoryStore::new().with_hash_field("feature-flags", "add-comment", "true"))
}

/// Build the full app over `store` with default limits and the production
/// `add-comment` rate limit of 2 per minute.
pub fn build_test_app(store: Arc<InMemoryStore>) -> Router {
    build_test_app_with(store, CommentLimits::default())
}

/// Build the full app with custom input limits.
pub fn build_test_app_with(store: Arc<InMemoryStore>, limits: CommentLimits) -> Router {
    let state = AppState::new(
        fixed_clock(),
        store,
        limits,
        RateLimit::parse(2, "1 m").unwrap(),
    );
    build_app(state)
}

/// Raw response parts for assertions on headers and empty bodies.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    /// Parses the body as JSON.
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

/// Send a request and collect the whole response.
pub async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes().to_vec();
    TestResponse {
        status,
        headers,
        body,
    }
}

/// Send a POST request with a JSON body from the given client IP.
pub async fn post_json_from(
    app: &Router,
    uri: &str,
    client_ip: &str,
    body: &serde_json::Value,
) -> TestResponse {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-forwarded-for", client_ip)
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();
    send(app, request).await
}

/// Client address used by the helpers that do not take one.
pub const DEFAULT_CLIENT: &str = "198.51.100.1";

/// Send a POST request with a JSON body.
pub async fn post_json(app: &Router, uri: &str, body: &serde_json::Value) -> TestResponse {
    post_json_from(app, uri, DEFAULT_CLIENT, body).await
}

/// Send a GET request.
pub async fn get(app: &Router, uri: &str) -> TestResponse {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// Send an OPTIONS request from [`DEFAULT_CLIENT`].
pub async fn options(app: &Router, uri: &str) -> TestResponse {
    let request = Request::builder()
        .method("OPTIONS")
        .uri(uri)
        .header("x-forwarded-for", DEFAULT_CLIENT)
        .header("origin", "https://example.com")
        .header("access-control-request-method", "POST")
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// Asserts the fixed CORS headers are present.
pub fn assert_cors(response: &TestResponse) {
    assert_eq!(response.headers["access-control-allow-origin"], "*");
    assert_eq!(response.headers["access-control-allow-headers"], "Content-Type");
    assert_eq!(
        response.headers["access-control-allow-methods"],
        "GET, POST, PUT, DELETE, OPTIONS"
    );
}
