//! Shared helpers for router-level tests.

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use states_api::{app, AppState, Catalog, DuplicatePolicy, FactStore, MemoryFactStore};
use std::sync::Arc;
use tower::ServiceExt;

pub const TEST_BODY_LIMIT: usize = 16 * 1024;

pub fn test_app(policy: DuplicatePolicy) -> Router {
    app_with_store(Arc::new(MemoryFactStore::new()), policy)
}

pub fn app_with_store(store: Arc<dyn FactStore>, policy: DuplicatePolicy) -> Router {
    let catalog = Catalog::bundled().unwrap_or_else(|err| panic!("bundled catalog: {err}"));
    let state = AppState::new(catalog, store, policy);
    app(state, TEST_BODY_LIMIT)
}

/// Send one request and return status plus parsed JSON body (`Value::Null` when empty).
pub async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap_or_else(|err| panic!("failed to build request: {err}"));
    send_request(router, request).await
}

pub async fn send_request(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = match router.clone().oneshot(request).await {
        Ok(response) => response,
        Err(err) => panic!("router request failed: {err}"),
    };
    let status = response.status();
    let bytes = match to_bytes(response.into_body(), 1024 * 1024).await {
        Ok(bytes) => bytes,
        Err(err) => panic!("failed to read response body: {err}"),
    };
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|err| panic!("response is not JSON: {err}"))
    };
    (status, value)
}

pub fn error_code(body: &Value) -> Option<&str> {
    body.pointer("/error/code").and_then(Value::as_str)
}

pub fn funfacts(body: &Value) -> Vec<String> {
    body.pointer("/data/funfacts")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(|v| v.as_str().map(String::from)).collect())
        .unwrap_or_default()
}
