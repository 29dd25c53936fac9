//! Router assembly.

pub mod common;
pub mod states;

pub use common::common_routes;
pub use states::state_routes;

use crate::error::AppError;
use crate::state::AppState;
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{middleware, Router};
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("no route for {}", uri.path()))
}

/// `RequestBodyLimitLayer` answers oversized bodies with plain text; give them the API error shape.
async fn payload_too_large(response: Response) -> Response {
    if response.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::PayloadTooLarge("request body exceeds the configured limit".into()).into_response();
    }
    response
}

/// Full application router: common routes, state routes, JSON 404 fallback, tracing, CORS and body limit.
pub fn app(state: AppState, body_limit_bytes: usize) -> Router {
    Router::new()
        .merge(common_routes(state.clone()))
        .merge(state_routes(state))
        .fallback(not_found)
        .layer(RequestBodyLimitLayer::new(body_limit_bytes))
        .layer(middleware::map_response(payload_too_large))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
