//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
}

/// Failures while loading the states snapshot.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("snapshot parse: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("snapshot read: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid state code in snapshot: '{0}'")]
    InvalidCode(String),
    #[error("duplicate state code in snapshot: {0}")]
    DuplicateCode(String),
    #[error("snapshot contains no states")]
    Empty,
}

/// Failures reported by a fact store backend.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("decode: {0}")]
    Decode(String),
    #[error("invalid database url: {0}")]
    InvalidUrl(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid state code: {0}")]
    UnknownState(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("no fun facts found for {0}")]
    NoFunFacts(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) | AppError::UnknownState(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) | AppError::NoFunFacts(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "invalid_input",
            AppError::UnknownState(_) => "invalid_state_code",
            AppError::NotFound(_) => "not_found",
            AppError::NoFunFacts(_) => "no_fun_facts",
            AppError::Conflict(_) => "conflict",
            AppError::PayloadTooLarge(_) => "payload_too_large",
            AppError::Store(_) => "store_error",
        }
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Store internals stay in the log; clients get an opaque message.
        let message = match &self {
            AppError::Store(e) => {
                tracing::error!(error = %e, "fact store failure");
                "fact store unavailable".to_string()
            }
            other => other.to_string(),
        };
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code().to_string(),
                message,
                details: None,
            },
        };
        (status, Json(body)).into_response()
    }
}
