//! Extract and validate the `:state` path segment against the catalog.

use crate::catalog::normalize_code;
use crate::error::AppError;
use crate::service::RequestValidator;
use crate::state::AppState;
use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

/// Upper-cased state code known to the catalog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateCode(pub String);

#[async_trait]
impl FromRequestParts<AppState> for StateCode {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::InvalidInput(e.body_text()))?;
        if !RequestValidator::is_state_code_shape(&raw) {
            return Err(AppError::UnknownState(raw));
        }
        let code = normalize_code(&raw);
        if state.catalog.lookup(&code).is_none() {
            tracing::debug!(state_code = %code, "rejected unknown state code");
            return Err(AppError::UnknownState(code));
        }
        Ok(StateCode(code))
    }
}
