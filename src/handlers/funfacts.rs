//! Fun-fact handlers: random read plus add, update, delete by 1-based index.

use crate::error::AppError;
use crate::extractors::{JsonBody, StateCode};
use crate::response::{success_one, success_one_ok};
use crate::service::RequestValidator;
use crate::state::AppState;
use axum::extract::State;
use serde_json::json;

/// GET /states/:state/funfact — one fact at random.
pub async fn random_funfact(
    State(state): State<AppState>,
    StateCode(code): StateCode,
) -> Result<impl axum::response::IntoResponse, AppError> {
    match state.facts.get_random_fact(&code).await? {
        Some(fact) => Ok(success_one_ok(json!({ "funfact": fact }))),
        None => {
            let name = state.facts.resolve(&code)?.name.clone();
            Err(AppError::NoFunFacts(name))
        }
    }
}

/// POST /states/:state/funfact — body `{ "funfacts": [...] }`.
pub async fn add_funfacts(
    State(state): State<AppState>,
    StateCode(code): StateCode,
    JsonBody(body): JsonBody,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let req = RequestValidator::add_facts(&body)?;
    let sheet = state.facts.add_facts(&code, req.funfacts).await?;
    Ok(success_one(sheet))
}

/// PATCH /states/:state/funfact — body `{ "index": n, "funfact": "..." }`.
pub async fn update_funfact(
    State(state): State<AppState>,
    StateCode(code): StateCode,
    JsonBody(body): JsonBody,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let req = RequestValidator::update_fact(&body)?;
    let sheet = state.facts.update_fact(&code, req.index, req.funfact).await?;
    Ok(success_one_ok(sheet))
}

/// DELETE /states/:state/funfact — body `{ "index": n }`.
pub async fn delete_funfact(
    State(state): State<AppState>,
    StateCode(code): StateCode,
    JsonBody(body): JsonBody,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let req = RequestValidator::delete_fact(&body)?;
    let sheet = state.facts.delete_fact(&code, req.index).await?;
    Ok(success_one_ok(sheet))
}
