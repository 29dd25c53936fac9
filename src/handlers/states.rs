//! Catalog handlers: list, read, and single-field projections.

use crate::error::AppError;
use crate::extractors::StateCode;
use crate::response::{success_many, success_one_ok};
use crate::service::RequestValidator;
use crate::state::AppState;
use axum::extract::{Query, State};
use serde_json::json;
use std::collections::HashMap;

/// GET /states?contig=true|false — all states with their fun facts merged in.
pub async fn list_states(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let contiguous = RequestValidator::contig_filter(params.get("contig").map(String::as_str))?;
    let views = state.facts.list_views(contiguous).await?;
    Ok(success_many(views))
}

/// GET /states/:state — one state with its fun facts.
pub async fn read_state(
    State(state): State<AppState>,
    StateCode(code): StateCode,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let view = state.facts.state_view(&code).await?;
    Ok(success_one_ok(view))
}

/// GET /states/:state/capital
pub async fn state_capital(
    State(state): State<AppState>,
    StateCode(code): StateCode,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let rec = state.facts.resolve(&code)?;
    Ok(success_one_ok(json!({ "state": rec.name, "capital": rec.capital })))
}

/// GET /states/:state/nickname
pub async fn state_nickname(
    State(state): State<AppState>,
    StateCode(code): StateCode,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let rec = state.facts.resolve(&code)?;
    Ok(success_one_ok(json!({ "state": rec.name, "nickname": rec.nickname })))
}

/// GET /states/:state/population
pub async fn state_population(
    State(state): State<AppState>,
    StateCode(code): StateCode,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let rec = state.facts.resolve(&code)?;
    Ok(success_one_ok(json!({ "state": rec.name, "population": rec.population })))
}

/// GET /states/:state/admission
pub async fn state_admission(
    State(state): State<AppState>,
    StateCode(code): StateCode,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let rec = state.facts.resolve(&code)?;
    Ok(success_one_ok(json!({ "state": rec.name, "admitted": rec.admission_date })))
}
