//! Request body validation: untyped JSON in, typed fun-fact requests out.

use crate::error::AppError;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

/// Body of `POST /states/:state/funfact`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddFactsRequest {
    pub funfacts: Vec<String>,
}

/// Body of `PATCH /states/:state/funfact`. `index` is 1-based; range is checked against the stored list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpdateFactRequest {
    pub index: i64,
    pub funfact: String,
}

/// Body of `DELETE /states/:state/funfact`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeleteFactRequest {
    pub index: i64,
}

pub struct RequestValidator;

impl RequestValidator {
    pub fn add_facts(body: &Value) -> Result<AddFactsRequest, AppError> {
        let obj = as_object(body)?;
        let items = match obj.get("funfacts") {
            None | Some(Value::Null) => {
                return Err(AppError::InvalidInput("funfacts is required".into()));
            }
            Some(Value::Array(items)) => items,
            Some(_) => {
                return Err(AppError::InvalidInput("funfacts must be an array".into()));
            }
        };
        if items.is_empty() {
            return Err(AppError::InvalidInput("funfacts must not be empty".into()));
        }
        let mut funfacts = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            match item.as_str() {
                Some(s) if !s.trim().is_empty() => funfacts.push(s.to_string()),
                _ => {
                    return Err(AppError::InvalidInput(format!(
                        "funfacts[{}] must be a non-empty string",
                        i
                    )));
                }
            }
        }
        Ok(AddFactsRequest { funfacts })
    }

    pub fn update_fact(body: &Value) -> Result<UpdateFactRequest, AppError> {
        let obj = as_object(body)?;
        let index = parse_index(obj)?;
        let funfact = match obj.get("funfact").or_else(|| obj.get("funFact")) {
            None | Some(Value::Null) => {
                return Err(AppError::InvalidInput("funfact is required".into()));
            }
            Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
            Some(_) => {
                return Err(AppError::InvalidInput("funfact must be a non-empty string".into()));
            }
        };
        Ok(UpdateFactRequest { index, funfact })
    }

    pub fn delete_fact(body: &Value) -> Result<DeleteFactRequest, AppError> {
        let obj = as_object(body)?;
        Ok(DeleteFactRequest {
            index: parse_index(obj)?,
        })
    }

    /// `contig` query value: `true` or `false`, case-insensitive.
    pub fn contig_filter(raw: Option<&str>) -> Result<Option<bool>, AppError> {
        match raw.map(str::trim) {
            None => Ok(None),
            Some(s) if s.eq_ignore_ascii_case("true") => Ok(Some(true)),
            Some(s) if s.eq_ignore_ascii_case("false") => Ok(Some(false)),
            Some(s) => Err(AppError::InvalidInput(format!(
                "contig must be true or false, got '{}'",
                s
            ))),
        }
    }

    /// True when `raw` has the shape of a state code (two ASCII letters, any case).
    pub fn is_state_code_shape(raw: &str) -> bool {
        static CODE: OnceLock<Regex> = OnceLock::new();
        CODE.get_or_init(|| Regex::new(r"^[A-Za-z]{2}$").expect("static pattern"))
            .is_match(raw.trim())
    }
}

fn as_object(body: &Value) -> Result<&Map<String, Value>, AppError> {
    body.as_object()
        .ok_or_else(|| AppError::InvalidInput("body must be a JSON object".into()))
}

/// Accept a JSON integer or a string of decimal digits. Floats, bools and other strings are rejected.
fn parse_index(obj: &Map<String, Value>) -> Result<i64, AppError> {
    match obj.get("index") {
        None | Some(Value::Null) => Err(AppError::InvalidInput("index is required".into())),
        Some(Value::Number(n)) => n
            .as_i64()
            .ok_or_else(|| AppError::InvalidInput("index must be an integer".into())),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| AppError::InvalidInput(format!("index must be numeric, got '{}'", s))),
        Some(_) => Err(AppError::InvalidInput("index must be an integer".into())),
    }
}
