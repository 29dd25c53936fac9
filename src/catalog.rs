//! Reference catalog: immutable per-state attributes keyed by two-letter code, loaded once from a snapshot.

use crate::error::CatalogError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Snapshot compiled into the binary.
const BUNDLED_SNAPSHOT: &str = include_str!("../data/states.json");

/// The two states not attached to the contiguous forty-eight.
pub const NON_CONTIGUOUS_CODES: [&str; 2] = ["AK", "HI"];

/// One entry of the snapshot file, as stored on disk.
#[derive(Clone, Debug, Deserialize)]
struct SnapshotEntry {
    code: String,
    state: String,
    capital_city: String,
    nickname: String,
    population: u64,
    admission_date: NaiveDate,
    #[serde(default)]
    admission_number: Option<u32>,
}

/// Static attributes of one state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateRecord {
    pub state_code: String,
    pub name: String,
    pub capital: String,
    pub nickname: String,
    pub population: u64,
    pub admission_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admission_number: Option<u32>,
    pub is_contiguous: bool,
}

/// Trim and upper-case a state code as received from a client.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

fn is_non_contiguous(code: &str) -> bool {
    NON_CONTIGUOUS_CODES.contains(&code)
}

/// In-memory lookup table. Snapshot order is preserved for listing.
#[derive(Clone, Debug)]
pub struct Catalog {
    records: Vec<StateRecord>,
    by_code: HashMap<String, usize>,
}

impl Catalog {
    /// Catalog built from the snapshot bundled with the crate.
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_json(BUNDLED_SNAPSHOT)
    }

    /// Read a snapshot file from disk.
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Parse a snapshot: a JSON array of state entries. Codes must be two ASCII letters and unique.
    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let entries: Vec<SnapshotEntry> = serde_json::from_str(raw)?;
        if entries.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut records = Vec::with_capacity(entries.len());
        let mut by_code = HashMap::with_capacity(entries.len());
        for entry in entries {
            let code = normalize_code(&entry.code);
            if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(CatalogError::InvalidCode(entry.code));
            }
            if by_code.contains_key(&code) {
                return Err(CatalogError::DuplicateCode(code));
            }
            by_code.insert(code.clone(), records.len());
            records.push(StateRecord {
                is_contiguous: !is_non_contiguous(&code),
                state_code: code,
                name: entry.state,
                capital: entry.capital_city,
                nickname: entry.nickname,
                population: entry.population,
                admission_date: entry.admission_date,
                admission_number: entry.admission_number,
            });
        }
        Ok(Catalog { records, by_code })
    }

    /// Case-insensitive lookup. `None` when the code is not a catalog key.
    pub fn lookup(&self, code: &str) -> Option<&StateRecord> {
        self.by_code
            .get(&normalize_code(code))
            .map(|&i| &self.records[i])
    }

    /// All records (`None`), only contiguous ones (`Some(true)`), or only the detached ones (`Some(false)`).
    pub fn list(&self, contiguous: Option<bool>) -> Vec<&StateRecord> {
        self.records
            .iter()
            .filter(|r| contiguous.map_or(true, |want| r.is_contiguous == want))
            .collect()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.state_code.as_str())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
