//! Fact store: key-value access to per-state fun-fact lists.

pub mod memory;
pub mod postgres;

use crate::error::StoreError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use memory::MemoryFactStore;
pub use postgres::{ensure_database_exists, PgFactStore};

/// Ordered fun facts for one state code.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactSheet {
    pub state_code: String,
    #[serde(rename = "funfacts")]
    pub facts: Vec<String>,
}

impl FactSheet {
    pub fn new(state_code: impl Into<String>, facts: Vec<String>) -> Self {
        FactSheet {
            state_code: state_code.into(),
            facts,
        }
    }
}

/// Backend holding fact sheets keyed by state code. Writes replace the whole sheet.
#[async_trait]
pub trait FactStore: Send + Sync {
    async fn get(&self, state_code: &str) -> Result<Option<FactSheet>, StoreError>;

    /// Insert or replace the sheet for `sheet.state_code`.
    async fn put(&self, sheet: &FactSheet) -> Result<(), StoreError>;

    async fn list_all(&self) -> Result<Vec<FactSheet>, StoreError>;

    /// Cheap reachability check for readiness probes.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
