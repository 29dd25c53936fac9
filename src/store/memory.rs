//! In-process fact store, used when no database is configured.

use super::{FactSheet, FactStore};
use crate::error::StoreError;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryFactStore {
    sheets: RwLock<HashMap<String, Vec<String>>>,
}

impl MemoryFactStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FactStore for MemoryFactStore {
    async fn get(&self, state_code: &str) -> Result<Option<FactSheet>, StoreError> {
        let sheets = self.sheets.read().await;
        Ok(sheets
            .get(state_code)
            .map(|facts| FactSheet::new(state_code, facts.clone())))
    }

    async fn put(&self, sheet: &FactSheet) -> Result<(), StoreError> {
        self.sheets
            .write()
            .await
            .insert(sheet.state_code.clone(), sheet.facts.clone());
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<FactSheet>, StoreError> {
        let sheets = self.sheets.read().await;
        let mut out: Vec<FactSheet> = sheets
            .iter()
            .map(|(code, facts)| FactSheet::new(code.clone(), facts.clone()))
            .collect();
        out.sort_by(|a, b| a.state_code.cmp(&b.state_code));
        Ok(out)
    }
}
