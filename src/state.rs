//! Shared application state for all routes. Built once at startup and cloned per request.

use crate::catalog::Catalog;
use crate::service::{DuplicatePolicy, FactService};
use crate::store::FactStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub facts: FactService,
}

impl AppState {
    pub fn new(catalog: Catalog, store: Arc<dyn FactStore>, policy: DuplicatePolicy) -> Self {
        let catalog = Arc::new(catalog);
        AppState {
            facts: FactService::new(catalog.clone(), store, policy),
            catalog,
        }
    }
}
