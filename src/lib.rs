//! States API: U.S. states reference data merged with crowd-sourced fun facts, served over REST.

pub mod catalog;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod response;
pub mod routes;
pub mod service;
pub mod state;
pub mod store;

pub use catalog::{Catalog, StateRecord, NON_CONTIGUOUS_CODES};
pub use config::AppConfig;
pub use error::{AppError, CatalogError, ConfigError, StoreError};
pub use response::{success_many, success_one};
pub use routes::{app, common_routes, state_routes};
pub use service::{DuplicatePolicy, FactService, MergedStateView};
pub use state::AppState;
pub use store::{ensure_database_exists, FactSheet, FactStore, MemoryFactStore, PgFactStore};
