//! States API server: loads the catalog, connects the fact store, and serves the REST routes.
//!
//! Run from repo root: `cargo run -p states-server`

use states_api::{app, ensure_database_exists, AppConfig, AppState, Catalog, FactStore, MemoryFactStore, PgFactStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("states_api=info,states_server=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    let catalog = match &config.states_data_path {
        Some(path) => Catalog::from_path(path)?,
        None => Catalog::bundled()?,
    };
    tracing::info!(states = catalog.len(), "catalog loaded");

    let store: Arc<dyn FactStore> = match &config.database_url {
        Some(database_url) => {
            ensure_database_exists(database_url).await?;
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(config.max_connections)
                .acquire_timeout(Duration::from_secs(5))
                .connect(database_url)
                .await?;
            let store = PgFactStore::new(pool, &config.schema);
            store.ensure_tables().await?;
            tracing::info!(schema = %config.schema, "using postgres fact store");
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; fun facts are kept in memory and lost on exit");
            Arc::new(MemoryFactStore::new())
        }
    };

    let state = AppState::new(catalog, store, config.duplicate_policy);
    let router = app(state, config.body_limit_bytes);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
