//! PostgreSQL fact store. One row per state code; facts kept as a JSONB array.
//! The table lives in the schema named by `STATES_SCHEMA` (default `public`).

use super::{FactSheet, FactStore};
use crate::error::StoreError;
use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::ConnectOptions;
use sqlx::PgPool;
use std::str::FromStr;

const FACTS_TABLE: &str = "state_funfacts";

#[derive(Clone)]
pub struct PgFactStore {
    pool: PgPool,
    table: String,
}

impl PgFactStore {
    /// `schema` must already be a validated identifier (see `AppConfig`).
    pub fn new(pool: PgPool, schema: &str) -> Self {
        PgFactStore {
            pool,
            table: format!("{}.{}", schema, FACTS_TABLE),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the schema and facts table if they do not exist.
    pub async fn ensure_tables(&self) -> Result<(), StoreError> {
        if let Some((schema, _)) = self.table.split_once('.') {
            sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", schema))
                .execute(&self.pool)
                .await?;
        }
        let ddl = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                state_code TEXT PRIMARY KEY,
                facts JSONB NOT NULL DEFAULT '[]'::jsonb,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            self.table
        );
        sqlx::query(&ddl).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl FactStore for PgFactStore {
    async fn get(&self, state_code: &str) -> Result<Option<FactSheet>, StoreError> {
        let row: Option<(Json<Vec<String>>,)> = sqlx::query_as(&format!(
            "SELECT facts FROM {} WHERE state_code = $1",
            self.table
        ))
        .bind(state_code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(Json(facts),)| FactSheet::new(state_code, facts)))
    }

    async fn put(&self, sheet: &FactSheet) -> Result<(), StoreError> {
        let sql = format!(
            r#"
            INSERT INTO {} (state_code, facts, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (state_code)
            DO UPDATE SET facts = $2, updated_at = NOW()
            "#,
            self.table
        );
        sqlx::query(&sql)
            .bind(&sheet.state_code)
            .bind(Json(&sheet.facts))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<FactSheet>, StoreError> {
        let rows: Vec<(String, serde_json::Value)> = sqlx::query_as(&format!(
            "SELECT state_code, facts FROM {} ORDER BY state_code",
            self.table
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter()
            .map(|(code, value)| {
                let facts: Vec<String> = serde_json::from_value(value)
                    .map_err(|e| StoreError::Decode(format!("facts for {}: {}", code, e)))?;
                Ok(FactSheet::new(code, facts))
            })
            .collect()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database to run CREATE DATABASE. Call before creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), StoreError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| StoreError::InvalidUrl(e.to_string()))?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), StoreError> {
    let path_start = url
        .rfind('/')
        .ok_or_else(|| StoreError::InvalidUrl("no database path".into()))?
        + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    let admin_url = format!("{}postgres", base);
    Ok((admin_url, db_name.to_string()))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
