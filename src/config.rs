//! Runtime configuration from environment variables (a `.env` file is honoured by the binary).

use crate::error::ConfigError;
use crate::service::DuplicatePolicy;
use regex::Regex;
use std::path::PathBuf;
use std::sync::OnceLock;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3500";
pub const DEFAULT_SCHEMA: &str = "public";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 64 * 1024;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub bind_addr: String,
    /// Fun facts are kept in memory when unset.
    pub database_url: Option<String>,
    /// Schema holding the facts table. Must be a valid PostgreSQL identifier.
    pub schema: String,
    pub max_connections: u32,
    /// Snapshot override; the bundled `data/states.json` is used when unset.
    pub states_data_path: Option<PathBuf>,
    pub duplicate_policy: DuplicatePolicy,
    pub body_limit_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            bind_addr: DEFAULT_BIND_ADDR.into(),
            database_url: None,
            schema: DEFAULT_SCHEMA.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            states_data_path: None,
            duplicate_policy: DuplicatePolicy::Allow,
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
        }
    }
}

impl AppConfig {
    /// Read `BIND_ADDR`, `DATABASE_URL`, `STATES_SCHEMA`, `DB_MAX_CONNECTIONS`,
    /// `STATES_DATA_PATH`, `FUNFACT_DUPLICATES` and `BODY_LIMIT_BYTES`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = AppConfig::default();

        let schema = get("STATES_SCHEMA").unwrap_or(defaults.schema);
        if !is_identifier(&schema) {
            return Err(ConfigError::InvalidValue {
                key: "STATES_SCHEMA",
                message: format!("'{}' is not a valid identifier", schema),
            });
        }

        let max_connections: u32 = match get("DB_MAX_CONNECTIONS") {
            Some(v) => v.parse().map_err(|_| ConfigError::InvalidValue {
                key: "DB_MAX_CONNECTIONS",
                message: format!("expected a positive integer, got '{}'", v),
            })?,
            None => defaults.max_connections,
        };
        if max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                key: "DB_MAX_CONNECTIONS",
                message: "must be at least 1".into(),
            });
        }

        let duplicate_policy: DuplicatePolicy = match get("FUNFACT_DUPLICATES") {
            Some(v) => v.parse().map_err(|message| ConfigError::InvalidValue {
                key: "FUNFACT_DUPLICATES",
                message,
            })?,
            None => defaults.duplicate_policy,
        };

        let body_limit_bytes: usize = match get("BODY_LIMIT_BYTES") {
            Some(v) => v.parse().map_err(|_| ConfigError::InvalidValue {
                key: "BODY_LIMIT_BYTES",
                message: format!("expected a byte count, got '{}'", v),
            })?,
            None => defaults.body_limit_bytes,
        };

        Ok(AppConfig {
            bind_addr: get("BIND_ADDR").unwrap_or(defaults.bind_addr),
            database_url: get("DATABASE_URL"),
            schema,
            max_connections,
            states_data_path: get("STATES_DATA_PATH").map(PathBuf::from),
            duplicate_policy,
            body_limit_bytes,
        })
    }
}

fn is_identifier(s: &str) -> bool {
    static IDENT: OnceLock<Regex> = OnceLock::new();
    IDENT
        .get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,62}$").expect("static pattern"))
        .is_match(s)
}
