//! Configuration loading and representation.
//!
//! All settings come from environment variables. Parsing goes through a
//! lookup function so tests never touch the process environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use catalog_observability::LogOutput;
use catalog_products::DEFAULT_MAX_PAGE_SIZE;

pub const BIND_ADDR: &str = "CATALOG_BIND_ADDR";
pub const DATABASE_URL: &str = "DATABASE_URL";
pub const DB_MAX_CONNECTIONS: &str = "CATALOG_DB_MAX_CONNECTIONS";
pub const DB_ACQUIRE_TIMEOUT_SECS: &str = "CATALOG_DB_ACQUIRE_TIMEOUT_SECS";
pub const APPLY_SCHEMA: &str = "CATALOG_APPLY_SCHEMA";
pub const SEED_PATH: &str = "CATALOG_SEED_PATH";
pub const MAX_PAGE_SIZE: &str = "CATALOG_MAX_PAGE_SIZE";
pub const LOG_FORMAT: &str = "CATALOG_LOG_FORMAT";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bind_addr: SocketAddr,
    /// Postgres URL. `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
    pub apply_schema: bool,
    /// JSON seed for the in-memory store.
    pub seed_path: Option<PathBuf>,
    pub max_page_size: u32,
    pub log_format: LogOutput,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            database_url: None,
            db_max_connections: 10,
            db_acquire_timeout: Duration::from_secs(5),
            apply_schema: false,
            seed_path: None,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            log_format: LogOutput::Json,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        Ok(Self {
            bind_addr: parse_or(&get, BIND_ADDR, defaults.bind_addr)?,
            database_url: get(DATABASE_URL),
            db_max_connections: parse_positive(&get, DB_MAX_CONNECTIONS, defaults.db_max_connections)?,
            db_acquire_timeout: Duration::from_secs(parse_positive(
                &get,
                DB_ACQUIRE_TIMEOUT_SECS,
                defaults.db_acquire_timeout.as_secs(),
            )?),
            apply_schema: parse_bool(&get, APPLY_SCHEMA, defaults.apply_schema)?,
            seed_path: get(SEED_PATH).map(PathBuf::from),
            max_page_size: parse_positive(&get, MAX_PAGE_SIZE, defaults.max_page_size)?,
            log_format: parse_or(&get, LOG_FORMAT, defaults.log_format)?,
        })
    }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

fn parse_positive<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + Default,
    G: Fn(&str) -> Option<String>,
{
    let parsed = parse_or(get, key, default)?;
    if parsed <= T::default() {
        return Err(ConfigError::Invalid {
            key,
            value: get(key).unwrap_or_default(),
        });
    }
    Ok(parsed)
}

fn parse_bool<G>(get: &G, key: &'static str, default: bool) -> Result<bool, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(value) => match value.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid { key, value }),
        },
        None => Ok(default),
    }
}
