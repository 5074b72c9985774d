//! CLI configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREGRAPH_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `STOREGRAPH_DB_MAX_CONNECTIONS` - Pool size upper bound (default: 10)
//! - `STOREGRAPH_DB_MIN_CONNECTIONS` - Idle connections kept open (default: 2)
//! - `STOREGRAPH_DB_ACQUIRE_TIMEOUT_SECS` - Wait for a free connection (default: 10)
//! - `STOREGRAPH_LOG_FORMAT` - `text` or `json` (default: text)

use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use storegraph_query::storage::PoolSettings;
use thiserror::Error;

const DATABASE_URL_VAR: &str = "STOREGRAPH_DATABASE_URL";
const MAX_CONNECTIONS_VAR: &str = "STOREGRAPH_DB_MAX_CONNECTIONS";
const MIN_CONNECTIONS_VAR: &str = "STOREGRAPH_DB_MIN_CONNECTIONS";
const ACQUIRE_TIMEOUT_VAR: &str = "STOREGRAPH_DB_ACQUIRE_TIMEOUT_SECS";
const LOG_FORMAT_VAR: &str = "STOREGRAPH_LOG_FORMAT";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("expected `text` or `json`, got `{other}`")),
        }
    }
}

/// Log settings, readable before the rest of the configuration so that
/// configuration errors can be logged.
#[derive(Debug, Clone, Copy)]
pub struct LogConfig {
    pub format: LogFormat,
}

impl LogConfig {
    /// Load log settings from the environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` for an unknown format.
    pub fn from_env() -> Result<Self, ConfigError> {
        let format = get_optional_env(LOG_FORMAT_VAR)
            .map(|value| {
                value
                    .parse()
                    .map_err(|reason| ConfigError::InvalidEnvVar(LOG_FORMAT_VAR.to_string(), reason))
            })
            .transpose()?
            .unwrap_or_default();
        Ok(Self { format })
    }
}

/// Database configuration for the CLI.
///
/// Implements `Debug` manually to redact the connection string.
#[derive(Clone)]
pub struct CliConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// Pool sizing
    pub pool: PoolSettings,
}

impl std::fmt::Debug for CliConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CliConfig")
            .field("database_url", &"[REDACTED]")
            .field("pool", &self.pool)
            .finish()
    }
}

impl CliConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the database URL is missing, a pool setting
    /// does not parse, or the minimum pool size exceeds the maximum.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = get_database_url(DATABASE_URL_VAR)?;
        let defaults = PoolSettings::default();

        let max_connections: u32 = parse_env_or(MAX_CONNECTIONS_VAR, defaults.max_connections)?;
        let min_connections: u32 = parse_env_or(MIN_CONNECTIONS_VAR, defaults.min_connections)?;
        let acquire_timeout_secs: u64 =
            parse_env_or(ACQUIRE_TIMEOUT_VAR, defaults.acquire_timeout.as_secs())?;

        let pool = PoolSettings {
            max_connections,
            min_connections,
            acquire_timeout: Duration::from_secs(acquire_timeout_secs),
        };
        validate_pool(&pool)?;

        Ok(Self { database_url, pool })
    }
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Parse an environment variable, or use `default` when unset.
fn parse_env_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |value| parse_value(key, &value))
}

fn parse_value<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn validate_pool(pool: &PoolSettings) -> Result<(), ConfigError> {
    if pool.max_connections == 0 {
        return Err(ConfigError::InvalidEnvVar(
            MAX_CONNECTIONS_VAR.to_string(),
            "must be at least 1".to_string(),
        ));
    }
    if pool.min_connections > pool.max_connections {
        return Err(ConfigError::InvalidEnvVar(
            MIN_CONNECTIONS_VAR.to_string(),
            format!(
                "must not exceed {MAX_CONNECTIONS_VAR} ({} > {})",
                pool.min_connections, pool.max_connections
            ),
        ));
    }
    Ok(())
}
