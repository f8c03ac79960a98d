//! Application configuration.
//!
//! Loaded once at start-up from environment variables (a `.env` file is
//! honoured via `dotenvy` in `main`).
//!
//! # Environment Variables
//!
//! - `STORE_MODE`: `in_memory` (default) | `sqlite`
//! - `DATABASE_URL`: `SQLite` URL, required when `STORE_MODE=sqlite`
//! - `DATABASE_MAX_CONNECTIONS`: pool size (default: `5`)
//! - `CLIENTS_SEED_PATH`: JSON array of clients loaded into an empty store
//! - `HOST`: bind host (default: `0.0.0.0`)
//! - `PORT`: bind port (default: `3000`)
//! - `LOG_FORMAT`: `text` (default) | `json`

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

// =============================================================================
// Configuration Types
// =============================================================================

/// Which [`ClientStore`](crate::infrastructure::ClientStore) backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreMode {
    /// Process-local map. Contents are lost on exit.
    #[default]
    InMemory,
    /// `SQLite` database file.
    Sqlite,
}

impl FromStr for StoreMode {
    type Err = ConfigurationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "in_memory" | "inmemory" | "memory" => Ok(Self::InMemory),
            "sqlite" | "sqlite3" => Ok(Self::Sqlite),
            _ => Err(ConfigurationError::InvalidStoreMode(value.to_string())),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigurationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(ConfigurationError::InvalidValue {
                key: "LOG_FORMAT".to_string(),
                message: format!("expected `text` or `json`, got {value:?}"),
            }),
        }
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// `STORE_MODE` is not a known mode.
    #[error("invalid STORE_MODE: {0:?} (expected `in_memory` or `sqlite`)")]
    InvalidStoreMode(String),

    /// `STORE_MODE=sqlite` without `DATABASE_URL`.
    #[error("DATABASE_URL is required when STORE_MODE=sqlite")]
    MissingDatabaseUrl,

    /// A variable is set but cannot be used.
    #[error("invalid value for {key}: {message}")]
    InvalidValue {
        /// Variable name.
        key: String,
        /// What is wrong with it.
        message: String,
    },
}

/// Runtime configuration for the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Store backend.
    pub store_mode: StoreMode,
    /// `SQLite` URL, e.g. `sqlite://clients.db`.
    pub database_url: Option<String>,
    /// Maximum pooled database connections.
    pub max_connections: u32,
    /// Optional JSON seed file.
    pub seed_path: Option<PathBuf>,
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_mode: StoreMode::default(),
            database_url: None,
            max_connections: 5,
            seed_path: None,
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] if a variable holds an invalid value or
    /// `DATABASE_URL` is missing in `sqlite` mode.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through `lookup`, which maps a variable name to
    /// its value. Empty and whitespace-only values count as unset.
    ///
    /// # Errors
    ///
    /// See [`AppConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        let store_mode = read("STORE_MODE")
            .map(|value| value.parse::<StoreMode>())
            .transpose()?
            .unwrap_or(defaults.store_mode);
        let log_format = read("LOG_FORMAT")
            .map(|value| value.parse::<LogFormat>())
            .transpose()?
            .unwrap_or(defaults.log_format);
        let max_connections =
            parse_optional(read("DATABASE_MAX_CONNECTIONS"), "DATABASE_MAX_CONNECTIONS")?
                .unwrap_or(defaults.max_connections);
        let port = parse_optional(read("PORT"), "PORT")?.unwrap_or(defaults.port);

        let config = Self {
            store_mode,
            database_url: read("DATABASE_URL"),
            max_connections,
            seed_path: read("CLIENTS_SEED_PATH").map(PathBuf::from),
            host: read("HOST").unwrap_or(defaults.host),
            port,
            log_format,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validates cross-field requirements.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] if `DATABASE_URL` is missing in
    /// `sqlite` mode or the pool size is zero.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.store_mode == StoreMode::Sqlite && self.database_url.is_none() {
            return Err(ConfigurationError::MissingDatabaseUrl);
        }
        if self.max_connections == 0 {
            return Err(ConfigurationError::InvalidValue {
                key: "DATABASE_MAX_CONNECTIONS".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    /// `host:port` string for binding the listener.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_optional<T>(value: Option<String>, key: &str) -> Result<Option<T>, ConfigurationError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|error| ConfigurationError::InvalidValue {
                    key: key.to_string(),
                    message: format!("{raw:?}: {error}"),
                })
        })
        .transpose()
}

// =============================================================================
// Tests
// =============================================================================
