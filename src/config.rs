//! Configuration management for taskboard.
//!
//! Configuration is set via environment variables:
//! - `TASKBOARD_DATA_DIR` - Required for the SQLite store. Directory holding the database file.
//! - `TASKBOARD_DB_NAME` - Optional. Database name. Defaults to `taskboard`.
//! - `TASK_STORE` - Optional. Storage backend, `sqlite` (default) or `memory`.
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `3000`.

use std::path::PathBuf;
use thiserror::Error;

use crate::api::task_store::TaskStoreType;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Storage backend selection
    pub store_type: TaskStoreType,

    /// Directory holding the SQLite database file
    pub data_dir: Option<PathBuf>,

    /// Database name (file stem for the SQLite backend)
    pub db_name: String,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if the SQLite store is selected
    /// and `TASKBOARD_DATA_DIR` is not set. A missing data dir is a fatal
    /// startup condition, distinct from any per-request error.
    pub fn from_env() -> Result<Self, ConfigError> {
        let store_type = std::env::var("TASK_STORE")
            .map(|s| TaskStoreType::from_str(&s))
            .unwrap_or_default();

        let data_dir = std::env::var("TASKBOARD_DATA_DIR").ok().map(PathBuf::from);
        if store_type == TaskStoreType::Sqlite && data_dir.is_none() {
            return Err(ConfigError::MissingEnvVar("TASKBOARD_DATA_DIR".to_string()));
        }

        let db_name = std::env::var("TASKBOARD_DB_NAME").unwrap_or_else(|_| "taskboard".to_string());

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|e| ConfigError::InvalidValue("PORT".to_string(), format!("{}", e)))?;

        Ok(Self {
            store_type,
            data_dir,
            db_name,
            host,
            port,
        })
    }

    /// Create an in-memory config with default host/port (useful for testing).
    pub fn for_memory_store() -> Self {
        Self {
            store_type: TaskStoreType::Memory,
            data_dir: None,
            db_name: "taskboard".to_string(),
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}
