//! configuration types for iouvault

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// main configuration for iouvault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// database configuration.
    pub database: DatabaseConfig,

    /// log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

/// database configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// database type: "sqlite" or "postgres".
    pub db_type: String,

    /// database connection string or file path.
    pub connection_string: String,

    /// enable write-ahead logging (sqlite only).
    pub write_ahead_log: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_type: "sqlite".to_string(),
            connection_string: "./iouvault.sqlite".to_string(),
            write_ahead_log: true,
        }
    }
}

impl DatabaseConfig {
    /// build a database config from a url.
    ///
    /// accepts `sqlite:<path>`, `sqlite://<path>`, `postgres://...` and `postgresql://...`.
    pub fn from_url(url: &str) -> Result<Self> {
        if let Some(path) = url
            .strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("sqlite:"))
        {
            if path.is_empty() {
                return Err(Error::Config("sqlite url has no path".to_string()));
            }
            Ok(Self {
                db_type: "sqlite".to_string(),
                connection_string: path.to_string(),
                ..Self::default()
            })
        } else if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Ok(Self {
                db_type: "postgres".to_string(),
                connection_string: url.to_string(),
                write_ahead_log: false,
            })
        } else {
            Err(Error::Config(format!(
                "unsupported database url: {} (expected sqlite: or postgres://)",
                url
            )))
        }
    }
}
