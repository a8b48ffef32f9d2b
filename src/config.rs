//! Configuration file handling for sessions.
//!
//! This module provides loading and parsing of `.cql_marshal.json`
//! configuration files. Every field has a default, so `{}` is a valid file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::db::CqlError;

const CONFIG_FILE: &str = ".cql_marshal.json";

/// Top-level configuration file structure.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub connection: ConnectionConfig,

    #[serde(default)]
    pub dialect: Dialect,
}

/// Session settings applied when a [`Database`](crate::db::Database) connects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Keyspace selected on connect
    #[serde(default = "default_keyspace")]
    pub keyspace: String,

    /// Query-language version requested from the transport, if any
    #[serde(default)]
    pub cql_version: Option<String>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            keyspace: default_keyspace(),
            cql_version: None,
        }
    }
}

fn default_keyspace() -> String {
    "system".to_string()
}

/// Literal conventions used when rendering statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Dialect {
    #[serde(default)]
    pub time_literal: TimeLiteral,

    /// Deflate statements before handing them to the transport
    #[serde(default)]
    pub compression: bool,
}

/// How time instants are written into statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeLiteral {
    /// Unquoted milliseconds since the Unix epoch
    #[default]
    EpochMillis,
    /// A quoted version 1 UUID embedding the instant
    TimeUuid,
}

impl ConfigFile {
    /// Load configuration from `.cql_marshal.json` in the current directory.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file doesn't exist
    /// - The file cannot be read
    /// - The JSON is invalid
    pub fn load() -> Result<Self, CqlError> {
        let config_path = PathBuf::from(CONFIG_FILE);

        if !config_path.exists() {
            return Err(CqlError::Config {
                message: format!(
                    "Configuration file not found: {CONFIG_FILE}\n\n\
                     Please create a {CONFIG_FILE} file in the current directory.\n\n\
                     Example:\n\
                     {{\n  \
                       \"connection\": {{\n    \
                         \"keyspace\": \"app\",\n    \
                         \"cql_version\": \"2.0.0\"\n  \
                       }},\n  \
                       \"dialect\": {{\n    \
                         \"time_literal\": \"epoch_millis\",\n    \
                         \"compression\": false\n  \
                       }}\n\
                     }}\n"
                ),
            });
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, CqlError> {
        let content = fs::read_to_string(path).map_err(|e| CqlError::Config {
            message: format!("Failed to read {}: {}", path.display(), e),
        })?;

        serde_json::from_str(&content).map_err(|e| CqlError::Config {
            message: format!("Invalid JSON in {}: {}", path.display(), e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Mutex, OnceLock};
    use tempfile::{NamedTempFile, TempDir};

    // set_current_dir is process-wide
    fn cwd_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write temp file");
        file
    }

    #[test]
    fn test_empty_object_uses_defaults() {
        let file = write_config("{}");
        let config = ConfigFile::load_from(file.path()).unwrap();
        assert_eq!(config, ConfigFile::default());
        assert_eq!(config.connection.keyspace, "system");
        assert_eq!(config.dialect.time_literal, TimeLiteral::EpochMillis);
        assert!(!config.dialect.compression);
    }

    #[test]
    fn test_full_config() {
        let file = write_config(
            r#"{
                "connection": {"keyspace": "app", "cql_version": "2.0.0"},
                "dialect": {"time_literal": "time_uuid", "compression": true}
            }"#,
        );
        let config = ConfigFile::load_from(file.path()).unwrap();
        assert_eq!(config.connection.keyspace, "app");
        assert_eq!(config.connection.cql_version.as_deref(), Some("2.0.0"));
        assert_eq!(config.dialect.time_literal, TimeLiteral::TimeUuid);
        assert!(config.dialect.compression);
    }

    #[test]
    fn test_invalid_json() {
        let file = write_config("{ not json");
        let err = ConfigFile::load_from(file.path()).unwrap_err();
        assert!(err.to_string().contains("Invalid JSON"), "{}", err);
    }

    #[test]
    fn test_unknown_time_literal_is_rejected() {
        let file = write_config(r#"{"dialect": {"time_literal": "rfc3339"}}"#);
        assert!(ConfigFile::load_from(file.path()).is_err());
    }

    #[test]
    fn test_load_from_working_directory() {
        let _guard = cwd_lock().lock().unwrap();
        let original = std::env::current_dir().unwrap();
        let dir = TempDir::new().unwrap();

        std::env::set_current_dir(dir.path()).unwrap();
        let missing = ConfigFile::load();
        fs::write(CONFIG_FILE, r#"{"connection": {"keyspace": "app"}}"#).unwrap();
        let loaded = ConfigFile::load();
        std::env::set_current_dir(original).unwrap();

        let err = missing.unwrap_err();
        assert!(err.to_string().contains("not found"), "{}", err);
        assert_eq!(loaded.unwrap().connection.keyspace, "app");
    }
}
