//! Configuration module for Grove.

use serde::Deserialize;
use std::path::Path;

use crate::{GroveError, Result};

/// Web API server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// Host address to bind.
    #[serde(default = "default_web_host")]
    pub host: String,
    /// Port number for the Web API.
    #[serde(default = "default_web_port")]
    pub port: u16,
    /// CORS allowed origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_web_host() -> String {
    "0.0.0.0".to_string()
}

fn default_web_port() -> u16 {
    5000
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_web_host(),
            port: default_web_port(),
            cors_origins: vec![],
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/grove.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// File storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FilesConfig {
    /// Path to the file storage directory.
    #[serde(default = "default_storage_path")]
    pub storage_path: String,
    /// Maximum upload size in megabytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_mb: u64,
}

fn default_storage_path() -> String {
    "data/uploads".to_string()
}

/// Largest accepted upload limit (1 TiB).
pub const MAX_UPLOAD_SIZE_MB: u64 = 1024 * 1024;

fn default_max_upload_size() -> u64 {
    10
}

impl FilesConfig {
    /// Upload limit in bytes.
    pub fn max_upload_size_bytes(&self) -> u64 {
        self.max_upload_size_mb.saturating_mul(1024 * 1024)
    }
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
            max_upload_size_mb: default_max_upload_size(),
        }
    }
}

/// Hierarchy retrieval configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HierarchyConfig {
    /// Deepest level the descendant expansion will walk.
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,
}

fn default_max_depth() -> u32 {
    64
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/grove.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Web API configuration.
    #[serde(default)]
    pub web: WebConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// File storage configuration.
    #[serde(default)]
    pub files: FilesConfig,
    /// Hierarchy retrieval configuration.
    #[serde(default)]
    pub hierarchy: HierarchyConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(GroveError::Io)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| GroveError::Config(format!("config parse error: {e}")))
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - `hierarchy.max_depth` is zero
    /// - `files.max_upload_size_mb` is zero
    pub fn validate(&self) -> Result<()> {
        if self.hierarchy.max_depth == 0 {
            return Err(GroveError::Config(
                "hierarchy.max_depth must be at least 1".to_string(),
            ));
        }
        if self.files.max_upload_size_mb == 0 {
            return Err(GroveError::Config(
                "files.max_upload_size_mb must be at least 1".to_string(),
            ));
        }
        if self.files.max_upload_size_mb > MAX_UPLOAD_SIZE_MB {
            return Err(GroveError::Config(format!(
                "files.max_upload_size_mb must be at most {}",
                MAX_UPLOAD_SIZE_MB
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.web.host, "0.0.0.0");
        assert_eq!(config.web.port, 5000);
        assert!(config.web.cors_origins.is_empty());

        assert_eq!(config.database.path, "data/grove.db");

        assert_eq!(config.files.storage_path, "data/uploads");
        assert_eq!(config.files.max_upload_size_mb, 10);
        assert_eq!(config.files.max_upload_size_bytes(), 10 * 1024 * 1024);

        assert_eq!(config.hierarchy.max_depth, 64);

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.file, "logs/grove.log");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[web]
host = "127.0.0.1"
port = 8080
cors_origins = ["http://localhost:3000"]

[database]
path = "custom/db.sqlite"

[files]
storage_path = "custom/files"
max_upload_size_mb = 20

[hierarchy]
max_depth = 16

[logging]
level = "debug"
file = "custom/logs/app.log"
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.web.host, "127.0.0.1");
        assert_eq!(config.web.port, 8080);
        assert_eq!(config.web.cors_origins, vec!["http://localhost:3000"]);
        assert_eq!(config.database.path, "custom/db.sqlite");
        assert_eq!(config.files.storage_path, "custom/files");
        assert_eq!(config.files.max_upload_size_mb, 20);
        assert_eq!(config.hierarchy.max_depth, 16);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file, "custom/logs/app.log");
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
[web]
port = 9000
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.web.host, "0.0.0.0");
        assert_eq!(config.web.port, 9000);
        assert_eq!(config.database.path, "data/grove.db");
        assert_eq!(config.hierarchy.max_depth, 64);
    }

    #[test]
    fn test_parse_empty_config() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.web.port, 5000);
        assert_eq!(config.files.max_upload_size_mb, 10);
    }

    #[test]
    fn test_parse_invalid_config() {
        let result = Config::parse("[web\nport = ");
        assert!(matches!(result, Err(GroveError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_depth() {
        let mut config = Config::default();
        config.hierarchy.max_depth = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_upload_size() {
        let mut config = Config::default();
        config.files.max_upload_size_mb = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_upload_limit() {
        let mut config = Config::default();
        config.files.max_upload_size_mb = MAX_UPLOAD_SIZE_MB;
        assert!(config.validate().is_ok());
        config.files.max_upload_size_mb = MAX_UPLOAD_SIZE_MB + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_upload_size_bytes_saturates() {
        let files = FilesConfig {
            max_upload_size_mb: u64::MAX,
            ..FilesConfig::default()
        };
        assert_eq!(files.max_upload_size_bytes(), u64::MAX);
        assert_eq!(FilesConfig::default().max_upload_size_bytes(), 10 * 1024 * 1024);
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load("/nonexistent/grove/config.toml");
        assert!(matches!(result, Err(GroveError::Io(_))));
    }
}
