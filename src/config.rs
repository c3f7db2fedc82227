//! Application configuration: an optional TOML file overridden by
//! `WIKIAPI_`-prefixed environment variables.
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 3000
//!
//! [store]
//! backend = "sqlite"        # or "memory"
//! path = "wikiDB.sqlite3"
//!
//! [logging]
//! level = "info"
//! format = "text"           # or "json"
//! ```
//!
//! Nested keys use `__` in environment variables, e.g.
//! `WIKIAPI_SERVER__PORT=8080` or `WIKIAPI_STORE__BACKEND=memory`.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Deserialize;

use crate::store::StoreConfig;

const CONFIG_PATH_VAR: &str = "WIKIAPI_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "wikiapi.toml";

/// Top-level application configuration loaded from file + environment.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSection,
    pub store: StoreSection,
    pub logging: LoggingSection,
}

impl AppConfig {
    /// Loads `$WIKIAPI_CONFIG` (default `wikiapi.toml`, skipped when absent)
    /// and applies environment overrides.
    pub fn load() -> Result<Self> {
        let config_path = env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(Path::new(&config_path))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let mut builder = config::Config::builder();

        if path.exists() {
            builder = builder.add_source(config::File::from(PathBuf::from(path)));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("WIKIAPI")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let mut config: Self = builder.build()?.try_deserialize()?;

        if config.logging.level.trim().is_empty() {
            config.logging.level = "info".to_string();
        }

        Ok(config)
    }

    /// `host:port` for the listening socket.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackendKind {
    Memory,
    #[default]
    Sqlite,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StoreSection {
    pub backend: StoreBackendKind,
    /// Database file for the sqlite backend.
    pub path: PathBuf,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            backend: StoreBackendKind::default(),
            path: PathBuf::from("wikiDB.sqlite3"),
        }
    }
}

impl StoreSection {
    pub fn to_runtime(&self) -> StoreConfig {
        match self.backend {
            StoreBackendKind::Memory => StoreConfig::Memory,
            StoreBackendKind::Sqlite => StoreConfig::Sqlite { path: self.path.clone() },
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingSection {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn missing_file_means_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(config.listen_addr(), "127.0.0.1:3000");
        assert_eq!(
            config.store.to_runtime(),
            StoreConfig::Sqlite { path: PathBuf::from("wikiDB.sqlite3") }
        );
        assert_eq!(config.logging.format, LogFormat::Text);
    }

    #[test]
    fn file_values_override_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 8080

[store]
backend = "memory"

[logging]
level = ""
format = "json"
"#
        )
        .unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.store.to_runtime(), StoreConfig::Memory);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[store]\nbackend = \"mongo\"").unwrap();
        assert!(AppConfig::load_from(file.path()).is_err());
    }
}
