//! Admin API configuration.
//!
//! Layered with the `config` crate:
//! 1. Built-in defaults
//! 2. `stockroom.toml` (optional, or the path given on the command line)
//! 3. `STOCKROOM__*` environment variables, `__` separating sections
//!    (`STOCKROOM__SERVER__PORT=9000` sets `server.port`)

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;
use stockroom_db::DbConfig;

/// Default config file, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "stockroom.toml";

const ENV_PREFIX: &str = "STOCKROOM";

/// Admin API configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub media: MediaConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "0.0.0.0".into(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file; created on first start.
    pub path: PathBuf,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            path: PathBuf::from("data/stockroom.db"),
            max_connections: 5,
        }
    }
}

impl DatabaseConfig {
    pub fn to_db_config(&self) -> DbConfig {
        DbConfig::new(&self.path).max_connections(self.max_connections)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Directory that uploaded files are stored under.
    pub root: PathBuf,
    /// Prefix for public media URLs.
    pub public_base_url: String,
    /// Largest accepted upload, bytes.
    pub max_upload_bytes: usize,
}

impl Default for MediaConfig {
    fn default() -> Self {
        MediaConfig {
            root: PathBuf::from("data/media"),
            public_base_url: "/media".into(),
            max_upload_bytes: 20 * 1024 * 1024,
        }
    }
}

impl MediaConfig {
    /// Request body limit for uploads: the file plus room for the form
    /// fields around it.
    pub fn body_limit(&self) -> usize {
        self.max_upload_bytes.saturating_add(64 * 1024)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives; `RUST_LOG` wins when set.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            filter: "info,stockroom=debug,sqlx=warn".into(),
        }
    }
}

impl AppConfig {
    /// Loads defaults, then the file (if present), then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        // An explicitly named file must exist; the default one is optional.
        let required = path.is_some();

        let config = Config::builder()
            .add_source(File::from(file).required(required))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<AppConfig>()?;

        Ok(config)
    }

    /// `host:port` to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] config::ConfigError),
}
