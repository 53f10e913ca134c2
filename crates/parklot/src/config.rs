//! Configuration management for parklot.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "parklot";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "parklot.db";

/// Default blob directory name.
const BLOB_DIR_NAME: &str = "blobs";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `PARKLOT_`, sections split on `__`)
/// 2. TOML config file at `~/.config/parklot/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database configuration.
    pub storage: StorageConfig,
    /// Entry photo storage configuration.
    pub blobs: BlobConfig,
    /// HTTP server configuration.
    pub server: ServerConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/parklot/parklot.db`
    pub database_path: Option<PathBuf>,
}

/// Entry photo storage configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlobConfig {
    /// Directory holding stored photos.
    /// Defaults to `~/.local/share/parklot/blobs`
    pub root: Option<PathBuf>,
    /// Public URL under which `/blobs` is reachable.
    /// Defaults to `http://{server.bind}/blobs`
    pub public_base_url: Option<String>,
    /// Object path prefix for entry photos.
    pub path_prefix: String,
    /// Content type recorded for entry photos.
    pub content_type: String,
    /// Expiry stamped on photo URLs.
    pub url_expires_at: DateTime<Utc>,
    /// Secret used to sign photo URLs. Generated and persisted when unset.
    pub signing_secret: Option<String>,
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to listen on.
    pub bind: String,
    /// Allow cross-origin requests from any origin.
    pub cors_permissive: bool,
    /// Largest accepted request body. Photos arrive base64 encoded.
    pub max_body_bytes: usize,
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            root: None, // Will be resolved to default at runtime
            public_base_url: None, // Derived from server.bind at runtime
            path_prefix: "cars".to_string(),
            content_type: "image/jpeg".to_string(),
            url_expires_at: default_url_expiry(),
            signing_secret: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
            cors_permissive: true,
            max_body_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Photo URLs are effectively permanent.
fn default_url_expiry() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2100, 3, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("PARKLOT_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate the file at `path`, which must exist.
    ///
    /// Environment overrides still apply, as they would when running.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unparsable or invalid.
    pub fn validate_file(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::ConfigValidation {
                message: format!("config file not found: {}", path.display()),
            });
        }
        Self::load_from(Some(path.to_path_buf()))
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.blobs.path_prefix.trim_matches('/').is_empty() {
            return Err(Error::ConfigValidation {
                message: "blobs.path_prefix must not be empty".to_string(),
            });
        }

        if self.blobs.content_type.is_empty() {
            return Err(Error::ConfigValidation {
                message: "blobs.content_type must not be empty".to_string(),
            });
        }

        if self.blobs.url_expires_at <= Utc::now() {
            return Err(Error::ConfigValidation {
                message: format!(
                    "blobs.url_expires_at ({}) is in the past",
                    self.blobs.url_expires_at
                ),
            });
        }

        self.bind_addr()?;

        if self.server.max_body_bytes == 0 {
            return Err(Error::ConfigValidation {
                message: "server.max_body_bytes must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the blob directory, resolving defaults if not set.
    #[must_use]
    pub fn blob_root(&self) -> PathBuf {
        self.blobs
            .root
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(BLOB_DIR_NAME))
    }

    /// Get the public photo base URL, deriving it from `server.bind` if not set.
    ///
    /// A wildcard bind address is reported as loopback, since a URL cannot
    /// point at `0.0.0.0`.
    #[must_use]
    pub fn public_base_url(&self) -> String {
        if let Some(url) = &self.blobs.public_base_url {
            return url.clone();
        }
        let host = match self.bind_addr() {
            Ok(SocketAddr::V4(addr)) if addr.ip().is_unspecified() => {
                format!("127.0.0.1:{}", addr.port())
            }
            Ok(SocketAddr::V6(addr)) if addr.ip().is_unspecified() => {
                format!("[::1]:{}", addr.port())
            }
            Ok(addr) => addr.to_string(),
            Err(_) => self.server.bind.clone(),
        };
        format!("http://{host}/blobs")
    }

    /// Parse the server bind address.
    ///
    /// # Errors
    ///
    /// Returns an error if `server.bind` is not a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.server
            .bind
            .parse()
            .map_err(|e| Error::ConfigValidation {
                message: format!("invalid server.bind '{}': {e}", self.server.bind),
            })
    }
}
