//! Configuration loading for the memory worker.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! The default config file lives at ~/.config/memory-worker/config.toml.
//! Environment variables use the `VECTOR_` prefix (VECTOR_INDEX_KEY,
//! VECTOR_EMBED_DIMENSION, VECTOR_INDEX_PATH, VECTOR_META_PATH, VECTOR_LOG_LEVEL).

use config::{Config, Environment, File};
use directories::{BaseDirs, ProjectDirs};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use std::path::PathBuf;

use crate::error::MemoryError;

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "VECTOR";

/// Embedding width used when nothing else is configured
pub const DEFAULT_EMBED_DIMENSION: u32 = 384;

const APP_NAME: &str = "memory-worker";

/// Main worker settings
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// Path to the encrypted index file
    #[serde(default = "default_index_path")]
    pub index_path: String,

    /// Path to the encrypted metadata file
    #[serde(default = "default_meta_path")]
    pub meta_path: String,

    /// Embedding dimension the store was built for
    #[serde(default = "default_embed_dimension")]
    pub embed_dimension: u32,

    /// Symmetric key as hex, base64 or a raw 16/24/32 byte string
    #[serde(default, deserialize_with = "deserialize_secret")]
    pub index_key: Option<SecretString>,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.map(SecretString::from))
}

fn data_dir() -> PathBuf {
    ProjectDirs::from("", "", APP_NAME)
        .map(|p| p.data_local_dir().join("vector-store"))
        .unwrap_or_else(|| PathBuf::from("./vector-store"))
}

fn default_index_path() -> String {
    data_dir()
        .join("index.bin.enc")
        .to_string_lossy()
        .to_string()
}

fn default_meta_path() -> String {
    data_dir()
        .join("meta.json.enc")
        .to_string_lossy()
        .to_string()
}

fn default_embed_dimension() -> u32 {
    DEFAULT_EMBED_DIMENSION
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            index_path: default_index_path(),
            meta_path: default_meta_path(),
            embed_dimension: default_embed_dimension(),
            index_key: None,
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/memory-worker/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (VECTOR_*)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, MemoryError> {
        let config_dir = ProjectDirs::from("", "", APP_NAME)
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("index_path", default_index_path())
            .map_err(|e| MemoryError::Config(e.to_string()))?
            .set_default("meta_path", default_meta_path())
            .map_err(|e| MemoryError::Config(e.to_string()))?
            .set_default("embed_dimension", default_embed_dimension() as i64)
            .map_err(|e| MemoryError::Config(e.to_string()))?
            .set_default("log_level", default_log_level())
            .map_err(|e| MemoryError::Config(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // VECTOR_INDEX_KEY -> index_key. No try_parsing: an all-digit hex key
        // must stay a string.
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        );

        let config = builder
            .build()
            .map_err(|e| MemoryError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| MemoryError::Config(e.to_string()))
    }

    /// Check values that would otherwise fail deep inside a command.
    pub fn validate(&self) -> Result<(), MemoryError> {
        if self.embed_dimension == 0 {
            return Err(MemoryError::Config(
                "embed_dimension must be > 0".to_string(),
            ));
        }
        let has_key = self
            .index_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().trim().is_empty());
        if !has_key {
            return Err(MemoryError::Config(
                "VECTOR_INDEX_KEY is required for encryption".to_string(),
            ));
        }
        Ok(())
    }

    /// Index path with a leading `~/` expanded
    pub fn expanded_index_path(&self) -> PathBuf {
        expand_home(&self.index_path)
    }

    /// Metadata path with a leading `~/` expanded
    pub fn expanded_meta_path(&self) -> PathBuf {
        expand_home(&self.meta_path)
    }
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(dirs) = BaseDirs::new() {
            return dirs.home_dir().join(rest);
        }
    }
    PathBuf::from(path)
}
