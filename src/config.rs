//! # Configuration
//!
//! Settings are read from TOML. Every key is optional:
//!
//! ```toml
//! [datastore]
//! backend = "sled"        # or "memory" (default)
//! path = "data/resources" # sled directory, required for "sled"
//! buffer_size = 32        # request queue of the in-memory actor
//! collection = "resources"
//!
//! [logging]
//! filter = "info"         # used when RUST_LOG is not set
//!
//! [defaults]
//! access_mode = "private"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::framework::StoreError;
use crate::manager::{DEFAULT_ACCESS_MODE, DEFAULT_COLLECTION};

/// Environment variable naming the configuration file for [`StoreConfig::load`].
pub const CONFIG_ENV: &str = "RESOURCE_STORE_CONFIG";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    #[default]
    Memory,
    Sled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatastoreConfig {
    pub backend: Backend,
    pub path: Option<PathBuf>,
    pub buffer_size: usize,
    pub collection: String,
}

impl Default for DatastoreConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Memory,
            path: None,
            buffer_size: 32,
            collection: DEFAULT_COLLECTION.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub access_mode: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            access_mode: DEFAULT_ACCESS_MODE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub datastore: DatastoreConfig,
    pub logging: LoggingConfig,
    pub defaults: DefaultsConfig,
}

impl StoreConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, StoreError> {
        let config: StoreConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            StoreError::Internal(format!("cannot read config {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&source)?;
        info!(path = %path.display(), backend = ?config.datastore.backend, "Loaded configuration");
        Ok(config)
    }

    /// Reads the file named by `RESOURCE_STORE_CONFIG`, or returns the
    /// defaults when the variable is unset.
    pub fn load() -> Result<Self, StoreError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(PathBuf::from(path)),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<(), StoreError> {
        if self.datastore.buffer_size == 0 {
            return Err(StoreError::Developer("datastore.buffer_size must be positive".to_string()));
        }
        if self.datastore.backend == Backend::Sled && self.datastore.path.is_none() {
            return Err(StoreError::Developer("datastore.path is required for the sled backend".to_string()));
        }
        if self.datastore.collection.is_empty() {
            return Err(StoreError::Developer("datastore.collection must not be empty".to_string()));
        }
        Ok(())
    }
}
