//! Configuration loading and management

use crate::core::{StoreError, StoreResult};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_map_size_mb() -> usize {
    256
}

fn default_max_dbs() -> u32 {
    16
}

fn default_log_filter() -> String {
    "order_store=info".to_string()
}

/// Which storage engine backs the stores
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackendConfig {
    /// Volatile in-memory engine
    #[default]
    InMemory,

    /// Embedded LMDB environment (requires the `lmdb` feature)
    Lmdb {
        /// Directory holding the environment files
        path: PathBuf,

        /// Map size in megabytes
        #[serde(default = "default_map_size_mb")]
        map_size_mb: usize,

        /// Maximum number of named databases (collections + sequences)
        #[serde(default = "default_max_dbs")]
        max_dbs: u32,
    },
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing-subscriber` env-filter directive, overridden by `RUST_LOG`
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

/// Complete configuration for the order stores
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Storage engine selection
    #[serde(default)]
    pub backend: BackendConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StoreConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Configuration using an LMDB environment at `path` with default sizing
    pub fn lmdb(path: impl Into<PathBuf>) -> Self {
        Self {
            backend: BackendConfig::Lmdb {
                path: path.into(),
                map_size_mb: default_map_size_mb(),
                max_dbs: default_max_dbs(),
            },
            logging: LoggingConfig::default(),
        }
    }

    /// Reject settings no engine could open
    pub fn validate(&self) -> StoreResult<()> {
        match &self.backend {
            BackendConfig::InMemory => Ok(()),
            BackendConfig::Lmdb {
                path,
                map_size_mb,
                max_dbs,
            } => {
                if path.as_os_str().is_empty() {
                    return Err(StoreError::config("lmdb path must not be empty"));
                }
                if *map_size_mb == 0 {
                    return Err(StoreError::config("lmdb map_size_mb must be positive"));
                }
                // One database per entity collection plus the sequence table
                if *max_dbs < 3 {
                    return Err(StoreError::config("lmdb max_dbs must be at least 3"));
                }
                Ok(())
            }
        }
    }
}
