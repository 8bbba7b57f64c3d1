//! Configuration system for classr
//!
//! ClassrConfig groups the server, storage layout, inference and
//! readiness settings. Every field has a default, so an empty file (or no
//! file at all) yields a working configuration rooted at `volume_data/`.

mod inference;
mod readiness;
mod server;
mod storage;

pub use inference::{
    DeviceConfig, InferenceConfig, Normalization, OutputActivation, ResizeFilter, TensorLayout,
};
pub use readiness::ReadinessConfig;
pub use server::ServerConfig;
pub use storage::StorageConfig;

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable overriding `storage.volume_dir`
pub const VOLUME_DIR_ENV: &str = "CLASSR_VOLUME_DIR";

/// Classr configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassrConfig {
    /// Server settings (only for `classr serve`)
    #[serde(default)]
    pub server: ServerConfig,

    /// Shared volume layout
    #[serde(default)]
    pub storage: StorageConfig,

    /// Preprocessing and runtime settings
    #[serde(default)]
    pub inference: InferenceConfig,

    /// Startup wait for the run pointer
    #[serde(default)]
    pub readiness: ReadinessConfig,
}

impl ClassrConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration, picking the format from the file extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let config = match ext {
            "yaml" | "yml" => Self::from_yaml(path),
            "json" => Self::from_json(path),
            other => Err(anyhow!("unsupported config format: '.{}'", other)),
        };
        config.with_context(|| format!("failed to load config from {}", path.display()))
    }

    /// Resolve the effective configuration for a CLI invocation
    ///
    /// Precedence: explicit `volume` flag, then `CLASSR_VOLUME_DIR`, then the
    /// config file, then defaults.
    pub fn resolve(config_path: Option<&Path>, volume: Option<PathBuf>) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => Self::from_path(path)?,
            None => Self::default(),
        };

        if let Some(dir) = volume.or_else(|| std::env::var_os(VOLUME_DIR_ENV).map(PathBuf::from)) {
            config.storage.volume_dir = dir;
        }

        Ok(config)
    }
}
