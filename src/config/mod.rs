//! Environment-backed configuration.
//!
//! Everything has a default. Override with `CONDENSE_*` environment variables. Only the binary
//! and the [`Pipeline`](crate::pipeline::Pipeline) read this; the condensation functions take
//! their parameters per call.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::constants::{DEFAULT_EMBEDDING_MODEL, DEFAULT_RERANKER_MODEL};
use crate::embedding::{DeviceKind, EncoderConfig, RerankerConfig};

/// Process configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `CONDENSE_*` overrides on top of defaults.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Sentence encoder directory (BERT + tokenizer). `None` runs the stub encoder.
    pub embedder_path: Option<PathBuf>,

    /// Cross-encoder directory (BERT + classifier head + tokenizer). `None` runs the stub reranker.
    pub reranker_path: Option<PathBuf>,

    /// Requested compute backend. Default: `cpu`.
    pub device: DeviceKind,

    /// Optional JSON model catalog.
    pub catalog_path: Option<PathBuf>,
}

impl Config {
    const ENV_EMBEDDER_PATH: &'static str = "CONDENSE_EMBEDDER_PATH";
    const ENV_RERANKER_PATH: &'static str = "CONDENSE_RERANKER_PATH";
    const ENV_DEVICE: &'static str = "CONDENSE_DEVICE";
    const ENV_CATALOG: &'static str = "CONDENSE_MODELS_CATALOG";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let device = Self::parse_device_from_env()?;
        let embedder_path = Self::parse_optional_path_from_env(Self::ENV_EMBEDDER_PATH);
        let reranker_path = Self::parse_optional_path_from_env(Self::ENV_RERANKER_PATH);
        let catalog_path = Self::parse_optional_path_from_env(Self::ENV_CATALOG);

        Ok(Self {
            embedder_path,
            reranker_path,
            device,
            catalog_path,
        })
    }

    /// Validates model paths (does not look inside model directories).
    ///
    /// The catalog is optional at runtime and is not checked here; see [`Config::check_catalog`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        for dir in [&self.embedder_path, &self.reranker_path].into_iter().flatten() {
            if !dir.exists() {
                return Err(ConfigError::PathNotFound { path: dir.clone() });
            }
            if !dir.is_dir() {
                return Err(ConfigError::NotADirectory { path: dir.clone() });
            }
        }

        Ok(())
    }

    /// Strict catalog check for health probes: a configured catalog must be an existing file.
    pub fn check_catalog(&self) -> Result<(), ConfigError> {
        let Some(ref path) = self.catalog_path else {
            return Ok(());
        };
        if !path.exists() {
            return Err(ConfigError::PathNotFound { path: path.clone() });
        }
        if !path.is_file() {
            return Err(ConfigError::NotAFile { path: path.clone() });
        }
        Ok(())
    }

    /// Reads the catalog if one is configured. Read or parse failures are logged and the built-in
    /// defaults are returned.
    pub fn load_catalog(&self) -> ModelCatalog {
        let Some(ref path) = self.catalog_path else {
            return ModelCatalog::default();
        };

        match ModelCatalog::from_file(path) {
            Ok(catalog) => {
                info!(
                    path = %path.display(),
                    default_model = %catalog.default_model,
                    default_reranker = %catalog.default_reranker,
                    models = catalog.available_models.len(),
                    "Loaded model catalog"
                );
                catalog
            }
            Err(e) => {
                warn!(error = %e, "Could not read model catalog, using defaults");
                ModelCatalog::default()
            }
        }
    }

    /// Encoder settings: the configured directory (or stub), named after the catalog default.
    pub fn encoder_config(&self, catalog: &ModelCatalog) -> EncoderConfig {
        let config = match self.embedder_path {
            Some(ref dir) => EncoderConfig::new(dir),
            None => EncoderConfig::stub(),
        };
        config
            .with_model_name(&catalog.default_model)
            .with_device(self.device)
    }

    /// Reranker settings: the configured directory (or stub), named after the catalog default.
    pub fn reranker_config(&self, catalog: &ModelCatalog) -> RerankerConfig {
        let config = match self.reranker_path {
            Some(ref dir) => RerankerConfig::new(dir),
            None => RerankerConfig::stub(),
        };
        config
            .with_model_name(&catalog.default_reranker)
            .with_device(self.device)
    }

    fn parse_device_from_env() -> Result<DeviceKind, ConfigError> {
        match env::var(Self::ENV_DEVICE) {
            Ok(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidDevice { value }),
            Err(_) => Ok(DeviceKind::default()),
        }
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }
}

/// Model names advertised by the service.
///
/// ```json
/// { "default_model": "...", "default_reranker": "...", "available_models": [ {...} ] }
/// ```
///
/// Missing keys take the built-in defaults. `available_models` entries are passed through as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelCatalog {
    pub default_model: String,
    pub default_reranker: String,
    pub available_models: Vec<Value>,
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self {
            default_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            default_reranker: DEFAULT_RERANKER_MODEL.to_string(),
            available_models: Vec::new(),
        }
    }
}

impl ModelCatalog {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::CatalogRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::CatalogParse {
            path: path.to_path_buf(),
            source,
        })
    }
}
