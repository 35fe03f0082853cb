//! Configuration for the spam-classifier binary

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::train::TrainingParams;

/// Top-level settings, every field optional in the file
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Root searched for `vectorizer.json` and `mnb_model.json`
    pub model_dir: PathBuf,
    pub logging: LoggingConfig,
    pub training: TrainingConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// Default filter when `RUST_LOG` is unset
    pub level: String,
}

/// Offline fitting configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub alpha: f64,
    pub test_fraction: f64,
    /// Vocabulary cap; 0 keeps every term
    pub max_features: usize,
    pub ngram_min: usize,
    pub ngram_max: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("."),
            logging: LoggingConfig::default(),
            training: TrainingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            level: "info".to_string(),
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        let params = TrainingParams::default();
        Self {
            alpha: params.alpha,
            test_fraction: params.test_fraction,
            max_features: params.max_features.unwrap_or(0),
            ngram_min: params.ngram_range.0,
            ngram_max: params.ngram_range.1,
        }
    }
}

impl TrainingConfig {
    pub fn params(&self) -> TrainingParams {
        TrainingParams {
            alpha: self.alpha,
            test_fraction: self.test_fraction,
            max_features: (self.max_features > 0).then_some(self.max_features),
            ngram_range: (self.ngram_min, self.ngram_max),
        }
    }
}

impl Settings {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content).map_err(|e| Error::config(format!("Failed to parse config: {}", e)))
    }

    /// File settings when a path is given, defaults otherwise
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}
