//! Configuration management for processing defaults

use crate::variance::VarianceOptions;
use crate::z_score::ZScoreOptions;
use bsp_core::{BspError, BspResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default options for every processing function
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Defaults of `proc_variance`
    pub variance: VarianceOptions,
    /// Defaults of `proc_z_score`
    pub z_score: ZScoreOptions,
}

impl ProcessingConfig {
    pub fn validate(&self) -> BspResult<()> {
        self.variance.validate().map_err(|e| BspError::ConfigurationError {
            message: format!("Variance configuration invalid: {}", e),
        })?;
        self.z_score.validate().map_err(|e| BspError::ConfigurationError {
            message: format!("Z-score configuration invalid: {}", e),
        })?;
        Ok(())
    }

    /// Export configuration to JSON
    pub fn to_json(&self) -> BspResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| BspError::ConfigurationError {
            message: format!("Failed to serialize configuration: {}", e),
        })
    }

    /// Import configuration from JSON; missing sections keep their defaults
    pub fn from_json(json: &str) -> BspResult<Self> {
        let config: ProcessingConfig =
            serde_json::from_str(json).map_err(|e| BspError::ConfigurationError {
                message: format!("Failed to deserialize configuration: {}", e),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> BspResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| BspError::ConfigurationError {
            message: format!("Failed to read configuration '{}': {}", path.display(), e),
        })?;
        Self::from_json(&json)
    }
}
