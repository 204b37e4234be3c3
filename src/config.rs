//! # Mapper Configuration
//!
//! Centralized configuration for the mapping pipeline, loaded from
//! environment variables with validation. All values have sensible defaults
//! so the pipeline works with no configuration at all.

use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;
use tracing::warn;

/// Configuration for the mapping pipeline and its collaborator calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapperConfig {
    /// Timeout for each external collaborator call, in seconds
    pub collaborator_timeout_secs: u64,
    /// Maximum length for normalized item names (truncated at word boundary)
    pub max_name_length: usize,
    /// Minimum historical sample count for a learned candidate to be
    /// considered high confidence
    pub high_confidence_sample_count: u32,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            collaborator_timeout_secs: 5,
            max_name_length: 100,
            high_confidence_sample_count: 3,
        }
    }
}

impl MapperConfig {
    /// Load configuration from `MAPPER_*` environment variables
    ///
    /// Unset or unparseable variables fall back to defaults with a warning.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let collaborator_timeout_secs = read_env_u64(
            "MAPPER_COLLABORATOR_TIMEOUT_SECS",
            defaults.collaborator_timeout_secs,
        );
        let max_name_length =
            read_env_u64("MAPPER_MAX_NAME_LENGTH", defaults.max_name_length as u64) as usize;
        let high_confidence_sample_count = read_env_u64(
            "MAPPER_HIGH_CONFIDENCE_SAMPLE_COUNT",
            defaults.high_confidence_sample_count as u64,
        ) as u32;

        Self {
            collaborator_timeout_secs,
            max_name_length,
            high_confidence_sample_count,
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> AppResult<()> {
        if self.collaborator_timeout_secs == 0 {
            return Err(AppError::Config(
                "collaborator timeout cannot be 0".to_string(),
            ));
        }
        if self.collaborator_timeout_secs > 300 {
            return Err(AppError::Config(
                "collaborator timeout cannot be greater than 300 seconds".to_string(),
            ));
        }
        if self.max_name_length == 0 {
            return Err(AppError::Config(
                "max_name_length must be greater than 0".to_string(),
            ));
        }
        if self.high_confidence_sample_count == 0 {
            return Err(AppError::Config(
                "high_confidence_sample_count must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn read_env_u64(key: &str, default: u64) -> u64 {
    match env::var(key) {
        Ok(raw) => match raw.parse::<u64>() {
            Ok(value) => value,
            Err(_) => {
                warn!(
                    "Invalid value '{}' for {}, using default {}",
                    raw, key, default
                );
                default
            }
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(MapperConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = MapperConfig {
            collaborator_timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_oversized_timeout_rejected() {
        let config = MapperConfig {
            collaborator_timeout_secs: 301,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_name_length_rejected() {
        let config = MapperConfig {
            max_name_length: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
