//! Service configuration.

use std::path::Path;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::history::DEFAULT_HISTORY_CAPACITY;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Request-level limits applied by the dosage service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DosageConfig {
    /// Weights must be strictly greater than this
    pub min_weight_exclusive: Decimal,
    /// Weights must be strictly less than this
    pub max_weight_exclusive: Decimal,
    /// Request weights are rounded half-up to this many places
    pub weight_decimal_places: u32,
    /// Record each successful calculation in the search history
    pub record_history: bool,
    /// Most history entries kept; the oldest are dropped first
    pub history_capacity: usize,
}

impl Default for DosageConfig {
    fn default() -> Self {
        Self {
            min_weight_exclusive: Decimal::ZERO,
            max_weight_exclusive: dec!(1000),
            weight_decimal_places: 2,
            record_history: true,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

impl DosageConfig {
    /// Parse from a JSON document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check that the bounds describe a usable range.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.min_weight_exclusive < Decimal::ZERO {
            return Err(ConfigError::Invalid(format!(
                "min_weight_exclusive must not be negative, got {}",
                self.min_weight_exclusive
            )));
        }
        if self.min_weight_exclusive >= self.max_weight_exclusive {
            return Err(ConfigError::Invalid(format!(
                "min_weight_exclusive ({}) must be below max_weight_exclusive ({})",
                self.min_weight_exclusive, self.max_weight_exclusive
            )));
        }
        if self.weight_decimal_places > Decimal::MAX_SCALE {
            return Err(ConfigError::Invalid(format!(
                "weight_decimal_places must be at most {}, got {}",
                Decimal::MAX_SCALE,
                self.weight_decimal_places
            )));
        }
        if self.history_capacity == 0 {
            return Err(ConfigError::Invalid(
                "history_capacity must be at least 1; set record_history to false instead"
                    .to_string(),
            ));
        }
        Ok(())
    }
}
