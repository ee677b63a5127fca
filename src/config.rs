//! Validator Configuration - Resource Bounds
//!
//! Adversarial input is bounded by the limits here. Hitting one is reported
//! as a `resource_limit_exceeded` violation, never as a crash.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Configuration limit {0} must be greater than zero")]
    ZeroLimit(&'static str),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ValidatorConfig {
    /// Deepest element nesting that will be traversed. Top-level elements
    /// sit at depth 1.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Total number of elements across the surface and all variants.
    #[serde(default = "default_max_elements")]
    pub max_elements: usize,
    /// Longest string, in bytes, that will be inspected.
    #[serde(default = "default_max_string_length")]
    pub max_string_length: usize,
}

fn default_max_depth() -> usize { 64 }
fn default_max_elements() -> usize { 10_000 }
fn default_max_string_length() -> usize { 1_048_576 }

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_elements: default_max_elements(),
            max_string_length: default_max_string_length(),
        }
    }
}

impl ValidatorConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.check()?;
        Ok(config)
    }

    pub fn check(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::ZeroLimit("maxDepth"));
        }
        if self.max_elements == 0 {
            return Err(ConfigError::ZeroLimit("maxElements"));
        }
        if self.max_string_length == 0 {
            return Err(ConfigError::ZeroLimit("maxStringLength"));
        }
        Ok(())
    }
}
