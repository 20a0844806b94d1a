//! Configuration types for FeatureEngine

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default filter used when tracing is enabled and `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "ftsynth_sdk=info,ftsynth_runtime=info";

/// Main engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Install a global tracing subscriber when the engine is built
    pub enable_tracing: bool,

    /// Filter directives for the subscriber, overridden by `RUST_LOG`
    pub log_filter: String,

    /// Return evaluation statistics with each feature matrix
    pub collect_stats: bool,

    /// Fail on unknown instance ids instead of returning missing rows
    pub strict_instances: bool,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self {
            enable_tracing: false,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            collect_stats: false,
            strict_instances: false,
        }
    }

    /// Enable tracing
    pub fn enable_tracing(mut self, enable: bool) -> Self {
        self.enable_tracing = enable;
        self
    }

    /// Set the log filter
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    /// Enable evaluation statistics
    pub fn collect_stats(mut self, enable: bool) -> Self {
        self.collect_stats = enable;
        self
    }

    /// Treat unknown instance ids as errors
    pub fn strict_instances(mut self, enable: bool) -> Self {
        self.strict_instances = enable;
        self
    }

    /// Parse a configuration from YAML text
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
