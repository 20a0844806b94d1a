//! Builder pattern for FeatureEngine

use crate::config::EngineConfig;
use crate::engine::FeatureEngine;
use crate::error::{Result, SdkError};
use ftsynth_runtime::{EntitySource, FeatureExecutor, PrimitiveCatalogue};
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Builder for FeatureEngine
///
/// # Example
///
/// ```rust,ignore
/// use ftsynth_sdk::FeatureEngineBuilder;
///
/// let engine = FeatureEngineBuilder::new()
///     .with_entity_source(Arc::new(entity_set))
///     .enable_stats(true)
///     .build()?;
///
/// let matrix = engine.evaluate(&[cum_sum], &instance_ids, None)?;
/// ```
pub struct FeatureEngineBuilder {
    config: EngineConfig,
    source: Option<Arc<dyn EntitySource>>,
    catalogue: Option<PrimitiveCatalogue>,
}

impl FeatureEngineBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            config: EngineConfig::new(),
            source: None,
            catalogue: None,
        }
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the entity source features are evaluated against
    pub fn with_entity_source(mut self, source: Arc<dyn EntitySource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Use a custom primitive catalogue instead of the standard one
    pub fn with_catalogue(mut self, catalogue: PrimitiveCatalogue) -> Self {
        self.catalogue = Some(catalogue);
        self
    }

    /// Enable evaluation statistics
    pub fn enable_stats(mut self, enable: bool) -> Self {
        self.config.collect_stats = enable;
        self
    }

    /// Enable tracing
    pub fn enable_tracing(mut self, enable: bool) -> Self {
        self.config.enable_tracing = enable;
        self
    }

    /// Treat unknown instance ids as errors
    pub fn strict_instances(mut self, enable: bool) -> Self {
        self.config.strict_instances = enable;
        self
    }

    /// Build the engine
    pub fn build(self) -> Result<FeatureEngine> {
        let source = self
            .source
            .ok_or_else(|| SdkError::ConfigError("No entity source configured".to_string()))?;

        if self.config.enable_tracing {
            init_tracing(&self.config.log_filter);
        }

        let mut executor = FeatureExecutor::new(source);
        if let Some(catalogue) = self.catalogue {
            executor = executor.with_catalogue(catalogue);
        }
        if self.config.collect_stats {
            executor = executor.with_stats();
        }
        if self.config.strict_instances {
            executor = executor.with_strict_instances();
        }

        tracing::info!(
            "Feature engine ready ({} primitives)",
            executor.catalogue().len()
        );
        Ok(FeatureEngine::new(self.config, executor))
    }
}

impl Default for FeatureEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Install the global subscriber; an already installed one is kept
fn init_tracing(log_filter: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_filter));

    if let Err(e) = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
    {
        tracing::debug!("Tracing already initialized: {}", e);
    }
}
