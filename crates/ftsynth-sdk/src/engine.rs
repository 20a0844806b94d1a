//! FeatureEngine - evaluation entry point

use crate::config::EngineConfig;
use crate::error::Result;
use ftsynth_core::{Feature, Value};
use ftsynth_runtime::{EntitySource, FeatureExecutor, FeatureMatrix};
use std::sync::Arc;

/// Configured evaluation engine
pub struct FeatureEngine {
    config: EngineConfig,
    executor: FeatureExecutor,
}

impl FeatureEngine {
    pub(crate) fn new(config: EngineConfig, executor: FeatureExecutor) -> Self {
        Self { config, executor }
    }

    /// Evaluate features for the given instances of their target entity.
    ///
    /// `time_last` restricts every entity to rows at or before the cutoff.
    pub fn evaluate(
        &self,
        features: &[Feature],
        instance_ids: &[Value],
        time_last: Option<&Value>,
    ) -> Result<FeatureMatrix> {
        Ok(self.executor.calculate(features, instance_ids, time_last)?)
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Entity source the engine reads from
    pub fn source(&self) -> &Arc<dyn EntitySource> {
        self.executor.source()
    }
}
