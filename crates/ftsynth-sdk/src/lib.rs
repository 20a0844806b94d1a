//! ftsynth Feature Engine SDK
//!
//! High-level API for building an engine over an entity source and
//! evaluating feature trees into feature matrices.

pub mod builder;
pub mod config;
pub mod engine;
pub mod error;

// Re-export main types
pub use builder::FeatureEngineBuilder;
pub use config::{EngineConfig, DEFAULT_LOG_FILTER};
pub use engine::FeatureEngine;
pub use error::{Result, SdkError};

// Re-export commonly used types from dependencies
pub use ftsynth_core::{
    CoreError, EntitySchema, Feature, FeatureConfig, Operand, Primitive, PrimitiveKind, Relationship,
    TimeIndexKind, Value, VariableType, Window,
};
pub use ftsynth_runtime::{
    EntitySource, EntityTable, EvaluationStats, FeatureMatrix, InMemoryEntitySet, PrimitiveCatalogue,
    RuntimeError,
};
