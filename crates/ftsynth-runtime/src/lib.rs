//! ftsynth Runtime - Evaluation engine for feature trees
//!
//! This crate evaluates feature trees built with `ftsynth-core`:
//! - Entity-source access layer and an in-memory entity set
//! - Primitive catalogue and kernels (transform, aggregation, cumulative)
//! - Evaluation driver with per-call memoization
//! - Feature matrix results and evaluation statistics

pub mod engine;
pub mod entityset;
pub mod error;
pub mod feature;
pub mod result;

// Re-export commonly used types
pub use engine::{AggregateKind, CumulativeKind, Kernel, PrimitiveCatalogue};
pub use entityset::{ColumnType, EntitySource, EntityTable, InMemoryEntitySet};
pub use error::{Result, RuntimeError};
pub use feature::FeatureExecutor;
pub use result::{EvaluationStats, FeatureColumn, FeatureMatrix};
