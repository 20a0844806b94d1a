//! Evaluation driver
//!
//! - `frame`: cutoff-filtered row sets per entity
//! - `executor`: dependency ordering, memoized node evaluation and assembly

mod executor;
mod frame;

pub use executor::FeatureExecutor;
