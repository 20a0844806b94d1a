//! Feature expression trees
//!
//! - `node`: the immutable feature node and its canonical constructor
//! - `config`: keyword parameters (windows, where clauses, value lists)
//! - `identity`: content-addressed fingerprints
//! - `naming`: human-readable column labels
//! - `ops`: operator and fluent-method sugar

pub mod config;
pub mod identity;
mod naming;
pub mod node;
mod ops;

pub use config::{FeatureConfig, Window};
pub use identity::FeatureId;
pub use node::{Feature, Operand};
