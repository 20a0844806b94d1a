//! ftsynth Core - Core types and definitions for the ftsynth feature engine
//!
//! This crate provides the building blocks shared by the evaluation runtime:
//! - Value and variable types for entity columns
//! - Entity schemas and relationships
//! - Primitive descriptors and type signatures
//! - Feature expression trees with content-addressed identities
//! - Error types

pub mod error;
pub mod feature;
pub mod primitive;
pub mod types;

// Re-export commonly used types
pub use error::{CoreError, Result};
pub use feature::{Feature, FeatureConfig, FeatureId, Operand, Window};
pub use primitive::{Primitive, PrimitiveDescriptor, PrimitiveKind, ReturnType, Signature};
pub use types::{
    EntitySchema, GroupKey, Relationship, TimeIndex, TimeIndexKind, Value, Variable,
    VariableType,
};
