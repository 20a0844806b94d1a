//! Type system for ftsynth
//!
//! This module contains:
//! - Cell values
//! - Semantic variable types
//! - Entity schemas and relationships

pub mod schema;
pub mod value;
pub mod variable;

pub use schema::{EntitySchema, Relationship, TimeIndex, TimeIndexKind, Variable};
pub use value::{GroupKey, Value};
pub use variable::VariableType;
