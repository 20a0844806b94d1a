//! Error types for ftsynth Core
//!
//! Every variant is a construction-time failure: a feature that fails one of
//! these checks is never handed to the evaluation driver.

use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Primitive {primitive} does not accept input type {found} for slot {slot}")]
    TypeMismatch {
        primitive: String,
        found: String,
        slot: usize,
    },

    #[error("Arity error: {0}")]
    Arity(String),

    #[error("Invalid window: {0}")]
    InvalidWindow(String),

    #[error("Entity mismatch: {0}")]
    EntityMismatch(String),

    #[error("Invalid operand: {0}")]
    InvalidOperand(String),

    #[error("Field not found: {0}")]
    FieldNotFound(String),

    #[error("Cyclic dependency detected: {0}")]
    CyclicDependency(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
