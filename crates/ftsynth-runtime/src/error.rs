//! Runtime error types

use ftsynth_core::CoreError;
use thiserror::Error;

/// Runtime error
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Construction error surfaced during planning
    #[error("Feature error: {0}")]
    Core(#[from] CoreError),

    /// Entity not found in the entity source
    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    /// Column not found on an entity
    #[error("Column not found: {entity}.{column}")]
    ColumnNotFound { entity: String, column: String },

    /// No relationship between two entities
    #[error("Relationship not found: {parent} -> {child}")]
    RelationshipNotFound { parent: String, child: String },

    /// Requested features with colliding names
    #[error("Duplicate feature names: {}", .0.join(", "))]
    DuplicateFeatureNames(Vec<String>),

    /// Requested features live on different entities
    #[error("Requested features span entities: {}", .0.join(", "))]
    MixedTargetEntities(Vec<String>),

    /// No features requested
    #[error("No features requested")]
    EmptyRequest,

    /// Instance id not present in the target entity
    #[error("Unknown instance: {0}")]
    UnknownInstance(String),

    /// No kernel registered for a primitive
    #[error("Unsupported primitive: {0}")]
    UnsupportedPrimitive(String),

    /// Invalid entity data
    #[error("Invalid entity data: {0}")]
    InvalidData(String),

    /// Invalid operation
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;
