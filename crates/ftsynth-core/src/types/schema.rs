//! Entity schema definitions
//!
//! Schemas describe the columns of an entity, its index and optional time
//! index, and the foreign-key relationships between entities. Features hold
//! `Arc<EntitySchema>` references; row data stays with the entity source.

use crate::error::{CoreError, Result};
use crate::types::VariableType;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A reference to one column in one entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Variable {
    /// Owning entity name
    pub entity: String,

    /// Column name
    pub name: String,

    /// Semantic type tag
    pub variable_type: VariableType,
}

impl Variable {
    pub fn new(entity: impl Into<String>, name: impl Into<String>, variable_type: VariableType) -> Self {
        Self {
            entity: entity.into(),
            name: name.into(),
            variable_type,
        }
    }
}

/// Whether a time index holds real timestamps or a synthetic integer axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeIndexKind {
    Datetime,
    Integer,
}

/// Time index of an entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeIndex {
    pub column: String,
    pub kind: TimeIndexKind,
}

/// Schema of one entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySchema {
    /// Entity name
    pub name: String,

    /// Primary key column
    pub index: String,

    /// Optional time index
    pub time_index: Option<TimeIndex>,

    /// Columns in declaration order
    pub variables: Vec<Variable>,
}

impl EntitySchema {
    /// Create a new schema with only an index column
    pub fn new(name: impl Into<String>, index: impl Into<String>) -> Self {
        let name = name.into();
        let index = index.into();
        let variables = vec![Variable::new(name.clone(), index.clone(), VariableType::Index)];
        Self {
            name,
            index,
            time_index: None,
            variables,
        }
    }

    /// Add a column; re-adding an existing column replaces its type
    pub fn add_variable(mut self, name: impl Into<String>, variable_type: VariableType) -> Self {
        let name = name.into();
        if let Some(existing) = self.variables.iter_mut().find(|v| v.name == name) {
            existing.variable_type = variable_type;
        } else {
            self.variables
                .push(Variable::new(self.name.clone(), name, variable_type));
        }
        self
    }

    /// Designate a time index; the column is retagged as a time index type
    pub fn with_time_index(mut self, column: impl Into<String>, kind: TimeIndexKind) -> Self {
        let column = column.into();
        let variable_type = match kind {
            TimeIndexKind::Datetime => VariableType::DatetimeTimeIndex,
            TimeIndexKind::Integer => VariableType::NumericTimeIndex,
        };
        self = self.add_variable(column.clone(), variable_type);
        self.time_index = Some(TimeIndex { column, kind });
        self
    }

    /// Get a variable by name
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Get a variable by name or fail with `FieldNotFound`
    pub fn require_variable(&self, name: &str) -> Result<&Variable> {
        self.variable(name)
            .ok_or_else(|| CoreError::FieldNotFound(format!("{}.{}", self.name, name)))
    }

    pub fn has_datetime_time_index(&self) -> bool {
        matches!(
            self.time_index,
            Some(TimeIndex {
                kind: TimeIndexKind::Datetime,
                ..
            })
        )
    }
}

/// Foreign-key link from a child entity column to a parent entity's index
#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    pub parent: Arc<EntitySchema>,
    pub child: Arc<EntitySchema>,
    pub child_key: String,
}

impl Relationship {
    /// Create a relationship, checking that the key column exists on the child
    pub fn new(
        parent: Arc<EntitySchema>,
        child: Arc<EntitySchema>,
        child_key: impl Into<String>,
    ) -> Result<Self> {
        let child_key = child_key.into();
        child.require_variable(&child_key)?;
        Ok(Self {
            parent,
            child,
            child_key,
        })
    }

    /// Stable textual key, used in feature identities
    pub fn key(&self) -> String {
        format!("{}.{}->{}", self.child.name, self.child_key, self.parent.name)
    }
}
