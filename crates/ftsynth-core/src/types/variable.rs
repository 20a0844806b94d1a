//! Semantic variable types
//!
//! Every column carries a semantic tag that primitives check their inputs
//! against. Tags form a small hierarchy: a column tagged `Id` is also
//! `Categorical` and `Discrete`, and everything is `Any`.

use crate::types::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic type tag for a column or feature output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableType {
    Any,
    Numeric,
    Categorical,
    Id,
    Index,
    Ordinal,
    Discrete,
    Boolean,
    Datetime,
    DatetimeTimeIndex,
    NumericTimeIndex,
    Text,
    Timedelta,
}

impl VariableType {
    /// Direct parent in the type hierarchy
    pub fn parent(&self) -> Option<VariableType> {
        match self {
            VariableType::Any => None,
            VariableType::Id | VariableType::Index => Some(VariableType::Categorical),
            VariableType::Categorical | VariableType::Ordinal => Some(VariableType::Discrete),
            VariableType::DatetimeTimeIndex => Some(VariableType::Datetime),
            VariableType::NumericTimeIndex => Some(VariableType::Numeric),
            _ => Some(VariableType::Any),
        }
    }

    /// Returns true if a value of this type may be used where `other` is declared
    pub fn is_a(&self, other: VariableType) -> bool {
        if other == VariableType::Id && *self == VariableType::Index {
            return true;
        }
        let mut current = Some(*self);
        while let Some(t) = current {
            if t == other {
                return true;
            }
            current = t.parent();
        }
        false
    }

    /// Narrowest type for a literal operand
    pub fn of_literal(value: &Value) -> Option<VariableType> {
        match value {
            Value::Number(_) => Some(VariableType::Numeric),
            Value::String(_) => Some(VariableType::Categorical),
            Value::Bool(_) => Some(VariableType::Boolean),
            Value::Datetime(_) => Some(VariableType::Datetime),
            Value::Null | Value::Array(_) => None,
        }
    }

    pub fn is_time_index(&self) -> bool {
        matches!(
            self,
            VariableType::DatetimeTimeIndex | VariableType::NumericTimeIndex
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            VariableType::Any => "any",
            VariableType::Numeric => "numeric",
            VariableType::Categorical => "categorical",
            VariableType::Id => "id",
            VariableType::Index => "index",
            VariableType::Ordinal => "ordinal",
            VariableType::Discrete => "discrete",
            VariableType::Boolean => "boolean",
            VariableType::Datetime => "datetime",
            VariableType::DatetimeTimeIndex => "datetime_time_index",
            VariableType::NumericTimeIndex => "numeric_time_index",
            VariableType::Text => "text",
            VariableType::Timedelta => "timedelta",
        }
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
