//! Unary operator execution

use crate::error::{Result, RuntimeError};
use ftsynth_core::{Primitive, Value};

/// Execute a unary primitive
pub(crate) fn execute_unary_op(operand: &Value, primitive: Primitive) -> Result<Value> {
    match (primitive, operand) {
        (Primitive::IsNull, value) => Ok(Value::Bool(value.is_missing())),
        (_, value) if value.is_missing() => Ok(Value::Null),
        (Primitive::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (Primitive::Negate, Value::Number(n)) => Ok(Value::Number(-n)),
        _ => Err(RuntimeError::InvalidOperation(format!(
            "Cannot apply {} to {:?}",
            primitive, operand
        ))),
    }
}
