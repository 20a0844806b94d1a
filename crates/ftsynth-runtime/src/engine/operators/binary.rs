//! Binary operator execution

use super::comparison::execute_compare;
use crate::error::{Result, RuntimeError};
use ftsynth_core::{Primitive, Value};

/// Execute a binary primitive on two scalars
pub(crate) fn execute_binary_op(left: &Value, primitive: Primitive, right: &Value) -> Result<Value> {
    if primitive.is_reversed() {
        return execute_binary_op(right, primitive.forward(), left);
    }

    if primitive.is_comparison() {
        return execute_compare(left, primitive, right).map(Value::Bool);
    }

    // A missing operand in any arithmetic or logical operation returns Null
    if left.is_missing() || right.is_missing() {
        tracing::trace!(
            "Null in binary operation: {:?} {} {:?}, returning Null",
            left,
            primitive,
            right
        );
        return Ok(Value::Null);
    }

    match (left, primitive, right) {
        // Division by zero follows IEEE 754: inf, -inf or NaN
        (Value::Number(l), Primitive::Add, Value::Number(r)) => Ok(Value::Number(l + r)),
        (Value::Number(l), Primitive::Subtract, Value::Number(r)) => Ok(Value::Number(l - r)),
        (Value::Number(l), Primitive::Multiply, Value::Number(r)) => Ok(Value::Number(l * r)),
        (Value::Number(l), Primitive::Divide, Value::Number(r)) => Ok(Value::Number(l / r)),
        (Value::Number(l), Primitive::Modulo, Value::Number(r)) => Ok(Value::Number(floor_mod(*l, *r))),

        (Value::Datetime(l), Primitive::Subtract, Value::Datetime(r)) => {
            let delta = *l - *r;
            let seconds = delta
                .num_microseconds()
                .map(|us| us as f64 / 1_000_000.0)
                .unwrap_or_else(|| delta.num_seconds() as f64);
            Ok(Value::Number(seconds))
        }

        (Value::Bool(l), Primitive::And, Value::Bool(r)) => Ok(Value::Bool(*l && *r)),
        (Value::Bool(l), Primitive::Or, Value::Bool(r)) => Ok(Value::Bool(*l || *r)),

        _ => Err(RuntimeError::InvalidOperation(format!(
            "Cannot apply {} to {:?} and {:?}",
            primitive, left, right
        ))),
    }
}

/// Modulo whose result takes the sign of the divisor
fn floor_mod(l: f64, r: f64) -> f64 {
    let m = l % r;
    if m != 0.0 && (m < 0.0) != (r < 0.0) {
        m + r
    } else {
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: f64) -> Value {
        Value::Number(n)
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(execute_binary_op(&num(5.0), Primitive::Add, &num(2.0)).unwrap(), num(7.0));
        assert_eq!(execute_binary_op(&num(5.0), Primitive::Subtract, &num(2.0)).unwrap(), num(3.0));
        assert_eq!(execute_binary_op(&num(5.0), Primitive::Divide, &num(2.0)).unwrap(), num(2.5));
    }

    #[test]
    fn test_reverse_variants_swap_operands() {
        assert_eq!(
            execute_binary_op(&num(5.0), Primitive::ReverseSubtract, &num(2.0)).unwrap(),
            num(-3.0)
        );
        assert_eq!(
            execute_binary_op(&num(5.0), Primitive::ReverseDivide, &num(2.0)).unwrap(),
            num(0.4)
        );
    }

    #[test]
    fn test_division_by_zero_is_ieee() {
        assert_eq!(
            execute_binary_op(&num(5.0), Primitive::Divide, &num(0.0)).unwrap(),
            num(f64::INFINITY)
        );
        assert!(execute_binary_op(&num(0.0), Primitive::Divide, &num(0.0))
            .unwrap()
            .is_missing());
        assert!(execute_binary_op(&num(3.0), Primitive::Modulo, &num(0.0))
            .unwrap()
            .is_missing());
    }

    #[test]
    fn test_modulo_takes_divisor_sign() {
        assert_eq!(execute_binary_op(&num(-3.0), Primitive::Modulo, &num(5.0)).unwrap(), num(2.0));
        assert_eq!(execute_binary_op(&num(7.0), Primitive::Modulo, &num(5.0)).unwrap(), num(2.0));
    }

    #[test]
    fn test_null_propagates() {
        assert_eq!(execute_binary_op(&Value::Null, Primitive::Add, &num(1.0)).unwrap(), Value::Null);
        assert!(execute_binary_op(&num(f64::NAN), Primitive::Multiply, &num(1.0))
            .unwrap()
            .is_missing());
    }

    #[test]
    fn test_nan_cell_in_logical_and_datetime_ops_is_missing() {
        let nan = num(f64::NAN);
        let dt = Value::Datetime(
            chrono::NaiveDate::from_ymd_opt(2011, 4, 9)
                .unwrap()
                .and_hms_opt(10, 30, 0)
                .unwrap(),
        );
        for (left, primitive, right) in [
            (&Value::Bool(true), Primitive::And, &nan),
            (&nan, Primitive::Or, &Value::Bool(false)),
            (&dt, Primitive::Subtract, &nan),
        ] {
            assert_eq!(execute_binary_op(left, primitive, right).unwrap(), Value::Null);
        }
    }

    #[test]
    fn test_logical() {
        let t = Value::Bool(true);
        let f = Value::Bool(false);
        assert_eq!(execute_binary_op(&t, Primitive::And, &f).unwrap(), f);
        assert_eq!(execute_binary_op(&t, Primitive::Or, &f).unwrap(), t);
    }

    #[test]
    fn test_type_error() {
        let result = execute_binary_op(&Value::from("a"), Primitive::Add, &num(1.0));
        assert!(matches!(result, Err(RuntimeError::InvalidOperation(_))));
    }
}
