//! Comparison operator execution

use crate::error::{Result, RuntimeError};
use ftsynth_core::{Primitive, Value};
use std::cmp::Ordering;

/// Execute a comparison primitive
pub(crate) fn execute_compare(left: &Value, primitive: Primitive, right: &Value) -> Result<bool> {
    // Missing compared to anything returns false
    if left.is_missing() || right.is_missing() {
        tracing::trace!(
            "Missing value in comparison: {:?} {} {:?}, returning false",
            left,
            primitive,
            right
        );
        return Ok(false);
    }

    let ordering = left.partial_order(right);

    match primitive {
        Primitive::Equal => Ok(ordering == Some(Ordering::Equal)),
        Primitive::NotEqual => Ok(ordering != Some(Ordering::Equal)),
        Primitive::LessThan
        | Primitive::LessThanEqual
        | Primitive::GreaterThan
        | Primitive::GreaterThanEqual => {
            let ordering = ordering.ok_or_else(|| {
                RuntimeError::InvalidOperation(format!(
                    "Cannot compare {:?} and {:?} with {}",
                    left, right, primitive
                ))
            })?;
            Ok(match primitive {
                Primitive::LessThan => ordering == Ordering::Less,
                Primitive::LessThanEqual => ordering != Ordering::Greater,
                Primitive::GreaterThan => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            })
        }
        _ => Err(RuntimeError::InvalidOperation(format!(
            "{} is not a comparison",
            primitive
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_comparisons() {
        let values = [0.0, 5.0, 10.0, 15.0];
        let ten = Value::Number(10.0);
        let check = |primitive: Primitive| -> Vec<bool> {
            values
                .iter()
                .map(|v| execute_compare(&Value::Number(*v), primitive, &ten).unwrap())
                .collect()
        };

        assert_eq!(check(Primitive::Equal), vec![false, false, true, false]);
        assert_eq!(check(Primitive::NotEqual), vec![true, true, false, true]);
        assert_eq!(check(Primitive::LessThan), vec![true, true, false, false]);
        assert_eq!(check(Primitive::LessThanEqual), vec![true, true, true, false]);
        assert_eq!(check(Primitive::GreaterThan), vec![false, false, false, true]);
        assert_eq!(check(Primitive::GreaterThanEqual), vec![false, false, true, true]);
    }

    #[test]
    fn test_missing_compares_false() {
        assert!(!execute_compare(&Value::Null, Primitive::Equal, &Value::from("brown bag")).unwrap());
        assert!(!execute_compare(&Value::Number(f64::NAN), Primitive::NotEqual, &Value::Number(1.0)).unwrap());
    }

    #[test]
    fn test_mixed_kinds() {
        assert!(!execute_compare(&Value::from(1), Primitive::Equal, &Value::from("1")).unwrap());
        assert!(execute_compare(&Value::from(1), Primitive::NotEqual, &Value::from("1")).unwrap());
        assert!(execute_compare(&Value::from(1), Primitive::LessThan, &Value::from("1")).is_err());
    }
}
