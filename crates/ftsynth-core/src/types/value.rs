//! Cell value types for entity columns and literal operands
//!
//! The `Value` enum represents every value a column can hold, similar to JSON
//! values but with a native datetime variant. `NaN` numbers and `Null` are both
//! treated as missing.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Cell value type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing value
    Null,
    /// Boolean value
    Bool(bool),
    /// Number value (f64 for both integers and floats)
    Number(f64),
    /// Timestamp without timezone
    Datetime(NaiveDateTime),
    /// String value
    String(String),
    /// List of values (membership tests)
    Array(Vec<Value>),
}

impl Value {
    /// Returns true for `Null` and for `NaN` numbers
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Number(n) => n.is_nan(),
            _ => false,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) if !n.is_nan() => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Datetime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// True only for `Bool(true)`; missing and non-boolean values fail a gate
    pub fn is_true(&self) -> bool {
        matches!(self, Value::Bool(true))
    }

    /// Position of this value on an ordering axis.
    ///
    /// Datetimes map to microseconds since the epoch, numbers map to themselves.
    /// Missing values and non-orderable variants have no position.
    pub fn order_key(&self) -> Option<f64> {
        match self {
            Value::Number(n) if !n.is_nan() => Some(*n),
            Value::Datetime(dt) => Some(dt.and_utc().timestamp_micros() as f64),
            _ => None,
        }
    }

    /// Hashable key used for grouping and index lookups; `None` when missing
    pub fn group_key(&self) -> Option<GroupKey> {
        match self {
            Value::Null | Value::Array(_) => None,
            Value::Number(n) if n.is_nan() => None,
            Value::Number(n) => {
                // -0.0 and 0.0 belong to the same group
                let normalized = if *n == 0.0 { 0.0 } else { *n };
                Some(GroupKey::Number(normalized.to_bits()))
            }
            Value::Bool(b) => Some(GroupKey::Bool(*b)),
            Value::String(s) => Some(GroupKey::String(s.clone())),
            Value::Datetime(dt) => Some(GroupKey::Datetime(*dt)),
        }
    }

    /// Ordering between two values of the same kind
    pub fn partial_order(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Number(l), Value::Number(r)) => l.partial_cmp(r),
            (Value::String(l), Value::String(r)) => Some(l.cmp(r)),
            (Value::Datetime(l), Value::Datetime(r)) => Some(l.cmp(r)),
            (Value::Bool(l), Value::Bool(r)) => Some(l.cmp(r)),
            _ => None,
        }
    }

    /// Short type label used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::Datetime(_) => "datetime",
            Value::String(_) => "string",
            Value::Array(_) => "array",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "nan"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => {
                if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::Datetime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            Value::String(s) => write!(f, "{}", s),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::Datetime(dt)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Hashable projection of a non-missing `Value`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Bool(bool),
    Number(u64),
    String(String),
    Datetime(NaiveDateTime),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn datetime(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2011, 4, 9)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_missing_values() {
        assert!(Value::Null.is_missing());
        assert!(Value::Number(f64::NAN).is_missing());
        assert!(!Value::Number(0.0).is_missing());
        assert!(!Value::String(String::new()).is_missing());
    }

    #[test]
    fn test_group_key_merges_signed_zero() {
        assert_eq!(
            Value::Number(0.0).group_key(),
            Value::Number(-0.0).group_key()
        );
        assert_eq!(Value::Number(f64::NAN).group_key(), None);
        assert_eq!(Value::Null.group_key(), None);
    }

    #[test]
    fn test_order_key_for_datetimes() {
        let earlier = Value::Datetime(datetime(10, 30, 0)).order_key().unwrap();
        let later = Value::Datetime(datetime(10, 30, 6)).order_key().unwrap();
        assert_eq!(later - earlier, 6_000_000.0);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Number(2.0).to_string(), "2");
        assert_eq!(Value::Number(4.5).to_string(), "4.5");
        assert_eq!(Value::from("coke zero").to_string(), "coke zero");
        assert_eq!(
            Value::Array(vec![Value::from(5), Value::from(10)]).to_string(),
            "[5, 10]"
        );
    }

    #[test]
    fn test_partial_order_mixed_kinds() {
        assert_eq!(
            Value::from(1).partial_order(&Value::from(2)),
            Some(Ordering::Less)
        );
        assert_eq!(Value::from(1).partial_order(&Value::from("a")), None);
    }

    #[test]
    fn test_value_serde_json() {
        let val = Value::Array(vec![Value::Number(42.0), Value::Bool(true), Value::Null]);
        let json = serde_json::to_string(&val).unwrap();
        assert_eq!(json, "[42.0,true,null]");

        let deserialized: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(val, deserialized);
    }
}
