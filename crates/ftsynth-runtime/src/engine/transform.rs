//! Transform kernels
//!
//! Row-wise kernels map one row's operand values to one output value.
//! Column kernels see a whole frame column at once, for transforms whose
//! output depends on other rows (percentile rank, diff).

use super::operators::{execute_binary_op, execute_unary_op};
use crate::error::{Result, RuntimeError};
use ftsynth_core::{FeatureConfig, GroupKey, Primitive, Value};
use chrono::{Datelike, Timelike};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Operands of a kernel, checked against the count it reads
fn operands<'a, T>(kernel: &str, items: &'a [T], expected: usize) -> Result<&'a [T]> {
    if items.len() == expected {
        Ok(items)
    } else {
        Err(RuntimeError::InvalidOperation(format!(
            "{} kernel expects {} operands, got {}",
            kernel,
            expected,
            items.len()
        )))
    }
}

pub(crate) fn binary_kernel(primitive: Primitive, args: &[&Value], _config: &FeatureConfig) -> Result<Value> {
    let args = operands("binary", args, 2)?;
    execute_binary_op(args[0], primitive, args[1])
}

pub(crate) fn unary_kernel(primitive: Primitive, args: &[&Value], _config: &FeatureConfig) -> Result<Value> {
    let args = operands("unary", args, 1)?;
    execute_unary_op(args[0], primitive)
}

pub(crate) fn datetime_part_kernel(
    primitive: Primitive,
    args: &[&Value],
    _config: &FeatureConfig,
) -> Result<Value> {
    let args = operands("datetime part", args, 1)?;
    let dt = match args[0] {
        Value::Datetime(dt) => dt,
        v if v.is_missing() => return Ok(Value::Null),
        v => {
            return Err(RuntimeError::InvalidOperation(format!(
                "{} expects a datetime, got {:?}",
                primitive, v
            )))
        }
    };

    let part = match primitive {
        Primitive::Year => dt.year() as f64,
        Primitive::Month => dt.month() as f64,
        Primitive::Day => dt.day() as f64,
        Primitive::Hour => dt.hour() as f64,
        Primitive::Minute => dt.minute() as f64,
        Primitive::Second => dt.second() as f64,
        Primitive::Weekday => dt.weekday().num_days_from_monday() as f64,
        _ => {
            return Err(RuntimeError::InvalidOperation(format!(
                "{} is not a datetime part",
                primitive
            )))
        }
    };
    Ok(Value::Number(part))
}

pub(crate) fn is_in_kernel(_primitive: Primitive, args: &[&Value], config: &FeatureConfig) -> Result<Value> {
    let value = operands("isin", args, 1)?[0];
    if value.is_missing() {
        return Ok(Value::Bool(false));
    }
    let found = config
        .values
        .iter()
        .any(|candidate| value.partial_order(candidate) == Some(Ordering::Equal));
    Ok(Value::Bool(found))
}

/// Percentile rank over the whole column: average rank of ties divided by
/// the number of non-missing values. Missing values stay missing.
pub(crate) fn percentile_kernel(columns: &[&[Value]]) -> Result<Vec<Value>> {
    let values = operands("percentile", columns, 1)?[0];
    let mut present: Vec<(usize, f64)> = values
        .iter()
        .enumerate()
        .filter_map(|(row, v)| v.as_f64().map(|n| (row, n)))
        .collect();
    present.sort_by(|a, b| a.1.total_cmp(&b.1));

    let count = present.len() as f64;
    let mut output = vec![Value::Null; values.len()];
    let mut start = 0;
    while start < present.len() {
        let mut end = start;
        while end + 1 < present.len() && present[end + 1].1 == present[start].1 {
            end += 1;
        }
        // 1-based ranks start+1 ..= end+1, averaged
        let rank = (start + end + 2) as f64 / 2.0;
        for &(row, _) in &present[start..=end] {
            output[row] = Value::Number(rank / count);
        }
        start = end + 1;
    }
    Ok(output)
}

/// Difference from the previous row of the same group, in frame order
pub(crate) fn diff_kernel(columns: &[&[Value]]) -> Result<Vec<Value>> {
    let columns = operands("diff", columns, 2)?;
    let (values, groups) = (columns[0], columns[1]);
    let mut previous: HashMap<GroupKey, &Value> = HashMap::new();
    let mut output = Vec::with_capacity(values.len());

    for (value, group) in values.iter().zip(groups) {
        let diff = match group.group_key() {
            None => Value::Null,
            Some(key) => match previous.insert(key, value) {
                None => Value::Null,
                Some(prior) => execute_binary_op(value, Primitive::Subtract, prior)?,
            },
        };
        output.push(diff);
    }
    Ok(output)
}
