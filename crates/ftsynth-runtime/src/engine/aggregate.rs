//! Grouped aggregation kernels
//!
//! Child rows are grouped by their foreign key and reduced to one value per
//! parent row. Missing values never contribute; a parent without
//! contributing children gets `0` for count and sum and a missing value for
//! everything else.

use ftsynth_core::{GroupKey, Value};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateKind {
    Count,
    Sum,
    Mean,
    Min,
    Max,
    Mode,
}

/// Inputs of one aggregation, all aligned to frames
pub(crate) struct AggregateInput<'a> {
    /// Index values of the parent frame
    pub parent_index: &'a [Value],
    /// Foreign key of each child row
    pub child_keys: &'a [Value],
    /// Base feature values of each child row
    pub values: &'a [Value],
    /// Optional boolean gate of each child row
    pub gate: Option<&'a [Value]>,
}

pub(crate) fn evaluate_aggregate(kind: AggregateKind, input: &AggregateInput<'_>) -> Vec<Value> {
    let positions: HashMap<GroupKey, usize> = input
        .parent_index
        .iter()
        .enumerate()
        .filter_map(|(pos, id)| id.group_key().map(|key| (key, pos)))
        .collect();

    let mut groups: Vec<Vec<&Value>> = vec![Vec::new(); input.parent_index.len()];
    for (row, (key, value)) in input.child_keys.iter().zip(input.values).enumerate() {
        if let Some(gate) = input.gate {
            if !gate[row].is_true() {
                continue;
            }
        }
        if value.is_missing() {
            continue;
        }
        if let Some(pos) = key.group_key().and_then(|k| positions.get(&k)) {
            groups[*pos].push(value);
        }
    }

    groups.iter().map(|group| reduce(kind, group)).collect()
}

fn reduce(kind: AggregateKind, group: &[&Value]) -> Value {
    let numbers = || group.iter().filter_map(|v| v.as_f64());
    match kind {
        AggregateKind::Count => Value::Number(group.len() as f64),
        AggregateKind::Sum => Value::Number(numbers().sum()),
        AggregateKind::Mean => {
            let count = numbers().count();
            if count == 0 {
                Value::Null
            } else {
                Value::Number(numbers().sum::<f64>() / count as f64)
            }
        }
        AggregateKind::Min => numbers().reduce(f64::min).map(Value::Number).unwrap_or(Value::Null),
        AggregateKind::Max => numbers().reduce(f64::max).map(Value::Number).unwrap_or(Value::Null),
        AggregateKind::Mode => mode(group),
    }
}

/// Most frequent value; ties go to the value seen first
fn mode(group: &[&Value]) -> Value {
    let mut counts: HashMap<GroupKey, (usize, usize)> = HashMap::new();
    for (position, value) in group.iter().enumerate() {
        if let Some(key) = value.group_key() {
            counts.entry(key).or_insert((0, position)).0 += 1;
        }
    }

    counts
        .values()
        .max_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)))
        .map(|&(_, first)| group[first].clone())
        .unwrap_or(Value::Null)
}
