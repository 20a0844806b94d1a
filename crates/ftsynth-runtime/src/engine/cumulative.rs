//! Windowed cumulative aggregation
//!
//! Rows are partitioned by group key and walked in (order key, row position)
//! order. Each partition keeps a [`WindowState`] holding the rows currently
//! inside the lookback window: a running sum and count for sum and mean,
//! and monotonic deques for min and max, so every row is pushed and evicted
//! once.
//!
//! A row that fails the gate is never pushed. Under unbounded and observation
//! windows it reports the window as it stands at its position, carrying the
//! last qualifying total forward. A duration window is anchored on qualifying
//! rows only, so a gated-out row reports the value of an empty window.

use crate::error::{Result, RuntimeError};
use ftsynth_core::{GroupKey, Value, Window};
use std::collections::{HashMap, VecDeque};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CumulativeKind {
    Sum,
    Mean,
    Min,
    Max,
    Count,
}

/// Columns of one cumulative evaluation, all aligned to the same frame
pub(crate) struct CumulativeInput<'a> {
    pub values: &'a [Value],
    pub groups: &'a [Value],
    /// Ordering axis; row position when absent
    pub order: Option<&'a [Value]>,
    /// Rows where the gate is not `true` never enter the window
    pub gate: Option<&'a [Value]>,
    pub window: Option<Window>,
}

pub(crate) fn evaluate_cumulative(kind: CumulativeKind, input: &CumulativeInput<'_>) -> Result<Vec<Value>> {
    let span = match input.window {
        Some(window @ Window::Duration(_)) => {
            if input.order.is_none() {
                return Err(RuntimeError::InvalidOperation(
                    "duration window requires an ordering column".to_string(),
                ));
            }
            let micros = window.duration_micros().ok_or_else(|| {
                RuntimeError::InvalidOperation(format!("window {} is out of range", window.describe()))
            })?;
            Some(micros as f64)
        }
        _ => None,
    };
    let limit = match input.window {
        Some(Window::Observations(n)) => Some(n),
        _ => None,
    };

    let mut output = vec![Value::Null; input.values.len()];
    for partition in partition_rows(input) {
        let mut state = WindowState::new(limit, span);
        for (time, row) in partition {
            let eligible = input.gate.map_or(true, |gate| gate[row].is_true());
            if eligible {
                state.push(time, &input.values[row]);
            }
            state.evict(time);
            output[row] = if eligible || span.is_none() {
                state.output(kind)
            } else {
                empty_output(kind)
            };
        }
    }

    tracing::trace!(
        "Cumulative {:?} over {} rows (window: {:?})",
        kind,
        input.values.len(),
        input.window
    );
    Ok(output)
}

/// Group rows in first-seen order, each group sorted by (order key, row).
///
/// Rows with a missing group key or a missing order key are left out and
/// keep a missing output.
fn partition_rows(input: &CumulativeInput<'_>) -> Vec<Vec<(f64, usize)>> {
    let mut slots: HashMap<GroupKey, usize> = HashMap::new();
    let mut partitions: Vec<Vec<(f64, usize)>> = Vec::new();

    for (row, group) in input.groups.iter().enumerate() {
        let Some(key) = group.group_key() else {
            continue;
        };
        let time = match input.order {
            Some(order) => match order[row].order_key() {
                Some(time) => time,
                None => continue,
            },
            None => row as f64,
        };
        let slot = *slots.entry(key).or_insert_with(|| {
            partitions.push(Vec::new());
            partitions.len() - 1
        });
        partitions[slot].push((time, row));
    }

    for partition in &mut partitions {
        partition.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    }
    partitions
}

fn empty_output(kind: CumulativeKind) -> Value {
    match kind {
        CumulativeKind::Sum | CumulativeKind::Count => Value::Number(0.0),
        CumulativeKind::Mean | CumulativeKind::Min | CumulativeKind::Max => Value::Null,
    }
}

/// Running sum with Neumaier compensation, so evictions do not drift
#[derive(Debug, Default)]
struct CompensatedSum {
    sum: f64,
    compensation: f64,
}

impl CompensatedSum {
    fn add(&mut self, v: f64) {
        let total = self.sum + v;
        if total.is_finite() {
            if self.sum.abs() >= v.abs() {
                self.compensation += (self.sum - total) + v;
            } else {
                self.compensation += (v - total) + self.sum;
            }
        }
        self.sum = total;
    }

    fn value(&self) -> f64 {
        self.sum + self.compensation
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug)]
struct Entry {
    seq: u64,
    time: f64,
    value: Option<f64>,
}

/// Rows currently inside one group's window
#[derive(Debug)]
struct WindowState {
    entries: VecDeque<Entry>,
    sum: CompensatedSum,
    valued: usize,
    mins: VecDeque<(u64, f64)>,
    maxs: VecDeque<(u64, f64)>,
    next_seq: u64,
    limit: Option<usize>,
    span: Option<f64>,
}

impl WindowState {
    fn new(limit: Option<usize>, span: Option<f64>) -> Self {
        Self {
            entries: VecDeque::new(),
            sum: CompensatedSum::default(),
            valued: 0,
            mins: VecDeque::new(),
            maxs: VecDeque::new(),
            next_seq: 0,
            limit,
            span,
        }
    }

    fn push(&mut self, time: f64, value: &Value) {
        let seq = self.next_seq;
        self.next_seq += 1;

        let value = value.as_f64();
        if let Some(v) = value {
            self.sum.add(v);
            self.valued += 1;
            while self.mins.back().is_some_and(|&(_, m)| m >= v) {
                self.mins.pop_back();
            }
            self.mins.push_back((seq, v));
            while self.maxs.back().is_some_and(|&(_, m)| m <= v) {
                self.maxs.pop_back();
            }
            self.maxs.push_back((seq, v));
        }
        self.entries.push_back(Entry { seq, time, value });

        if let Some(limit) = self.limit {
            while self.entries.len() > limit {
                self.pop_front();
            }
        }
    }

    /// Drop entries at least `span` before `now`
    fn evict(&mut self, now: f64) {
        let Some(span) = self.span else {
            return;
        };
        while self.entries.front().is_some_and(|entry| now - entry.time >= span) {
            self.pop_front();
        }
    }

    fn pop_front(&mut self) {
        let Some(entry) = self.entries.pop_front() else {
            return;
        };
        if let Some(v) = entry.value {
            self.sum.add(-v);
            self.valued -= 1;
        }
        if self.valued == 0 {
            self.sum.reset();
        }
        while self.mins.front().is_some_and(|&(seq, _)| seq <= entry.seq) {
            self.mins.pop_front();
        }
        while self.maxs.front().is_some_and(|&(seq, _)| seq <= entry.seq) {
            self.maxs.pop_front();
        }
    }

    fn output(&self, kind: CumulativeKind) -> Value {
        match kind {
            CumulativeKind::Sum => Value::Number(self.sum.value()),
            CumulativeKind::Count => Value::Number(self.entries.len() as f64),
            CumulativeKind::Mean if self.valued == 0 => Value::Null,
            CumulativeKind::Mean => Value::Number(self.sum.value() / self.valued as f64),
            CumulativeKind::Min => self.mins.front().map_or(Value::Null, |&(_, v)| Value::Number(v)),
            CumulativeKind::Max => self.maxs.front().map_or(Value::Null, |&(_, v)| Value::Number(v)),
        }
    }
}
