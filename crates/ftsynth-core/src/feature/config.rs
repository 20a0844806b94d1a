//! Non-structural feature parameters

use crate::feature::Feature;
use crate::types::{Relationship, Value, Variable};
use chrono::TimeDelta;

/// How far back a cumulative primitive looks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Window {
    /// The N most recent eligible rows of the group
    Observations(usize),
    /// Eligible rows less than this span before the current row
    Duration(TimeDelta),
}

impl Window {
    pub fn observations(n: usize) -> Self {
        Window::Observations(n)
    }

    pub fn duration(span: TimeDelta) -> Self {
        Window::Duration(span)
    }

    /// Span on the ordering axis, in microseconds
    pub fn duration_micros(&self) -> Option<i64> {
        match self {
            Window::Duration(span) => span.num_microseconds(),
            Window::Observations(_) => None,
        }
    }

    /// Phrase used inside feature names
    pub fn describe(&self) -> String {
        match self {
            Window::Observations(1) => "last 1 observation".to_string(),
            Window::Observations(n) => format!("last {} observations", n),
            Window::Duration(span) => {
                let seconds = span.num_seconds();
                if span.subsec_nanos() != 0 {
                    format!("last {} microseconds", span.num_microseconds().unwrap_or(i64::MAX))
                } else if seconds % 86_400 == 0 {
                    format!("last {} days", seconds / 86_400)
                } else if seconds % 3_600 == 0 {
                    format!("last {} hours", seconds / 3_600)
                } else if seconds % 60 == 0 {
                    format!("last {} minutes", seconds / 60)
                } else {
                    format!("last {} seconds", seconds)
                }
            }
        }
    }
}

/// Keyword parameters of a feature node
///
/// Defaults are omitted from both identity and name.
#[derive(Debug, Clone, Default)]
pub struct FeatureConfig {
    /// Column read by an identity feature
    pub variable: Option<Variable>,

    /// Relationship traversed by direct and aggregation features
    pub relationship: Option<Relationship>,

    /// Lookback bound of a cumulative feature
    pub window: Option<Window>,

    /// Boolean gate selecting the rows that count
    pub where_clause: Option<Feature>,

    /// Membership list of `IsIn`
    pub values: Vec<Value>,
}

impl FeatureConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_variable(mut self, variable: Variable) -> Self {
        self.variable = Some(variable);
        self
    }

    pub fn with_relationship(mut self, relationship: Relationship) -> Self {
        self.relationship = Some(relationship);
        self
    }

    pub fn with_window(mut self, window: Window) -> Self {
        self.window = Some(window);
        self
    }

    pub fn with_where(mut self, gate: Feature) -> Self {
        self.where_clause = Some(gate);
        self
    }

    pub fn with_values(mut self, values: Vec<Value>) -> Self {
        self.values = values;
        self
    }
}
