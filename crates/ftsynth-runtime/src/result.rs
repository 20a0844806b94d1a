//! Evaluation result types

use ftsynth_core::{Feature, Value};
use serde::Serialize;
use std::collections::BTreeMap;

/// One output column of a feature matrix
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureColumn {
    /// Feature name
    pub name: String,

    /// Hex identity of the feature
    pub id: String,

    /// One value per requested instance
    pub values: Vec<Value>,
}

/// Counters collected during one evaluation call
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EvaluationStats {
    /// Distinct feature nodes computed
    pub features_computed: usize,

    /// Times an already planned node was reached again
    pub memo_hits: usize,

    /// Frame size of every entity touched
    pub rows_per_entity: BTreeMap<String, usize>,
}

/// Table of feature values, one row per requested instance id
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureMatrix {
    /// Requested instance ids, in request order
    pub instance_ids: Vec<Value>,

    /// Columns in request order
    pub columns: Vec<FeatureColumn>,

    /// Present when statistics collection is enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<EvaluationStats>,
}

impl FeatureMatrix {
    /// Number of rows
    pub fn len(&self) -> usize {
        self.instance_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instance_ids.is_empty()
    }

    /// Column names in order
    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Column values by feature name
    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    /// Column values of a feature, matched by identity
    pub fn column_for(&self, feature: &Feature) -> Option<&[Value]> {
        let id = feature.id().to_hex();
        self.columns
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.values.as_slice())
    }

    /// Single cell by row position and feature name
    pub fn value(&self, row: usize, name: &str) -> Option<&Value> {
        self.column(name).and_then(|values| values.get(row))
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
