//! Content-addressed feature identities
//!
//! A feature's identity is the BLAKE3 digest of a canonical JSON description
//! of its primitive, its ordered operands and its non-default configuration.
//! Children contribute only their own identities, so the digest composes.

use crate::feature::{FeatureConfig, Operand, Window};
use crate::primitive::Primitive;
use crate::types::Value;
use serde_json::{json, Map, Value as Json};
use std::fmt;

/// Opaque, comparable feature fingerprint
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureId([u8; 16]);

impl FeatureId {
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FeatureId({})", self.to_hex())
    }
}

/// Hash the canonical description of a feature node
pub(crate) fn compute_identity(
    primitive: Primitive,
    operands: &[Operand],
    config: &FeatureConfig,
) -> FeatureId {
    let canonical = canonical_form(primitive, operands, config);
    let digest = blake3::hash(canonical.to_string().as_bytes());

    let mut id = [0u8; 16];
    id.copy_from_slice(&digest.as_bytes()[..16]);
    FeatureId(id)
}

fn canonical_form(primitive: Primitive, operands: &[Operand], config: &FeatureConfig) -> Json {
    let operands: Vec<Json> = operands
        .iter()
        .map(|operand| match operand {
            Operand::Feature(feature) => json!({ "feature": feature.id().to_hex() }),
            Operand::Literal(value) => json!({ "literal": literal_form(value) }),
        })
        .collect();

    json!({
        "primitive": primitive.name(),
        "operands": operands,
        "config": config_form(config),
    })
}

/// Only non-default entries appear, so adding a new option never changes old identities
fn config_form(config: &FeatureConfig) -> Json {
    let mut map = Map::new();

    if let Some(variable) = &config.variable {
        map.insert(
            "variable".to_string(),
            json!(format!("{}.{}", variable.entity, variable.name)),
        );
    }
    if let Some(relationship) = &config.relationship {
        map.insert("relationship".to_string(), json!(relationship.key()));
    }
    if let Some(window) = &config.window {
        let window = match window {
            Window::Observations(n) => json!({ "observations": n }),
            Window::Duration(_) => json!({ "duration_us": window.duration_micros() }),
        };
        map.insert("window".to_string(), window);
    }
    if let Some(gate) = &config.where_clause {
        map.insert("where".to_string(), json!(gate.id().to_hex()));
    }
    if !config.values.is_empty() {
        let values: Vec<Json> = config.values.iter().map(literal_form).collect();
        map.insert("values".to_string(), Json::Array(values));
    }

    Json::Object(map)
}

/// Tagged so that the number 2 and the string "2" hash differently
fn literal_form(value: &Value) -> Json {
    match value {
        Value::Null => json!({ "null": true }),
        Value::Bool(b) => json!({ "bool": b }),
        Value::Number(n) => json!({ "number_bits": number_bits(*n) }),
        Value::Datetime(dt) => json!({ "datetime": dt.to_string() }),
        Value::String(s) => json!({ "string": s }),
        Value::Array(items) => Json::Array(items.iter().map(literal_form).collect()),
    }
}

/// Exact bit pattern; `-0.0` folds into `0.0` and every NaN into one NaN
fn number_bits(n: f64) -> u64 {
    if n == 0.0 {
        0.0f64.to_bits()
    } else if n.is_nan() {
        f64::NAN.to_bits()
    } else {
        n.to_bits()
    }
}
