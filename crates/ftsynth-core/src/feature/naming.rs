//! Human-readable feature names
//!
//! Names are derived from the same data as identities but never from the
//! identity itself.

use crate::feature::{FeatureConfig, Operand};
use crate::primitive::{Primitive, PrimitiveKind};
use crate::types::Value;

pub(crate) fn feature_name(primitive: Primitive, operands: &[Operand], config: &FeatureConfig) -> String {
    match primitive.kind() {
        PrimitiveKind::Identity => config
            .variable
            .as_ref()
            .map(|v| v.name.clone())
            .unwrap_or_default(),
        PrimitiveKind::Direct => {
            let parent = config
                .relationship
                .as_ref()
                .map(|r| r.parent.name.as_str())
                .unwrap_or_default();
            format!("{}.{}", parent, plain(&operands[0]))
        }
        PrimitiveKind::Transform => transform_name(primitive, operands, config),
        PrimitiveKind::Cumulative => cumulative_name(primitive, operands, config),
        PrimitiveKind::Aggregation => aggregation_name(primitive, operands, config),
    }
}

fn transform_name(primitive: Primitive, operands: &[Operand], config: &FeatureConfig) -> String {
    if let Some(symbol) = primitive.symbol() {
        let (left, right) = if primitive.is_reversed() {
            (&operands[1], &operands[0])
        } else {
            (&operands[0], &operands[1])
        };
        return format!("{} {} {}", nested(left), symbol, nested(right));
    }

    match primitive {
        Primitive::Negate => format!("-({})", plain(&operands[0])),
        Primitive::IsIn => format!(
            "{}.isin({})",
            plain(&operands[0]),
            Value::Array(config.values.clone())
        ),
        Primitive::Diff => format!(
            "{}({} by {})",
            primitive.display_name(),
            plain(&operands[0]),
            plain(&operands[1])
        ),
        _ => format!("{}({})", primitive.display_name(), plain(&operands[0])),
    }
}

fn cumulative_name(primitive: Primitive, operands: &[Operand], config: &FeatureConfig) -> String {
    let mut inner = format!("{} by {}", plain(&operands[0]), plain(&operands[1]));
    if let Some(order) = operands.get(2) {
        inner.push_str(&format!(" ordered by {}", plain(order)));
    }
    if let Some(window) = &config.window {
        inner.push_str(&format!(", {}", window.describe()));
    }
    push_where(&mut inner, config);
    format!("{}({})", primitive.display_name(), inner)
}

fn aggregation_name(primitive: Primitive, operands: &[Operand], config: &FeatureConfig) -> String {
    let base = match &operands[0] {
        Operand::Feature(feature) => feature,
        Operand::Literal(value) => return format!("{}({})", primitive.display_name(), value),
    };
    let mut inner = match &config.relationship {
        // COUNT over the child index reads as COUNT(child)
        Some(rel)
            if base.primitive() == Primitive::Identity && base.name() == rel.child.index =>
        {
            rel.child.name.clone()
        }
        Some(rel) => format!("{}.{}", rel.child.name, base.name()),
        None => base.name().to_string(),
    };
    push_where(&mut inner, config);
    format!("{}({})", primitive.display_name(), inner)
}

fn push_where(inner: &mut String, config: &FeatureConfig) {
    if let Some(gate) = &config.where_clause {
        inner.push_str(" WHERE ");
        inner.push_str(gate.name());
    }
}

fn plain(operand: &Operand) -> String {
    match operand {
        Operand::Feature(feature) => feature.name().to_string(),
        Operand::Literal(value) => value.to_string(),
    }
}

/// Infix children are parenthesized so `(a + b) * c` and `a + (b * c)` differ
fn nested(operand: &Operand) -> String {
    match operand {
        Operand::Feature(feature) if feature.primitive().is_infix() => {
            format!("({})", feature.name())
        }
        _ => plain(operand),
    }
}
