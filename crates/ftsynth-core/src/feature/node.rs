//! Feature expression tree nodes
//!
//! Every feature other than a raw column is built by [`Feature::construct`],
//! which normalizes operands, checks types, entities and configuration, then
//! derives the identity and name. Operator sugar and helper constructors all
//! funnel through it, so equivalent construction paths yield equal identities.

use crate::error::{CoreError, Result};
use crate::feature::identity::{compute_identity, FeatureId};
use crate::feature::naming::feature_name;
use crate::feature::{FeatureConfig, Window};
use crate::primitive::{Primitive, PrimitiveKind};
use crate::types::{EntitySchema, Relationship, Value, VariableType};
use chrono::NaiveDateTime;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Operand of a feature node: another feature or a literal scalar
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Feature(Feature),
    Literal(Value),
}

impl Operand {
    pub fn as_feature(&self) -> Option<&Feature> {
        match self {
            Operand::Feature(feature) => Some(feature),
            Operand::Literal(_) => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Value> {
        match self {
            Operand::Literal(value) => Some(value),
            Operand::Feature(_) => None,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Operand::Literal(_))
    }

    fn variable_type(&self, slot: usize) -> Result<VariableType> {
        match self {
            Operand::Feature(feature) => Ok(feature.variable_type()),
            Operand::Literal(value) => VariableType::of_literal(value).ok_or_else(|| {
                CoreError::InvalidOperand(format!(
                    "literal {} of type {} cannot be used for slot {}",
                    value,
                    value.type_name(),
                    slot
                ))
            }),
        }
    }
}

impl From<Feature> for Operand {
    fn from(feature: Feature) -> Self {
        Operand::Feature(feature)
    }
}

impl From<&Feature> for Operand {
    fn from(feature: &Feature) -> Self {
        Operand::Feature(feature.clone())
    }
}

impl From<Value> for Operand {
    fn from(value: Value) -> Self {
        Operand::Literal(value)
    }
}

macro_rules! literal_operand {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Operand {
                fn from(value: $t) -> Self {
                    Operand::Literal(Value::from(value))
                }
            }
        )*
    };
}

literal_operand!(f64, i64, i32, bool, &str, String, NaiveDateTime);

/// Immutable feature node
pub struct FeatureNode {
    primitive: Primitive,
    operands: Vec<Operand>,
    config: FeatureConfig,
    entity: Arc<EntitySchema>,
    variable_type: VariableType,
    id: FeatureId,
    name: String,
}

/// Shared handle to a feature node; equality and hashing use the identity
#[derive(Clone)]
pub struct Feature(Arc<FeatureNode>);

impl Feature {
    /// Feature reading a column of an entity as-is
    pub fn variable(entity: &Arc<EntitySchema>, column: &str) -> Result<Feature> {
        let variable = entity.require_variable(column)?.clone();
        let variable_type = variable.variable_type;
        let config = FeatureConfig::new().with_variable(variable);
        Ok(Self::build(
            Primitive::Identity,
            Vec::new(),
            config,
            entity.clone(),
            variable_type,
        ))
    }

    /// Canonical constructor
    pub fn construct(
        primitive: Primitive,
        operands: Vec<Operand>,
        config: FeatureConfig,
    ) -> Result<Feature> {
        if primitive == Primitive::Identity {
            return Err(CoreError::InvalidOperand(
                "identity features are created with Feature::variable".to_string(),
            ));
        }

        let (primitive, mut operands) = normalize_literal_position(primitive, operands)?;

        let first = match operands.first() {
            Some(Operand::Feature(feature)) => feature.clone(),
            _ => {
                return Err(CoreError::Arity(format!(
                    "Primitive {} requires a feature as its first operand",
                    primitive
                )))
            }
        };

        for (slot, operand) in operands.iter().enumerate().skip(1) {
            if operand.is_literal() && !(primitive.is_infix() && slot == 1) {
                return Err(CoreError::InvalidOperand(format!(
                    "Primitive {} does not accept a literal for slot {}",
                    primitive, slot
                )));
            }
        }

        let descriptor = primitive.descriptor();
        if descriptor.commutative && operands.len() == 2 {
            if let (Operand::Feature(a), Operand::Feature(b)) = (&operands[0], &operands[1]) {
                if b.id() < a.id() {
                    operands.swap(0, 1);
                }
            }
        }

        let input_types = operands
            .iter()
            .enumerate()
            .map(|(slot, operand)| operand.variable_type(slot))
            .collect::<Result<Vec<_>>>()?;
        let variable_type = descriptor.resolve(&input_types)?;

        let entity = output_entity(primitive, &first, &operands, &config)?;
        validate_config(primitive, &first, &operands, &config)?;

        Ok(Self::build(primitive, operands, config, entity, variable_type))
    }

    fn build(
        primitive: Primitive,
        operands: Vec<Operand>,
        config: FeatureConfig,
        entity: Arc<EntitySchema>,
        variable_type: VariableType,
    ) -> Feature {
        let id = compute_identity(primitive, &operands, &config);
        let name = feature_name(primitive, &operands, &config);
        Feature(Arc::new(FeatureNode {
            primitive,
            operands,
            config,
            entity,
            variable_type,
            id,
            name,
        }))
    }

    /// Broadcast a parent feature to every matching child row
    pub fn direct(base: &Feature, relationship: &Relationship) -> Result<Feature> {
        Self::construct(
            Primitive::Direct,
            vec![base.into()],
            FeatureConfig::new().with_relationship(relationship.clone()),
        )
    }

    /// Reduce a child feature to one value per parent row
    pub fn aggregate(primitive: Primitive, base: &Feature, relationship: &Relationship) -> Result<Feature> {
        Self::construct(
            primitive,
            vec![base.into()],
            FeatureConfig::new().with_relationship(relationship.clone()),
        )
    }

    /// Gated aggregation: only child rows where `gate` is true contribute
    pub fn aggregate_where(
        primitive: Primitive,
        base: &Feature,
        relationship: &Relationship,
        gate: &Feature,
    ) -> Result<Feature> {
        Self::construct(
            primitive,
            vec![base.into()],
            FeatureConfig::new()
                .with_relationship(relationship.clone())
                .with_where(gate.clone()),
        )
    }

    /// Number of child rows per parent row
    pub fn count(relationship: &Relationship) -> Result<Feature> {
        let index = Feature::variable(&relationship.child, &relationship.child.index)?;
        Self::aggregate(Primitive::Count, &index, relationship)
    }

    /// Single-input transform such as `Hour` or `Percentile`
    pub fn transform(primitive: Primitive, base: &Feature) -> Result<Feature> {
        Self::construct(primitive, vec![base.into()], FeatureConfig::new())
    }

    /// Cumulative primitive of `base` grouped by `group_by`
    pub fn cumulative(
        primitive: Primitive,
        base: &Feature,
        group_by: &Feature,
        config: FeatureConfig,
    ) -> Result<Feature> {
        Self::construct(primitive, vec![base.into(), group_by.into()], config)
    }

    /// Difference from the previous row of the same group
    pub fn diff(base: &Feature, group_by: &Feature) -> Result<Feature> {
        Self::construct(
            Primitive::Diff,
            vec![base.into(), group_by.into()],
            FeatureConfig::new(),
        )
    }

    pub fn primitive(&self) -> Primitive {
        self.0.primitive
    }

    pub fn operands(&self) -> &[Operand] {
        &self.0.operands
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.0.config
    }

    /// Entity the output column lives on
    pub fn entity(&self) -> &Arc<EntitySchema> {
        &self.0.entity
    }

    pub fn variable_type(&self) -> VariableType {
        self.0.variable_type
    }

    pub fn id(&self) -> FeatureId {
        self.0.id
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Feature operands, in order
    pub fn base_features(&self) -> impl Iterator<Item = &Feature> {
        self.0.operands.iter().filter_map(Operand::as_feature)
    }

    /// Every feature this node reads: its base features and its where clause
    pub fn dependencies(&self) -> Vec<&Feature> {
        let mut dependencies: Vec<&Feature> = self.base_features().collect();
        if let Some(gate) = &self.0.config.where_clause {
            dependencies.push(gate);
        }
        dependencies
    }
}

/// Move a left-hand literal to the right, switching to the swapped primitive
fn normalize_literal_position(
    primitive: Primitive,
    mut operands: Vec<Operand>,
) -> Result<(Primitive, Vec<Operand>)> {
    if operands.iter().all(Operand::is_literal) {
        return Err(CoreError::Arity(format!(
            "Primitive {} requires at least one feature operand",
            primitive
        )));
    }

    if operands.len() == 2 && operands[0].is_literal() && !operands[1].is_literal() {
        if let Some(swapped) = primitive.swapped() {
            operands.swap(0, 1);
            return Ok((swapped, operands));
        }
    }
    Ok((primitive, operands))
}

fn output_entity(
    primitive: Primitive,
    first: &Feature,
    operands: &[Operand],
    config: &FeatureConfig,
) -> Result<Arc<EntitySchema>> {
    match primitive.kind() {
        PrimitiveKind::Direct => {
            let rel = require_relationship(primitive, config)?;
            if first.entity().name != rel.parent.name {
                return Err(CoreError::EntityMismatch(format!(
                    "direct feature base {} lives on {}, not on parent {}",
                    first.name(),
                    first.entity().name,
                    rel.parent.name
                )));
            }
            Ok(rel.child.clone())
        }
        PrimitiveKind::Aggregation => {
            let rel = require_relationship(primitive, config)?;
            if first.entity().name != rel.child.name {
                return Err(CoreError::EntityMismatch(format!(
                    "aggregation base {} lives on {}, not on child {}",
                    first.name(),
                    first.entity().name,
                    rel.child.name
                )));
            }
            Ok(rel.parent.clone())
        }
        _ => {
            for feature in operands.iter().filter_map(Operand::as_feature) {
                if feature.entity().name != first.entity().name {
                    return Err(CoreError::EntityMismatch(format!(
                        "Primitive {} combines {} on {} with {} on {}",
                        primitive,
                        first.name(),
                        first.entity().name,
                        feature.name(),
                        feature.entity().name
                    )));
                }
            }
            Ok(first.entity().clone())
        }
    }
}

fn require_relationship(primitive: Primitive, config: &FeatureConfig) -> Result<&Relationship> {
    config.relationship.as_ref().ok_or_else(|| {
        CoreError::InvalidOperand(format!("Primitive {} requires a relationship", primitive))
    })
}

fn validate_config(
    primitive: Primitive,
    first: &Feature,
    operands: &[Operand],
    config: &FeatureConfig,
) -> Result<()> {
    let kind = primitive.kind();

    if config.variable.is_some() {
        return Err(CoreError::InvalidOperand(format!(
            "Primitive {} does not read a column directly",
            primitive
        )));
    }
    if config.relationship.is_some()
        && !matches!(kind, PrimitiveKind::Direct | PrimitiveKind::Aggregation)
    {
        return Err(CoreError::InvalidOperand(format!(
            "Primitive {} does not traverse a relationship",
            primitive
        )));
    }
    if !config.values.is_empty() && primitive != Primitive::IsIn {
        return Err(CoreError::InvalidOperand(format!(
            "Primitive {} does not take a value list",
            primitive
        )));
    }

    if let Some(window) = &config.window {
        if kind != PrimitiveKind::Cumulative {
            return Err(CoreError::InvalidWindow(format!(
                "Primitive {} does not take a window",
                primitive
            )));
        }
        validate_window(window, first, operands)?;
    }

    if let Some(gate) = &config.where_clause {
        if !matches!(kind, PrimitiveKind::Cumulative | PrimitiveKind::Aggregation) {
            return Err(CoreError::InvalidOperand(format!(
                "Primitive {} does not take a where clause",
                primitive
            )));
        }
        if !gate.variable_type().is_a(VariableType::Boolean) {
            return Err(CoreError::InvalidOperand(format!(
                "where clause {} must be boolean, found {}",
                gate.name(),
                gate.variable_type()
            )));
        }
        if gate.entity().name != first.entity().name {
            return Err(CoreError::EntityMismatch(format!(
                "where clause {} lives on {}, base {} lives on {}",
                gate.name(),
                gate.entity().name,
                first.name(),
                first.entity().name
            )));
        }
    }

    Ok(())
}

fn validate_window(window: &Window, first: &Feature, operands: &[Operand]) -> Result<()> {
    match window {
        Window::Observations(0) => Err(CoreError::InvalidWindow(
            "observation window must cover at least one row".to_string(),
        )),
        Window::Observations(_) => Ok(()),
        Window::Duration(_) => {
            match window.duration_micros() {
                Some(micros) if micros > 0 => {}
                _ => {
                    return Err(CoreError::InvalidWindow(
                        "duration window must be positive".to_string(),
                    ))
                }
            }

            let datetime_axis = match operands.get(2).and_then(Operand::as_feature) {
                Some(order) => order.variable_type().is_a(VariableType::Datetime),
                None => first.entity().has_datetime_time_index(),
            };
            if datetime_axis {
                Ok(())
            } else {
                Err(CoreError::InvalidWindow(format!(
                    "duration window needs a datetime time index, entity {} has none",
                    first.entity().name
                )))
            }
        }
    }
}

impl PartialEq for Feature {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Feature {}

impl Hash for Feature {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl fmt::Debug for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Feature")
            .field("name", &self.name())
            .field("id", &self.id())
            .field("entity", &self.entity().name)
            .finish()
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
