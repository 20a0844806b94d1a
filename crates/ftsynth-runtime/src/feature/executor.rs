//! Feature Executor Module
//!
//! This module implements the evaluation driver that:
//! - Validates a request (target entity, name collisions)
//! - Orders the dependency closure of the requested features
//! - Computes every node once per call over its entity's frame
//! - Joins and broadcasts values along relationships
//! - Assembles the result rows in request order

use super::frame::Frame;
use crate::engine::aggregate::{evaluate_aggregate, AggregateInput};
use crate::engine::cumulative::{evaluate_cumulative, CumulativeInput};
use crate::engine::{Kernel, PrimitiveCatalogue};
use crate::entityset::EntitySource;
use crate::error::{Result, RuntimeError};
use crate::result::{EvaluationStats, FeatureColumn, FeatureMatrix};
use ftsynth_core::{CoreError, Feature, FeatureId, Operand, Relationship, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Operand of a row-wise kernel
enum Arg<'a> {
    Column(&'a [Value]),
    Literal(&'a Value),
}

impl<'a> Arg<'a> {
    fn at(&self, row: usize) -> &'a Value {
        match *self {
            Arg::Column(values) => &values[row],
            Arg::Literal(value) => value,
        }
    }
}

/// Per-call state: frames, memoized columns and counters
struct EvaluationContext {
    frames: HashMap<String, Frame>,
    memo: HashMap<FeatureId, Vec<Value>>,
    stats: EvaluationStats,
}

/// Evaluates feature trees against an entity source
pub struct FeatureExecutor {
    /// Entity data
    source: Arc<dyn EntitySource>,

    /// Kernel dispatch table
    catalogue: PrimitiveCatalogue,

    /// Return evaluation statistics with each matrix
    collect_stats: bool,

    /// Fail on instance ids absent from the target frame
    strict_instances: bool,
}

impl FeatureExecutor {
    /// Create a new executor over an entity source with the standard catalogue
    pub fn new(source: Arc<dyn EntitySource>) -> Self {
        Self {
            source,
            catalogue: PrimitiveCatalogue::standard(),
            collect_stats: false,
            strict_instances: false,
        }
    }

    /// Replace the primitive catalogue
    pub fn with_catalogue(mut self, catalogue: PrimitiveCatalogue) -> Self {
        self.catalogue = catalogue;
        self
    }

    /// Enable evaluation statistics
    pub fn with_stats(mut self) -> Self {
        self.collect_stats = true;
        self
    }

    /// Treat unknown instance ids as errors
    pub fn with_strict_instances(mut self) -> Self {
        self.strict_instances = true;
        self
    }

    pub fn source(&self) -> &Arc<dyn EntitySource> {
        &self.source
    }

    pub fn catalogue(&self) -> &PrimitiveCatalogue {
        &self.catalogue
    }

    /// Evaluate `features` for `instance_ids` of their target entity.
    ///
    /// Rows of every entity are restricted to `time <= time_last` when a
    /// cutoff is given. Columns follow the order of `features`; rows follow
    /// the order of `instance_ids`.
    pub fn calculate(
        &self,
        features: &[Feature],
        instance_ids: &[Value],
        time_last: Option<&Value>,
    ) -> Result<FeatureMatrix> {
        let started = Instant::now();
        let target = self.target_entity(features)?;
        check_name_collisions(features)?;

        let mut stats = EvaluationStats::default();
        let plan = sort_by_dependencies(features, &mut stats.memo_hits)?;
        self.check_relationships(&plan)?;

        debug!(
            "Evaluating {} features ({} nodes) on '{}' for {} instances",
            features.len(),
            plan.len(),
            target,
            instance_ids.len()
        );

        let mut context = EvaluationContext {
            frames: HashMap::new(),
            memo: HashMap::new(),
            stats,
        };
        for entity in touched_entities(&plan) {
            let frame = Frame::build(self.source.as_ref(), &entity, time_last)?;
            context.stats.rows_per_entity.insert(entity.clone(), frame.len());
            context.frames.insert(entity, frame);
        }

        for feature in &plan {
            let node_started = Instant::now();
            let values = self.compute_feature(feature, &context)?;
            debug!(
                "Feature '{}' computed over {} rows ({}us)",
                feature.name(),
                values.len(),
                node_started.elapsed().as_micros()
            );
            context.memo.insert(feature.id(), values);
            context.stats.features_computed += 1;
        }

        let matrix = self.assemble(features, instance_ids, &target, context)?;
        info!(
            "Evaluated {} features for {} instances in {}ms",
            matrix.columns.len(),
            matrix.len(),
            started.elapsed().as_millis()
        );
        Ok(matrix)
    }

    /// The single entity all requested features live on
    fn target_entity(&self, features: &[Feature]) -> Result<String> {
        let first = features.first().ok_or(RuntimeError::EmptyRequest)?;
        let mut entities: Vec<String> = Vec::new();
        for feature in features {
            let name = &feature.entity().name;
            if !entities.contains(name) {
                entities.push(name.clone());
            }
        }
        if entities.len() > 1 {
            return Err(RuntimeError::MixedTargetEntities(entities));
        }
        Ok(first.entity().name.clone())
    }

    /// Relationships used by the plan must be declared by the source
    fn check_relationships(&self, plan: &[Feature]) -> Result<()> {
        for feature in plan {
            if let Some(relationship) = &feature.config().relationship {
                let declared = self
                    .source
                    .relationship(&relationship.parent.name, &relationship.child.name)?;
                if declared.child_key != relationship.child_key {
                    return Err(RuntimeError::RelationshipNotFound {
                        parent: relationship.parent.name.clone(),
                        child: format!("{}.{}", relationship.child.name, relationship.child_key),
                    });
                }
            }
        }
        Ok(())
    }

    fn compute_feature(&self, feature: &Feature, context: &EvaluationContext) -> Result<Vec<Value>> {
        let frame = frame_of(context, &feature.entity().name)?;

        match self.catalogue.kernel(feature.primitive())? {
            Kernel::Variable => {
                let variable = feature.config().variable.as_ref().ok_or_else(|| {
                    RuntimeError::InvalidOperation(format!("feature {} has no column", feature.name()))
                })?;
                frame.gather(self.source.as_ref(), &variable.name)
            }

            Kernel::Direct => {
                let relationship = relationship_of(feature)?;
                let parent = frame_of(context, &relationship.parent.name)?;
                let base = memo_column(context, first_feature(feature)?)?;
                let keys = frame.gather(self.source.as_ref(), &relationship.child_key)?;
                Ok(keys
                    .iter()
                    .map(|key| parent.position(key).map_or(Value::Null, |pos| base[pos].clone()))
                    .collect())
            }

            Kernel::RowWise(kernel) => {
                let args: Vec<Arg<'_>> = feature
                    .operands()
                    .iter()
                    .map(|operand| match operand {
                        Operand::Feature(f) => memo_column(context, f).map(Arg::Column),
                        Operand::Literal(value) => Ok(Arg::Literal(value)),
                    })
                    .collect::<Result<_>>()?;

                let mut row_args: Vec<&Value> = Vec::with_capacity(args.len());
                let mut output = Vec::with_capacity(frame.len());
                for row in 0..frame.len() {
                    row_args.clear();
                    row_args.extend(args.iter().map(|arg| arg.at(row)));
                    output.push(kernel(feature.primitive(), &row_args, feature.config())?);
                }
                Ok(output)
            }

            Kernel::Column(kernel) => {
                let columns = feature
                    .base_features()
                    .map(|f| memo_column(context, f))
                    .collect::<Result<Vec<_>>>()?;
                kernel(&columns)
            }

            Kernel::Aggregate(kind) => {
                let relationship = relationship_of(feature)?;
                let child = frame_of(context, &relationship.child.name)?;
                let parent_index = frame.gather(self.source.as_ref(), &relationship.parent.index)?;
                let child_keys = child.gather(self.source.as_ref(), &relationship.child_key)?;
                let values = memo_column(context, first_feature(feature)?)?;
                let gate = where_column(context, feature)?;

                Ok(evaluate_aggregate(
                    kind,
                    &AggregateInput {
                        parent_index: &parent_index,
                        child_keys: &child_keys,
                        values,
                        gate,
                    },
                ))
            }

            Kernel::Cumulative(kind) => {
                let bases: Vec<&Feature> = feature.base_features().collect();
                let (values, groups) = match bases.as_slice() {
                    [values, groups, ..] => (memo_column(context, values)?, memo_column(context, groups)?),
                    _ => {
                        return Err(CoreError::Arity(format!(
                            "{} requires a base and a group feature",
                            feature.primitive()
                        ))
                        .into())
                    }
                };

                let time_index;
                let order: Option<&[Value]> = match bases.get(2) {
                    Some(order) => Some(memo_column(context, order)?),
                    None => match self.source.time_index(&feature.entity().name)? {
                        Some(index) => {
                            time_index = frame.gather(self.source.as_ref(), &index.column)?;
                            Some(time_index.as_slice())
                        }
                        None => None,
                    },
                };

                evaluate_cumulative(
                    kind,
                    &CumulativeInput {
                        values,
                        groups,
                        order,
                        gate: where_column(context, feature)?,
                        window: feature.config().window,
                    },
                )
            }
        }
    }

    /// Collect requested columns, one row per instance id
    fn assemble(
        &self,
        features: &[Feature],
        instance_ids: &[Value],
        target: &str,
        context: EvaluationContext,
    ) -> Result<FeatureMatrix> {
        let frame = frame_of(&context, target)?;
        let positions: Vec<Option<usize>> = instance_ids
            .iter()
            .map(|id| {
                let position = frame.position(id);
                if position.is_none() && self.strict_instances {
                    return Err(RuntimeError::UnknownInstance(id.to_string()));
                }
                Ok(position)
            })
            .collect::<Result<_>>()?;

        let mut seen = HashSet::new();
        let mut columns = Vec::new();
        for feature in features {
            if !seen.insert(feature.id()) {
                continue;
            }
            let values = memo_column(&context, feature)?;
            columns.push(FeatureColumn {
                name: feature.name().to_string(),
                id: feature.id().to_hex(),
                values: positions
                    .iter()
                    .map(|pos| pos.map_or(Value::Null, |p| values[p].clone()))
                    .collect(),
            });
        }

        if self.collect_stats {
            debug!(
                "Evaluation stats: {} computed, {} memo hits",
                context.stats.features_computed, context.stats.memo_hits
            );
        }

        Ok(FeatureMatrix {
            instance_ids: instance_ids.to_vec(),
            columns,
            stats: self.collect_stats.then_some(context.stats),
        })
    }
}

/// Distinct features sharing one name, reported together
fn check_name_collisions(features: &[Feature]) -> Result<()> {
    let mut by_name: Vec<(&str, Vec<FeatureId>)> = Vec::new();
    for feature in features {
        match by_name.iter_mut().find(|(name, _)| *name == feature.name()) {
            Some((_, ids)) => {
                if !ids.contains(&feature.id()) {
                    ids.push(feature.id());
                }
            }
            None => by_name.push((feature.name(), vec![feature.id()])),
        }
    }

    let collisions: Vec<String> = by_name
        .into_iter()
        .filter(|(_, ids)| ids.len() > 1)
        .map(|(name, ids)| format!("{} ({} features)", name, ids.len()))
        .collect();
    if collisions.is_empty() {
        Ok(())
    } else {
        Err(RuntimeError::DuplicateFeatureNames(collisions))
    }
}

/// Sort the dependency closure of `features` so every node follows its inputs
fn sort_by_dependencies(features: &[Feature], memo_hits: &mut usize) -> Result<Vec<Feature>> {
    let mut sorted = Vec::new();
    let mut visited = HashSet::new();
    let mut visiting = HashSet::new();

    for feature in features {
        visit_feature(feature, &mut sorted, &mut visited, &mut visiting, memo_hits)?;
    }

    Ok(sorted)
}

fn visit_feature(
    feature: &Feature,
    sorted: &mut Vec<Feature>,
    visited: &mut HashSet<FeatureId>,
    visiting: &mut HashSet<FeatureId>,
    memo_hits: &mut usize,
) -> Result<()> {
    let id = feature.id();
    if visited.contains(&id) {
        *memo_hits += 1;
        return Ok(());
    }

    if visiting.contains(&id) {
        return Err(CoreError::CyclicDependency(feature.name().to_string()).into());
    }

    visiting.insert(id);

    for dependency in feature.dependencies() {
        visit_feature(dependency, sorted, visited, visiting, memo_hits)?;
    }

    visiting.remove(&id);
    visited.insert(id);
    sorted.push(feature.clone());

    Ok(())
}

/// Entities whose frames the plan reads, in first-use order
fn touched_entities(plan: &[Feature]) -> Vec<String> {
    let mut entities: Vec<String> = Vec::new();
    let mut add = |name: &str| {
        if !entities.iter().any(|e| e == name) {
            entities.push(name.to_string());
        }
    };
    for feature in plan {
        add(&feature.entity().name);
        if let Some(relationship) = &feature.config().relationship {
            add(&relationship.parent.name);
            add(&relationship.child.name);
        }
    }
    entities
}

fn frame_of<'c>(context: &'c EvaluationContext, entity: &str) -> Result<&'c Frame> {
    context
        .frames
        .get(entity)
        .ok_or_else(|| RuntimeError::EntityNotFound(entity.to_string()))
}

fn memo_column<'c>(context: &'c EvaluationContext, feature: &Feature) -> Result<&'c [Value]> {
    context
        .memo
        .get(&feature.id())
        .map(Vec::as_slice)
        .ok_or_else(|| {
            RuntimeError::InvalidOperation(format!(
                "feature {} read before it was computed",
                feature.name()
            ))
        })
}

fn where_column<'c>(context: &'c EvaluationContext, feature: &Feature) -> Result<Option<&'c [Value]>> {
    feature
        .config()
        .where_clause
        .as_ref()
        .map(|gate| memo_column(context, gate))
        .transpose()
}

fn first_feature(feature: &Feature) -> Result<&Feature> {
    feature.base_features().next().ok_or_else(|| {
        RuntimeError::Core(CoreError::Arity(format!(
            "{} requires a base feature",
            feature.primitive()
        )))
    })
}

fn relationship_of(feature: &Feature) -> Result<&Relationship> {
    feature.config().relationship.as_ref().ok_or_else(|| {
        RuntimeError::InvalidOperation(format!("feature {} has no relationship", feature.name()))
    })
}
