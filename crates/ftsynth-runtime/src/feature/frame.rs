//! Entity frames
//!
//! A frame is the subset of an entity's rows visible to one evaluation call:
//! every row whose time index is at or before the cutoff, in source order.
//! Feature columns are computed over whole frames and aligned with them.

use crate::entityset::EntitySource;
use crate::error::{Result, RuntimeError};
use ftsynth_core::{GroupKey, TimeIndexKind, Value};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub(crate) struct Frame {
    pub entity: String,
    /// Source row of each frame position
    pub rows: Vec<usize>,
    /// Frame position of each index value
    pub positions: HashMap<GroupKey, usize>,
}

impl Frame {
    /// Build the frame of `entity` under an optional cutoff
    pub fn build(source: &dyn EntitySource, entity: &str, time_last: Option<&Value>) -> Result<Self> {
        let schema = source.schema(entity)?;
        let row_count = source.row_count(entity)?;

        let rows: Vec<usize> = match (source.time_index(entity)?, time_last) {
            (Some(time_index), Some(cutoff)) => {
                let cutoff_key = match (time_index.kind, cutoff) {
                    (TimeIndexKind::Datetime, Value::Datetime(_))
                    | (TimeIndexKind::Integer, Value::Number(_)) => cutoff.order_key(),
                    _ => None,
                }
                .ok_or_else(|| {
                    RuntimeError::InvalidOperation(format!(
                        "cutoff {} does not match the {:?} time index of {}",
                        cutoff, time_index.kind, entity
                    ))
                })?;

                let times = source.column(entity, &time_index.column)?;
                (0..row_count)
                    .filter(|&row| times[row].order_key().is_some_and(|t| t <= cutoff_key))
                    .collect()
            }
            _ => (0..row_count).collect(),
        };

        let index = source.column(entity, &schema.index)?;
        let positions = rows
            .iter()
            .enumerate()
            .filter_map(|(pos, &row)| index[row].group_key().map(|key| (key, pos)))
            .collect();

        Ok(Self {
            entity: entity.to_string(),
            rows,
            positions,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Values of a source column restricted to this frame
    pub fn gather(&self, source: &dyn EntitySource, column: &str) -> Result<Vec<Value>> {
        let values = source.column(&self.entity, column)?;
        Ok(self.rows.iter().map(|&row| values[row].clone()).collect())
    }

    /// Frame position of an index value
    pub fn position(&self, id: &Value) -> Option<usize> {
        id.group_key().and_then(|key| self.positions.get(&key).copied())
    }
}
