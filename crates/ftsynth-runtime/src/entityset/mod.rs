//! Entity-set access layer
//!
//! The evaluation driver reads entity data only through the [`EntitySource`]
//! trait. [`InMemoryEntitySet`] is the column-oriented implementation used by
//! the SDK and by tests.

use crate::error::{Result, RuntimeError};
use ftsynth_core::{EntitySchema, Relationship, TimeIndex, TimeIndexKind, Value, VariableType};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Semantic type and nullability of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnType {
    pub variable_type: VariableType,
    pub nullable: bool,
}

/// Read-only access to entities, columns and relationships
pub trait EntitySource: Send + Sync {
    /// Schema of an entity
    fn schema(&self, entity: &str) -> Result<Arc<EntitySchema>>;

    /// Number of rows of an entity
    fn row_count(&self, entity: &str) -> Result<usize>;

    /// Column values aligned with the entity's rows
    fn column(&self, entity: &str, column: &str) -> Result<&[Value]>;

    /// Semantic type of a column plus whether it holds missing values
    fn column_type(&self, entity: &str, column: &str) -> Result<ColumnType>;

    /// Time index of an entity, if any
    fn time_index(&self, entity: &str) -> Result<Option<TimeIndex>> {
        Ok(self.schema(entity)?.time_index.clone())
    }

    /// Relationship linking `child` rows to `parent` rows
    fn relationship(&self, parent: &str, child: &str) -> Result<Relationship>;
}

/// Column-oriented table definition
#[derive(Debug, Clone)]
pub struct EntityTable {
    name: String,
    index: String,
    time_index: Option<(String, TimeIndexKind)>,
    columns: Vec<(String, VariableType, Vec<Value>)>,
}

impl EntityTable {
    /// Create a new table definition
    pub fn new(name: impl Into<String>, index: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            index: index.into(),
            time_index: None,
            columns: Vec::new(),
        }
    }

    /// Add a column
    pub fn with_column<V: Into<Value>>(
        mut self,
        name: impl Into<String>,
        variable_type: VariableType,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.columns.push((name.into(), variable_type, values));
        self
    }

    /// Set the time index column
    pub fn with_time_index(mut self, column: impl Into<String>, kind: TimeIndexKind) -> Self {
        self.time_index = Some((column.into(), kind));
        self
    }
}

#[derive(Debug, Clone)]
struct StoredEntity {
    schema: Arc<EntitySchema>,
    columns: HashMap<String, Vec<Value>>,
    rows: usize,
}

/// In-memory entity set
#[derive(Debug, Clone, Default)]
pub struct InMemoryEntitySet {
    entities: HashMap<String, StoredEntity>,
    relationships: Vec<Relationship>,
}

impl InMemoryEntitySet {
    /// Create an empty entity set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity, validating its columns, and return its schema
    pub fn add_entity(&mut self, table: EntityTable) -> Result<Arc<EntitySchema>> {
        if self.entities.contains_key(&table.name) {
            return Err(RuntimeError::InvalidData(format!(
                "entity {} already exists",
                table.name
            )));
        }

        let rows = table.columns.first().map(|(_, _, v)| v.len()).unwrap_or(0);
        let mut schema = EntitySchema::new(table.name.clone(), table.index.clone());
        let mut columns = HashMap::new();

        for (name, variable_type, values) in table.columns {
            if values.len() != rows {
                return Err(RuntimeError::InvalidData(format!(
                    "column {}.{} has {} rows, expected {}",
                    table.name,
                    name,
                    values.len(),
                    rows
                )));
            }
            if name != table.index {
                schema = schema.add_variable(name.clone(), variable_type);
            }
            columns.insert(name, values);
        }

        let index_values = columns.get(&table.index).ok_or_else(|| {
            RuntimeError::InvalidData(format!(
                "entity {} is missing its index column {}",
                table.name, table.index
            ))
        })?;
        let mut seen = HashSet::new();
        for value in index_values {
            let key = value.group_key().ok_or_else(|| {
                RuntimeError::InvalidData(format!("entity {} has a missing index value", table.name))
            })?;
            if !seen.insert(key) {
                return Err(RuntimeError::InvalidData(format!(
                    "entity {} has duplicate index value {}",
                    table.name, value
                )));
            }
        }

        if let Some((column, kind)) = table.time_index {
            if !columns.contains_key(&column) {
                return Err(RuntimeError::ColumnNotFound {
                    entity: table.name,
                    column,
                });
            }
            schema = schema.with_time_index(column, kind);
        }

        let schema = Arc::new(schema);
        self.entities.insert(
            schema.name.clone(),
            StoredEntity {
                schema: schema.clone(),
                columns,
                rows,
            },
        );
        Ok(schema)
    }

    /// Link `child.child_key` to the index of `parent`
    pub fn add_relationship(&mut self, parent: &str, child: &str, child_key: &str) -> Result<Relationship> {
        let parent_schema = self.schema(parent)?;
        let child_schema = self.schema(child)?;
        let relationship = Relationship::new(parent_schema, child_schema, child_key)?;
        self.relationships.push(relationship.clone());
        Ok(relationship)
    }

    /// Copy of this entity set with one column's values replaced.
    ///
    /// Schemas of the copy are shared with the original, so features built
    /// against either set evaluate against both.
    pub fn with_column_values<V: Into<Value>>(
        &self,
        entity: &str,
        column: &str,
        values: impl IntoIterator<Item = V>,
    ) -> Result<Self> {
        let mut copy = self.clone();
        let stored = copy
            .entities
            .get_mut(entity)
            .ok_or_else(|| RuntimeError::EntityNotFound(entity.to_string()))?;
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        if values.len() != stored.rows {
            return Err(RuntimeError::InvalidData(format!(
                "column {}.{} needs {} rows, got {}",
                entity,
                column,
                stored.rows,
                values.len()
            )));
        }
        let slot = stored
            .columns
            .get_mut(column)
            .ok_or_else(|| RuntimeError::ColumnNotFound {
                entity: entity.to_string(),
                column: column.to_string(),
            })?;
        *slot = values;
        Ok(copy)
    }

    fn stored(&self, entity: &str) -> Result<&StoredEntity> {
        self.entities
            .get(entity)
            .ok_or_else(|| RuntimeError::EntityNotFound(entity.to_string()))
    }
}

impl EntitySource for InMemoryEntitySet {
    fn schema(&self, entity: &str) -> Result<Arc<EntitySchema>> {
        Ok(self.stored(entity)?.schema.clone())
    }

    fn row_count(&self, entity: &str) -> Result<usize> {
        Ok(self.stored(entity)?.rows)
    }

    fn column(&self, entity: &str, column: &str) -> Result<&[Value]> {
        self.stored(entity)?
            .columns
            .get(column)
            .map(Vec::as_slice)
            .ok_or_else(|| RuntimeError::ColumnNotFound {
                entity: entity.to_string(),
                column: column.to_string(),
            })
    }

    fn column_type(&self, entity: &str, column: &str) -> Result<ColumnType> {
        let stored = self.stored(entity)?;
        let variable = stored.schema.variable(column).ok_or_else(|| RuntimeError::ColumnNotFound {
            entity: entity.to_string(),
            column: column.to_string(),
        })?;
        let nullable = stored
            .columns
            .get(column)
            .map(|values| values.iter().any(Value::is_missing))
            .unwrap_or(false);
        Ok(ColumnType {
            variable_type: variable.variable_type,
            nullable,
        })
    }

    fn relationship(&self, parent: &str, child: &str) -> Result<Relationship> {
        self.relationships
            .iter()
            .find(|r| r.parent.name == parent && r.child.name == child)
            .cloned()
            .ok_or_else(|| RuntimeError::RelationshipNotFound {
                parent: parent.to_string(),
                child: child.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sessions() -> EntityTable {
        EntityTable::new("sessions", "id")
            .with_column("id", VariableType::Index, [0, 1, 2])
            .with_column("customer_id", VariableType::Id, vec![Value::from(0), Value::from(0), Value::Null])
    }

    #[test]
    fn test_add_entity_and_read_columns() {
        let mut es = InMemoryEntitySet::new();
        let schema = es.add_entity(sessions()).unwrap();

        assert_eq!(schema.name, "sessions");
        assert_eq!(es.row_count("sessions").unwrap(), 3);
        assert_eq!(es.column("sessions", "id").unwrap()[2], Value::Number(2.0));
        assert!(es.time_index("sessions").unwrap().is_none());

        let column_type = es.column_type("sessions", "customer_id").unwrap();
        assert_eq!(column_type.variable_type, VariableType::Id);
        assert!(column_type.nullable);
        assert!(!es.column_type("sessions", "id").unwrap().nullable);
    }

    #[test]
    fn test_ragged_columns_are_rejected() {
        let mut es = InMemoryEntitySet::new();
        let table = EntityTable::new("t", "id")
            .with_column("id", VariableType::Index, [0, 1])
            .with_column("x", VariableType::Numeric, [1.0]);
        assert!(matches!(es.add_entity(table), Err(RuntimeError::InvalidData(_))));
    }

    #[test]
    fn test_duplicate_index_is_rejected() {
        let mut es = InMemoryEntitySet::new();
        let table = EntityTable::new("t", "id").with_column("id", VariableType::Index, [0, 0]);
        assert!(matches!(es.add_entity(table), Err(RuntimeError::InvalidData(_))));
    }

    #[test]
    fn test_relationships() {
        let mut es = InMemoryEntitySet::new();
        es.add_entity(EntityTable::new("customers", "id").with_column("id", VariableType::Index, [0]))
            .unwrap();
        es.add_entity(sessions()).unwrap();

        let rel = es.add_relationship("customers", "sessions", "customer_id").unwrap();
        assert_eq!(rel.child_key, "customer_id");
        assert_eq!(es.relationship("customers", "sessions").unwrap(), rel);
        assert!(matches!(
            es.relationship("sessions", "customers"),
            Err(RuntimeError::RelationshipNotFound { .. })
        ));
    }

    #[test]
    fn test_with_column_values_leaves_original_untouched() {
        let mut es = InMemoryEntitySet::new();
        es.add_entity(sessions()).unwrap();

        let variant = es.with_column_values("sessions", "customer_id", [5, 5, 5]).unwrap();
        assert_eq!(variant.column("sessions", "customer_id").unwrap()[0], Value::from(5));
        assert_eq!(es.column("sessions", "customer_id").unwrap()[0], Value::from(0));
        assert!(es.with_column_values("sessions", "customer_id", [1]).is_err());
    }
}
