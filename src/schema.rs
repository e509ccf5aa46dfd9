//! Table schema: named, ordered column descriptors plus the mapper registry
//! that converts their values.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::errors::{Result, RowbindError};
use crate::mappers::MapperRegistry;
use crate::types::{DataType, FieldDescriptor};

/// A table's column layout. Columns keep their declaration order for SQL
/// generation; lookups go through a map.
///
/// The schema carries its registry so that everything downstream of a schema
/// (argument resolution, predicate binding, row decoding) converts values
/// with the same mapper set the table was declared against.
#[derive(Clone)]
pub struct TableSchema {
    name: String,
    order: Vec<String>,
    columns: BTreeMap<String, FieldDescriptor>,
    registry: Arc<MapperRegistry>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>, registry: Arc<MapperRegistry>) -> Self {
        Self {
            name: name.into(),
            order: Vec::new(),
            columns: BTreeMap::new(),
            registry,
        }
    }

    /// Add a column. Re-declaring a name replaces the descriptor but keeps
    /// the original position.
    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        let name = field.name.clone();
        if self.columns.insert(name.clone(), field).is_none() {
            self.order.push(name);
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registry(&self) -> &MapperRegistry {
        &self.registry
    }

    pub fn field(&self, column: &str) -> Option<&FieldDescriptor> {
        self.columns.get(column)
    }

    /// Like [`field`](Self::field), but an unknown column is an error.
    pub fn require_field(&self, column: &str) -> Result<&FieldDescriptor> {
        self.field(column).ok_or_else(|| RowbindError::NoSuchColumn {
            table: self.name.clone(),
            column: column.to_string(),
        })
    }

    /// Columns in declaration order.
    pub fn columns(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.order.iter().filter_map(|name| self.columns.get(name))
    }

    /// Key columns in declaration order.
    pub fn keys(&self) -> Vec<&FieldDescriptor> {
        self.columns().filter(|f| f.is_key()).collect()
    }

    /// Uniqueness-constrained columns that are not part of the key.
    pub fn unique_columns(&self) -> Vec<&FieldDescriptor> {
        self.columns()
            .filter(|f| f.is_unique() && !f.is_key())
            .collect()
    }

    /// The storage column type a field maps to.
    pub fn storage_type(&self, column: &str) -> Result<DataType> {
        let field = self.require_field(column)?;
        self.registry.storage_type(&field.field_type, field)
    }
}

impl std::fmt::Debug for TableSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableSchema")
            .field("name", &self.name)
            .field("columns", &self.order)
            .finish()
    }
}
