//! Ordered, first-match mapper resolution.

use std::fmt;
use std::sync::Arc;

use crate::argument::Argument;
use crate::errors::{Result, RowbindError};
use crate::mappers::{
    ArrayMapper, BlobMapper, BooleanMapper, DoubleMapper, EnumMapper, IdMapper, IntegerMapper,
    JsonMapper, LongMapper, OptionalMapper, SerialMapper, StringMapper, TimestampMapper,
    TypeMapper, UuidMapper,
};
use crate::row::ResultRow;
use crate::types::{DataType, FieldDescriptor, FieldType, Value};

/// The ordered list of converters.
///
/// Resolution scans in list order and returns the first mapper whose
/// `accepts` matches; a miss is a configuration error, never a silent
/// coercion. [`MapperRegistry::add_mapper`] prepends, so caller-supplied
/// mappers take precedence over every built-in. The list is populated at
/// construction and must not be mutated while shared across threads.
pub struct MapperRegistry {
    mappers: Vec<Arc<dyn TypeMapper>>,
}

impl MapperRegistry {
    /// A registry with the built-in mappers in their canonical order:
    /// structured first (flag-gated), then autoincrement, scalars, the
    /// recursive shapes last.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.mappers = vec![
            Arc::new(JsonMapper),
            Arc::new(SerialMapper),
            Arc::new(IntegerMapper),
            Arc::new(LongMapper),
            Arc::new(DoubleMapper),
            Arc::new(BlobMapper),
            Arc::new(BooleanMapper),
            Arc::new(StringMapper),
            Arc::new(TimestampMapper),
            Arc::new(UuidMapper),
            Arc::new(IdMapper),
            Arc::new(OptionalMapper),
            Arc::new(EnumMapper),
            Arc::new(ArrayMapper),
        ];
        registry
    }

    /// A registry with no mappers at all.
    pub fn empty() -> Self {
        Self {
            mappers: Vec::new(),
        }
    }

    /// Prepend a mapper, giving it priority over everything registered so
    /// far.
    pub fn add_mapper(&mut self, mapper: Arc<dyn TypeMapper>) -> &mut Self {
        self.mappers.insert(0, mapper);
        self
    }

    /// Resolve the single applicable mapper for a (type, field) pair.
    pub fn mapper_for(
        &self,
        ty: &FieldType,
        field: &FieldDescriptor,
    ) -> Result<Arc<dyn TypeMapper>> {
        self.mappers
            .iter()
            .find(|m| m.accepts(self, ty, field))
            .cloned()
            .ok_or_else(|| RowbindError::NoMapperFound(ty.to_string()))
    }

    /// The column type for a (type, field) pair, via its mapper.
    pub fn storage_type(&self, ty: &FieldType, field: &FieldDescriptor) -> Result<DataType> {
        self.mapper_for(ty, field)?.storage_type(self, ty, field)
    }

    /// Convert a domain value to its stored representation.
    pub fn format(&self, ty: &FieldType, field: &FieldDescriptor, value: &Value) -> Result<Value> {
        self.mapper_for(ty, field)?.to_storage(self, ty, field, value)
    }

    /// Convert a domain value all the way to a bindable argument.
    pub fn argument(
        &self,
        ty: &FieldType,
        field: &FieldDescriptor,
        value: &Value,
    ) -> Result<Argument> {
        let mapper = self.mapper_for(ty, field)?;
        let stored = mapper.to_storage(self, ty, field, value)?;
        mapper.bind_argument(self, ty, field, stored)
    }

    /// Read a column's stored value from a result row.
    pub fn extract(
        &self,
        row: &dyn ResultRow,
        ty: &FieldType,
        field: &FieldDescriptor,
        column: &str,
    ) -> Result<Option<Value>> {
        Ok(self.mapper_for(ty, field)?.extract(row, column, ty)?)
    }

    /// Convert a stored value back to its domain representation.
    pub fn parse(&self, ty: &FieldType, field: &FieldDescriptor, stored: Value) -> Result<Value> {
        self.mapper_for(ty, field)?.from_storage(self, ty, field, stored)
    }

    /// Extract and parse in one step.
    pub fn read(
        &self,
        row: &dyn ResultRow,
        ty: &FieldType,
        field: &FieldDescriptor,
        column: &str,
    ) -> Result<Value> {
        let stored = self.extract(row, ty, field, column)?.unwrap_or(Value::Null);
        self.parse(ty, field, stored)
    }
}

impl Default for MapperRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MapperRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.mappers.iter().map(|m| m.name()))
            .finish()
    }
}
