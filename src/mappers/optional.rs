//! Optional-wrapper mapper.

use crate::errors::{ExtractError, Result};
use crate::mappers::{MapperRegistry, TypeMapper};
use crate::row::ResultRow;
use crate::types::{DataType, FieldDescriptor, FieldType, Value};

/// Optional fields delegate everything to the mapper of their inner type.
/// `Null` stands for the empty optional on both sides: null extraction
/// parses to `Null`, and formatting `Null` runs the inner mapper's own
/// null handling (an unset optional identifier still gets generated).
pub struct OptionalMapper;

fn inner(ty: &FieldType) -> &FieldType {
    ty.component().unwrap_or(ty)
}

impl TypeMapper for OptionalMapper {
    fn name(&self) -> &'static str {
        "optional"
    }

    fn accepts(&self, _: &MapperRegistry, ty: &FieldType, _: &FieldDescriptor) -> bool {
        matches!(ty, FieldType::Optional(_))
    }

    fn storage_type(
        &self,
        registry: &MapperRegistry,
        ty: &FieldType,
        field: &FieldDescriptor,
    ) -> Result<DataType> {
        registry.storage_type(inner(ty), field)
    }

    fn to_storage(
        &self,
        registry: &MapperRegistry,
        ty: &FieldType,
        field: &FieldDescriptor,
        value: &Value,
    ) -> Result<Value> {
        registry.format(inner(ty), field, value)
    }

    fn extract(
        &self,
        row: &dyn ResultRow,
        column: &str,
        _: &FieldType,
    ) -> std::result::Result<Option<Value>, ExtractError> {
        row.column(column)
    }

    fn from_storage(
        &self,
        registry: &MapperRegistry,
        ty: &FieldType,
        field: &FieldDescriptor,
        stored: Value,
    ) -> Result<Value> {
        if stored.is_null() {
            return Ok(Value::Null);
        }
        registry.parse(inner(ty), field, stored)
    }
}
