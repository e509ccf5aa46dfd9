//! Scalar primitive mappers.

use crate::errors::{ExtractError, Result};
use crate::mappers::{MapperRegistry, TypeMapper};
use crate::row::{read, ResultRow};
use crate::types::{DataType, FieldDescriptor, FieldType, Value};

/// Autoincrement integer columns. Must be resolved before the plain integer
/// mappers, since its acceptance overlaps theirs.
pub struct SerialMapper;

impl TypeMapper for SerialMapper {
    fn name(&self) -> &'static str {
        "serial"
    }

    fn accepts(&self, _: &MapperRegistry, ty: &FieldType, field: &FieldDescriptor) -> bool {
        field.is_autoincrement() && matches!(ty, FieldType::Int | FieldType::Long)
    }

    fn storage_type(
        &self,
        _: &MapperRegistry,
        ty: &FieldType,
        _: &FieldDescriptor,
    ) -> Result<DataType> {
        Ok(match ty {
            FieldType::Int => DataType::serial(),
            _ => DataType::bigserial(),
        })
    }

    fn extract(
        &self,
        row: &dyn ResultRow,
        column: &str,
        target: &FieldType,
    ) -> std::result::Result<Option<Value>, ExtractError> {
        match target {
            FieldType::Int => Ok(read::i32(row, column)?.map(Value::Int)),
            _ => Ok(read::i64(row, column)?.map(Value::Long)),
        }
    }
}

pub struct IntegerMapper;

impl TypeMapper for IntegerMapper {
    fn name(&self) -> &'static str {
        "integer"
    }

    fn accepts(&self, _: &MapperRegistry, ty: &FieldType, _: &FieldDescriptor) -> bool {
        matches!(ty, FieldType::Int)
    }

    fn storage_type(
        &self,
        _: &MapperRegistry,
        _: &FieldType,
        _: &FieldDescriptor,
    ) -> Result<DataType> {
        Ok(DataType::integer())
    }

    fn extract(
        &self,
        row: &dyn ResultRow,
        column: &str,
        _: &FieldType,
    ) -> std::result::Result<Option<Value>, ExtractError> {
        Ok(read::i32(row, column)?.map(Value::Int))
    }
}

pub struct LongMapper;

impl TypeMapper for LongMapper {
    fn name(&self) -> &'static str {
        "long"
    }

    fn accepts(&self, _: &MapperRegistry, ty: &FieldType, _: &FieldDescriptor) -> bool {
        matches!(ty, FieldType::Long)
    }

    fn storage_type(
        &self,
        _: &MapperRegistry,
        _: &FieldType,
        _: &FieldDescriptor,
    ) -> Result<DataType> {
        Ok(DataType::bigint())
    }

    fn extract(
        &self,
        row: &dyn ResultRow,
        column: &str,
        _: &FieldType,
    ) -> std::result::Result<Option<Value>, ExtractError> {
        Ok(read::i64(row, column)?.map(Value::Long))
    }
}

/// Double-precision columns; extraction tolerates numeric widening since
/// `numeric` columns come back in whatever width the driver chose.
pub struct DoubleMapper;

impl TypeMapper for DoubleMapper {
    fn name(&self) -> &'static str {
        "double"
    }

    fn accepts(&self, _: &MapperRegistry, ty: &FieldType, _: &FieldDescriptor) -> bool {
        matches!(ty, FieldType::Double)
    }

    fn storage_type(
        &self,
        _: &MapperRegistry,
        _: &FieldType,
        _: &FieldDescriptor,
    ) -> Result<DataType> {
        Ok(DataType::numeric())
    }

    fn extract(
        &self,
        row: &dyn ResultRow,
        column: &str,
        _: &FieldType,
    ) -> std::result::Result<Option<Value>, ExtractError> {
        Ok(read::f64(row, column)?.map(Value::Double))
    }
}

pub struct BooleanMapper;

impl TypeMapper for BooleanMapper {
    fn name(&self) -> &'static str {
        "boolean"
    }

    fn accepts(&self, _: &MapperRegistry, ty: &FieldType, _: &FieldDescriptor) -> bool {
        matches!(ty, FieldType::Bool)
    }

    fn storage_type(
        &self,
        _: &MapperRegistry,
        _: &FieldType,
        _: &FieldDescriptor,
    ) -> Result<DataType> {
        Ok(DataType::boolean())
    }

    fn extract(
        &self,
        row: &dyn ResultRow,
        column: &str,
        _: &FieldType,
    ) -> std::result::Result<Option<Value>, ExtractError> {
        Ok(read::bool(row, column)?.map(Value::Bool))
    }
}

pub struct StringMapper;

impl TypeMapper for StringMapper {
    fn name(&self) -> &'static str {
        "string"
    }

    fn accepts(&self, _: &MapperRegistry, ty: &FieldType, _: &FieldDescriptor) -> bool {
        matches!(ty, FieldType::Text)
    }

    fn storage_type(
        &self,
        _: &MapperRegistry,
        _: &FieldType,
        _: &FieldDescriptor,
    ) -> Result<DataType> {
        Ok(DataType::text())
    }

    fn extract(
        &self,
        row: &dyn ResultRow,
        column: &str,
        _: &FieldType,
    ) -> std::result::Result<Option<Value>, ExtractError> {
        Ok(read::text(row, column)?.map(Value::Text))
    }
}
