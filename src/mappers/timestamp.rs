//! Timestamp mapper.

use crate::argument::Argument;
use crate::errors::{ExtractError, Result};
use crate::mappers::{MapperRegistry, TypeMapper};
use crate::row::{read, ResultRow};
use crate::types::{DataType, FieldDescriptor, FieldType, Value};

/// Instant-in-time columns, bound through the driver's timestamp channel.
pub struct TimestampMapper;

impl TypeMapper for TimestampMapper {
    fn name(&self) -> &'static str {
        "timestamp"
    }

    fn accepts(&self, _: &MapperRegistry, ty: &FieldType, _: &FieldDescriptor) -> bool {
        matches!(ty, FieldType::Timestamp)
    }

    fn storage_type(
        &self,
        _: &MapperRegistry,
        _: &FieldType,
        _: &FieldDescriptor,
    ) -> Result<DataType> {
        Ok(DataType::timestamp())
    }

    fn bind_argument(
        &self,
        _: &MapperRegistry,
        _: &FieldType,
        _: &FieldDescriptor,
        stored: Value,
    ) -> Result<Argument> {
        Ok(Argument::Timestamp(stored.as_timestamp()))
    }

    fn extract(
        &self,
        row: &dyn ResultRow,
        column: &str,
        _: &FieldType,
    ) -> std::result::Result<Option<Value>, ExtractError> {
        Ok(read::timestamp(row, column)?.map(Value::Timestamp))
    }
}
