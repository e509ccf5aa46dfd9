//! Byte-sequence mapper.

use crate::argument::Argument;
use crate::errors::{ExtractError, Result};
use crate::mappers::{MapperRegistry, TypeMapper};
use crate::row::{read, ResultRow};
use crate::types::{DataType, FieldDescriptor, FieldType, Value};

/// Binary columns. The bound argument renders as base64 in statement logs
/// instead of dumping raw bytes.
pub struct BlobMapper;

impl TypeMapper for BlobMapper {
    fn name(&self) -> &'static str {
        "blob"
    }

    fn accepts(&self, _: &MapperRegistry, ty: &FieldType, _: &FieldDescriptor) -> bool {
        matches!(ty, FieldType::Bytes)
    }

    fn storage_type(
        &self,
        _: &MapperRegistry,
        _: &FieldType,
        _: &FieldDescriptor,
    ) -> Result<DataType> {
        Ok(DataType::bytea())
    }

    fn bind_argument(
        &self,
        _: &MapperRegistry,
        _: &FieldType,
        _: &FieldDescriptor,
        stored: Value,
    ) -> Result<Argument> {
        Ok(match stored {
            Value::Bytes(bytes) => Argument::Bytes(Some(bytes)),
            _ => Argument::Bytes(None),
        })
    }

    fn extract(
        &self,
        row: &dyn ResultRow,
        column: &str,
        _: &FieldType,
    ) -> std::result::Result<Option<Value>, ExtractError> {
        Ok(read::bytes(row, column)?.map(Value::Bytes))
    }
}
