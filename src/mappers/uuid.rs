//! UUID mapper.

use uuid::Uuid;

use crate::errors::{ExtractError, Result};
use crate::mappers::{MapperRegistry, TypeMapper};
use crate::row::{read, ResultRow};
use crate::types::{DataType, FieldDescriptor, FieldType, Value};

/// UUID columns. Formatting passes a UUID through, parses UUID text, and
/// generates a random v4 for anything else — including null, so inserting an
/// unset UUID field assigns one lazily.
pub struct UuidMapper;

impl TypeMapper for UuidMapper {
    fn name(&self) -> &'static str {
        "uuid"
    }

    fn accepts(&self, _: &MapperRegistry, ty: &FieldType, _: &FieldDescriptor) -> bool {
        matches!(ty, FieldType::Uuid)
    }

    fn storage_type(
        &self,
        _: &MapperRegistry,
        _: &FieldType,
        _: &FieldDescriptor,
    ) -> Result<DataType> {
        Ok(DataType::uuid())
    }

    fn to_storage(
        &self,
        _: &MapperRegistry,
        _: &FieldType,
        _: &FieldDescriptor,
        value: &Value,
    ) -> Result<Value> {
        Ok(match value {
            Value::Uuid(v) => Value::Uuid(*v),
            Value::Text(s) => match s.parse::<Uuid>() {
                Ok(v) => Value::Uuid(v),
                Err(_) => Value::Uuid(Uuid::new_v4()),
            },
            _ => Value::Uuid(Uuid::new_v4()),
        })
    }

    fn extract(
        &self,
        row: &dyn ResultRow,
        column: &str,
        _: &FieldType,
    ) -> std::result::Result<Option<Value>, ExtractError> {
        Ok(read::uuid(row, column)?.map(Value::Uuid))
    }
}
