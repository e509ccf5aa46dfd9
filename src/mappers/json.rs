//! Structured (JSON) column mapper.

use crate::argument::Argument;
use crate::errors::{ExtractError, Result, RowbindError};
use crate::mappers::{MapperRegistry, TypeMapper};
use crate::row::{read, ResultRow};
use crate::types::{DataType, FieldDescriptor, FieldType, Value};

/// Serializes structured columns to JSON text.
///
/// Registered first and keyed off the field's structured flag rather than a
/// shape, so it captures a column of any shape that opts in. Serialization
/// goes through [`Value::to_json`], which keeps integral numbers as integers.
pub struct JsonMapper;

impl TypeMapper for JsonMapper {
    fn name(&self) -> &'static str {
        "json"
    }

    fn accepts(&self, _: &MapperRegistry, _: &FieldType, field: &FieldDescriptor) -> bool {
        field.is_structured()
    }

    fn storage_type(
        &self,
        _: &MapperRegistry,
        _: &FieldType,
        _: &FieldDescriptor,
    ) -> Result<DataType> {
        Ok(DataType::text())
    }

    fn to_storage(
        &self,
        _: &MapperRegistry,
        _: &FieldType,
        _: &FieldDescriptor,
        value: &Value,
    ) -> Result<Value> {
        let json = value.to_json();
        let text = serde_json::to_string(&json)
            .map_err(|e| RowbindError::Structured(e.to_string()))?;
        Ok(Value::Text(text))
    }

    fn bind_argument(
        &self,
        _: &MapperRegistry,
        _: &FieldType,
        _: &FieldDescriptor,
        stored: Value,
    ) -> Result<Argument> {
        Ok(Argument::Text(match stored {
            Value::Text(text) => Some(text),
            _ => None,
        }))
    }

    fn extract(
        &self,
        row: &dyn ResultRow,
        column: &str,
        _: &FieldType,
    ) -> std::result::Result<Option<Value>, ExtractError> {
        Ok(read::text(row, column)?.map(Value::Text))
    }

    fn from_storage(
        &self,
        _: &MapperRegistry,
        _: &FieldType,
        _: &FieldDescriptor,
        stored: Value,
    ) -> Result<Value> {
        match stored {
            Value::Null => Ok(Value::Null),
            Value::Text(text) => {
                let json: serde_json::Value = serde_json::from_str(&text)
                    .map_err(|e| RowbindError::Structured(e.to_string()))?;
                Ok(Value::from_json(json))
            }
            other => Err(RowbindError::Structured(format!(
                "structured column holds {}, expected text",
                other.kind()
            ))),
        }
    }
}
