//! Array / collection mapper.

use crate::argument::Argument;
use crate::errors::{ExtractError, Result, RowbindError};
use crate::mappers::{MapperRegistry, TypeMapper};
use crate::row::{read, ResultRow};
use crate::types::{DataType, FieldDescriptor, FieldType, Value};

/// Recursive array mapper. Elements convert through the registry, so any
/// mappable shape nests.
///
/// Nested arrays are made rectangular on the write path: engine-native
/// multi-dimensional arrays require uniform sub-array lengths, so every
/// sub-array is padded with the element shape's zero value up to the longest
/// one encountered (a null sub-array counts as empty). The read path returns
/// padded slots verbatim — there is no way to tell padding from data, so
/// callers must tolerate it or avoid ragged arrays.
pub struct ArrayMapper;

fn component_of(ty: &FieldType) -> Result<&FieldType> {
    ty.component()
        .ok_or_else(|| RowbindError::Configuration(format!("{ty} is not an array type")))
}

impl TypeMapper for ArrayMapper {
    fn name(&self) -> &'static str {
        "array"
    }

    fn accepts(&self, _: &MapperRegistry, ty: &FieldType, _: &FieldDescriptor) -> bool {
        ty.is_array()
    }

    fn storage_type(
        &self,
        registry: &MapperRegistry,
        ty: &FieldType,
        field: &FieldDescriptor,
    ) -> Result<DataType> {
        Ok(registry.storage_type(component_of(ty)?, field)?.array_of())
    }

    fn to_storage(
        &self,
        registry: &MapperRegistry,
        ty: &FieldType,
        field: &FieldDescriptor,
        value: &Value,
    ) -> Result<Value> {
        let items = match value {
            Value::Null => return Ok(Value::Null),
            Value::Array(items) => items,
            other => {
                return Err(RowbindError::Configuration(format!(
                    "array column value holds {}, expected array",
                    other.kind()
                )))
            }
        };

        let component = component_of(ty)?;

        if component.is_array() {
            let mut converted: Vec<Vec<Value>> = Vec::with_capacity(items.len());
            let mut max_len = 0;
            for item in items {
                let sub = match registry.format(component, field, item)? {
                    Value::Array(sub) => sub,
                    _ => Vec::new(),
                };
                max_len = max_len.max(sub.len());
                converted.push(sub);
            }

            let pad = component_of(component)?.zero_value();
            Ok(Value::Array(
                converted
                    .into_iter()
                    .map(|mut sub| {
                        sub.resize(max_len, pad.clone());
                        Value::Array(sub)
                    })
                    .collect(),
            ))
        } else {
            items
                .iter()
                .map(|item| registry.format(component, field, item))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array)
        }
    }

    fn bind_argument(
        &self,
        registry: &MapperRegistry,
        ty: &FieldType,
        field: &FieldDescriptor,
        stored: Value,
    ) -> Result<Argument> {
        // The engine's array constructor wants the innermost element type.
        let element_type = registry.storage_type(ty.actual_array_component(), field)?;
        Ok(Argument::Array {
            element_type,
            values: match stored {
                Value::Array(items) => Some(items),
                _ => None,
            },
        })
    }

    fn extract(
        &self,
        row: &dyn ResultRow,
        column: &str,
        _: &FieldType,
    ) -> std::result::Result<Option<Value>, ExtractError> {
        Ok(read::array(row, column)?.map(Value::Array))
    }

    fn from_storage(
        &self,
        registry: &MapperRegistry,
        ty: &FieldType,
        field: &FieldDescriptor,
        stored: Value,
    ) -> Result<Value> {
        let items = match stored {
            Value::Null => return Ok(Value::Null),
            Value::Array(items) => items,
            other => {
                return Err(RowbindError::Configuration(format!(
                    "array column holds {}, expected array",
                    other.kind()
                )))
            }
        };

        let component = component_of(ty)?;
        let keep_nulls = component.is_array();

        items
            .into_iter()
            .filter(|item| keep_nulls || !item.is_null())
            .map(|item| registry.parse(component, field, item))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array)
    }
}
