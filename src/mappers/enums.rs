//! Enumeration mapper.

use crate::errors::{ExtractError, Result};
use crate::mappers::{MapperRegistry, TypeMapper};
use crate::row::{read, ResultRow};
use crate::types::{DataType, FieldDescriptor, FieldType, Value};

/// Enumerations are stored as their symbolic constant name, never the
/// ordinal. Decoding a name with no matching constant yields `Null` rather
/// than failing: removed constants in old rows stay readable, at the cost
/// of masking genuinely corrupt data. Callers needing strictness must check
/// explicitly.
pub struct EnumMapper;

impl TypeMapper for EnumMapper {
    fn name(&self) -> &'static str {
        "enum"
    }

    fn accepts(&self, _: &MapperRegistry, ty: &FieldType, _: &FieldDescriptor) -> bool {
        matches!(ty, FieldType::Enum { .. })
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
        Ok(match value {
            Value::EnumName(name) => Value::Text(name.clone()),
            Value::Text(name) => Value::Text(name.clone()),
            _ => Value::Null,
        })
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
        ty: &FieldType,
        _: &FieldDescriptor,
        stored: Value,
    ) -> Result<Value> {
        let FieldType::Enum { variants, .. } = ty else {
            return Ok(Value::Null);
        };

        Ok(match stored {
            Value::Text(name) if variants.iter().any(|v| v == &name) => Value::EnumName(name),
            _ => Value::Null,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::Row;

    fn color() -> FieldType {
        FieldType::enumeration("Color", &["RED", "GREEN", "BLUE"])
    }

    #[test]
    fn test_stores_symbolic_name() {
        let registry = MapperRegistry::new();
        let ty = color();
        let field = FieldDescriptor::new("color", ty.clone());

        let stored = registry
            .format(&ty, &field, &Value::EnumName("GREEN".to_string()))
            .unwrap();
        assert_eq!(stored, Value::Text("GREEN".to_string()));
    }

    #[test]
    fn test_matching_constant_roundtrips() {
        let registry = MapperRegistry::new();
        let ty = color();
        let field = FieldDescriptor::new("color", ty.clone());

        let row = Row::new().with("color", "BLUE");
        assert_eq!(
            registry.read(&row, &ty, &field, "color").unwrap(),
            Value::EnumName("BLUE".to_string())
        );
    }

    #[test]
    fn test_unmatched_constant_is_null_not_error() {
        let registry = MapperRegistry::new();
        let ty = color();
        let field = FieldDescriptor::new("color", ty.clone());

        // "MAUVE" was removed from the enum; old rows still decode.
        let row = Row::new().with("color", "MAUVE");
        assert_eq!(registry.read(&row, &ty, &field, "color").unwrap(), Value::Null);
    }

    #[test]
    fn test_null_roundtrip() {
        let registry = MapperRegistry::new();
        let ty = color();
        let field = FieldDescriptor::new("color", ty.clone());

        let row = Row::new().with("color", Value::Null);
        assert_eq!(registry.read(&row, &ty, &field, "color").unwrap(), Value::Null);
    }
}
