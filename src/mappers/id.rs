//! Sortable identifier mappers and the legacy column migration.
//!
//! Three mappers share the `Id` shape:
//! - [`IdMapper`] stores the identifier as a 64-bit integer, the encoding
//!   whose numeric sort order is chronological;
//! - [`LegacyIdMapper`] keeps the historical text encoding and warns once;
//! - [`IdConverterMapper`] bridges the two during migration (reads text,
//!   writes numbers).
//!
//! All three assign a freshly generated identifier when the supplied value
//! is the zero/"empty" sentinel, so callers never pre-generate keys.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{info, warn};

use crate::argument::Argument;
use crate::client::DatabaseClient;
use crate::errors::{ExtractError, Result, RowbindError};
use crate::ids::SortableId;
use crate::mappers::{MapperRegistry, TypeMapper};
use crate::row::{read, ResultRow};
use crate::schema::TableSchema;
use crate::types::{DataType, FieldDescriptor, FieldType, Value};

/// True for the legacy "unassigned" sentinel: a non-empty, all-zero string.
/// Both the fixed-width and the unpadded encodings of the zero identifier
/// match. Stored data may depend on this exact rule; do not tighten it.
fn is_zero_sentinel(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b == b'0')
}

/// Resolve a domain value to a concrete identifier, generating one for the
/// empty sentinel (zero id, all-zero string, or null).
fn resolve_id(value: &Value) -> Result<SortableId> {
    match value {
        Value::Id(id) if !id.is_empty() => Ok(*id),
        Value::Text(s) if !is_zero_sentinel(s) => SortableId::decode(s)
            .map_err(|e| RowbindError::Configuration(format!("invalid identifier '{s}': {e}"))),
        _ => Ok(SortableId::generate()),
    }
}

/// Identifier columns stored as `bigint`.
pub struct IdMapper;

impl TypeMapper for IdMapper {
    fn name(&self) -> &'static str {
        "id"
    }

    fn accepts(&self, _: &MapperRegistry, ty: &FieldType, _: &FieldDescriptor) -> bool {
        matches!(ty, FieldType::Id)
    }

    fn storage_type(
        &self,
        _: &MapperRegistry,
        _: &FieldType,
        _: &FieldDescriptor,
    ) -> Result<DataType> {
        Ok(DataType::bigint())
    }

    fn to_storage(
        &self,
        _: &MapperRegistry,
        _: &FieldType,
        _: &FieldDescriptor,
        value: &Value,
    ) -> Result<Value> {
        Ok(Value::Long(resolve_id(value)?.number()))
    }

    fn extract(
        &self,
        row: &dyn ResultRow,
        column: &str,
        _: &FieldType,
    ) -> std::result::Result<Option<Value>, ExtractError> {
        Ok(read::i64(row, column)?.map(Value::Long))
    }

    fn from_storage(
        &self,
        _: &MapperRegistry,
        _: &FieldType,
        _: &FieldDescriptor,
        stored: Value,
    ) -> Result<Value> {
        Ok(match stored.as_i64() {
            None | Some(0) => Value::Null,
            Some(n) => Value::Id(SortableId::new(n)),
        })
    }
}

static LEGACY_WARNING: AtomicBool = AtomicBool::new(true);

/// Identifier columns stored in the historical text encoding. Deprecated in
/// favor of [`IdMapper`]; [`convert_id_column`] migrates existing tables.
pub struct LegacyIdMapper;

impl TypeMapper for LegacyIdMapper {
    fn name(&self) -> &'static str {
        "legacy-id"
    }

    fn accepts(&self, _: &MapperRegistry, ty: &FieldType, _: &FieldDescriptor) -> bool {
        if LEGACY_WARNING.swap(false, Ordering::Relaxed) {
            warn!(
                "The legacy text identifier mapper is in use. Register IdMapper for \
                 proper numeric sorting and run convert_id_column() to migrate existing tables"
            );
        }
        matches!(ty, FieldType::Id)
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
            // Keep pre-existing text verbatim, even non-canonical forms.
            Value::Text(s) if !is_zero_sentinel(s) => Value::Text(s.clone()),
            other => Value::Text(resolve_id(other)?.as_string()),
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
        _: &FieldType,
        _: &FieldDescriptor,
        stored: Value,
    ) -> Result<Value> {
        match stored {
            Value::Null => Ok(Value::Null),
            Value::Text(s) => SortableId::decode(&s).map(Value::Id).map_err(|e| {
                RowbindError::Configuration(format!("invalid stored identifier '{s}': {e}"))
            }),
            other => Err(RowbindError::Configuration(format!(
                "legacy identifier column holds {}, expected text",
                other.kind()
            ))),
        }
    }
}

/// Migration bridge: still reads the text encoding but already writes the
/// numeric one. Must be the active mapper while [`convert_id_column`] runs.
pub struct IdConverterMapper;

impl IdConverterMapper {
    pub const NAME: &'static str = "id-converter";
}

impl TypeMapper for IdConverterMapper {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn accepts(&self, _: &MapperRegistry, ty: &FieldType, _: &FieldDescriptor) -> bool {
        matches!(ty, FieldType::Id)
    }

    fn storage_type(
        &self,
        _: &MapperRegistry,
        _: &FieldType,
        _: &FieldDescriptor,
    ) -> Result<DataType> {
        // The column is still text while the migration runs.
        Ok(DataType::text())
    }

    fn to_storage(
        &self,
        _: &MapperRegistry,
        _: &FieldType,
        _: &FieldDescriptor,
        value: &Value,
    ) -> Result<Value> {
        Ok(Value::Long(resolve_id(value)?.number()))
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
        registry: &MapperRegistry,
        ty: &FieldType,
        field: &FieldDescriptor,
        stored: Value,
    ) -> Result<Value> {
        LegacyIdMapper.from_storage(registry, ty, field, stored)
    }
}

/// One-time migration: rewrite a textual identifier column to the numeric
/// encoding for every row of a table.
///
/// Precondition: the table's registry must resolve the column to
/// [`IdConverterMapper`], otherwise freshly written rows would still use the
/// old encoding while the rewrite runs. Afterwards the column type should be
/// changed to `bigint` and [`IdMapper`] registered.
///
/// Operational utility, not a hot path. Returns the number of rewritten
/// rows.
pub fn convert_id_column(
    client: &dyn DatabaseClient,
    table: &TableSchema,
    column: &str,
) -> Result<u64> {
    let field = table.require_field(column)?;
    let mapper = table.registry().mapper_for(&field.field_type, field)?;
    if mapper.name() != IdConverterMapper::NAME {
        return Err(RowbindError::Configuration(
            "convert_id_column requires the id conversion mapper to be active for the column"
                .to_string(),
        ));
    }

    let select = format!("select * from \"{}\"", table.name());
    let rows = client.execute(&select, &HashMap::new())?;

    let update = format!(
        "update \"{name}\" set \"{column}\" = :new where \"{column}\" = :old",
        name = table.name(),
    );

    let mut converted = 0u64;
    for row in rows {
        let Some(old) = read::text(&row, column)? else {
            continue;
        };
        let id = SortableId::decode(&old).map_err(|e| {
            RowbindError::Configuration(format!("row holds invalid identifier '{old}': {e}"))
        })?;

        let mut args = HashMap::new();
        args.insert("old".to_string(), Argument::Text(Some(old)));
        args.insert("new".to_string(), Argument::Scalar(Value::Long(id.number())));
        client.execute(&update, &args)?;
        converted += 1;
    }

    info!(
        "Table {} converted ({converted} rows). Update the column type to 'bigint' now",
        table.name()
    );
    Ok(converted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::Row;

    fn id_field() -> FieldDescriptor {
        FieldDescriptor::new("id", FieldType::Id).key()
    }

    #[test]
    fn test_zero_sentinel_matching() {
        assert!(is_zero_sentinel("0"));
        assert!(is_zero_sentinel("0000000000000"));
        assert!(!is_zero_sentinel(""));
        assert!(!is_zero_sentinel("0001"));
        assert!(!is_zero_sentinel("a0"));
    }

    #[test]
    fn test_existing_id_is_kept() {
        let registry = MapperRegistry::new();
        let field = id_field();
        let id = SortableId::new(123456);

        let stored = registry
            .format(&FieldType::Id, &field, &Value::Id(id))
            .unwrap();
        assert_eq!(stored, Value::Long(123456));
    }

    #[test]
    fn test_empty_sentinel_generates() {
        let registry = MapperRegistry::new();
        let field = id_field();

        for empty in [
            Value::Null,
            Value::Id(SortableId::new(0)),
            Value::Text("0000000000000".to_string()),
        ] {
            let stored = registry.format(&FieldType::Id, &field, &empty).unwrap();
            match stored {
                Value::Long(n) => assert_ne!(n, 0, "sentinel must be replaced"),
                other => panic!("expected Long, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_text_form_is_decoded() {
        let registry = MapperRegistry::new();
        let field = id_field();
        let id = SortableId::generate();

        let stored = registry
            .format(&FieldType::Id, &field, &Value::Text(id.as_string()))
            .unwrap();
        assert_eq!(stored, Value::Long(id.number()));
    }

    #[test]
    fn test_parse_zero_and_null_are_absent() {
        let registry = MapperRegistry::new();
        let field = id_field();

        assert_eq!(
            registry.parse(&FieldType::Id, &field, Value::Null).unwrap(),
            Value::Null
        );
        assert_eq!(
            registry.parse(&FieldType::Id, &field, Value::Long(0)).unwrap(),
            Value::Null
        );
        assert_eq!(
            registry.parse(&FieldType::Id, &field, Value::Long(42)).unwrap(),
            Value::Id(SortableId::new(42))
        );
    }

    #[test]
    fn test_roundtrip_through_row() {
        let registry = MapperRegistry::new();
        let field = id_field();
        let id = SortableId::generate();

        let stored = registry
            .format(&FieldType::Id, &field, &Value::Id(id))
            .unwrap();
        let row = Row::new().with("id", stored);
        assert_eq!(
            registry.read(&row, &FieldType::Id, &field, "id").unwrap(),
            Value::Id(id)
        );
    }

    #[test]
    fn test_legacy_mapper_text_roundtrip() {
        let mut registry = MapperRegistry::empty();
        registry.add_mapper(std::sync::Arc::new(LegacyIdMapper));
        let field = id_field();
        let id = SortableId::generate();

        let stored = registry
            .format(&FieldType::Id, &field, &Value::Id(id))
            .unwrap();
        assert_eq!(stored, Value::Text(id.as_string()));

        let row = Row::new().with("id", stored);
        assert_eq!(
            registry.read(&row, &FieldType::Id, &field, "id").unwrap(),
            Value::Id(id)
        );
    }

    #[test]
    fn test_legacy_mapper_keeps_noncanonical_text() {
        let mut registry = MapperRegistry::empty();
        registry.add_mapper(std::sync::Arc::new(LegacyIdMapper));
        let field = id_field();

        // Unpadded legacy form is written back verbatim
        let stored = registry
            .format(&FieldType::Id, &field, &Value::Text("z9".to_string()))
            .unwrap();
        assert_eq!(stored, Value::Text("z9".to_string()));
    }

    #[test]
    fn test_converter_reads_text_writes_numbers() {
        let mut registry = MapperRegistry::empty();
        registry.add_mapper(std::sync::Arc::new(IdConverterMapper));
        let field = id_field();
        let id = SortableId::generate();

        let stored = registry
            .format(&FieldType::Id, &field, &Value::Id(id))
            .unwrap();
        assert_eq!(stored, Value::Long(id.number()));

        let row = Row::new().with("id", id.as_string());
        assert_eq!(
            registry.read(&row, &FieldType::Id, &field, "id").unwrap(),
            Value::Id(id)
        );
    }
}
