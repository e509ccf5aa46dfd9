//! Typed value mapping between domain shapes and storage columns.
//!
//! Every converter implements [`TypeMapper`]; an ordered [`MapperRegistry`]
//! resolves the first mapper whose `accepts` predicate matches a
//! (type, field) pair. Acceptance predicates overlap on purpose, so
//! registration order is a contract: most-specific mappers come first
//! (structured-tagged fields before the generic text fallback, arrays before
//! scalars), and caller-registered mappers are prepended to override the
//! built-ins.
//!
//! Recursive mappers (optional, array, structured) re-enter the registry
//! through the `registry` parameter rather than hard-coding their component
//! conversions.

pub mod array;
pub mod bytes;
pub mod enums;
pub mod id;
pub mod json;
pub mod optional;
pub mod registry;
pub mod scalar;
pub mod timestamp;
pub mod uuid;

pub use array::ArrayMapper;
pub use bytes::BlobMapper;
pub use enums::EnumMapper;
pub use id::{convert_id_column, IdConverterMapper, IdMapper, LegacyIdMapper};
pub use json::JsonMapper;
pub use optional::OptionalMapper;
pub use registry::MapperRegistry;
pub use scalar::{
    BooleanMapper, DoubleMapper, IntegerMapper, LongMapper, SerialMapper, StringMapper,
};
pub use timestamp::TimestampMapper;
pub use uuid::UuidMapper;

use crate::argument::Argument;
use crate::errors::{ExtractError, Result};
use crate::row::ResultRow;
use crate::types::{DataType, FieldDescriptor, FieldType, Value};

/// A converter between one domain value shape and its storage
/// representation.
///
/// Mappers are stateless and process-wide; the registry owns them behind
/// `Arc`s and concurrent lookups need no locking.
pub trait TypeMapper: Send + Sync {
    /// Stable name, used in diagnostics and to identify operational mappers
    /// (the legacy identifier conversion path checks for its bridge mapper
    /// by name).
    fn name(&self) -> &'static str;

    /// Whether this mapper handles the given (type, field) pair. Pure; may
    /// inspect field flags.
    fn accepts(&self, registry: &MapperRegistry, ty: &FieldType, field: &FieldDescriptor) -> bool;

    /// The column type to emit at schema-definition time.
    fn storage_type(
        &self,
        registry: &MapperRegistry,
        ty: &FieldType,
        field: &FieldDescriptor,
    ) -> Result<DataType>;

    /// Convert a domain value to its stored representation. Identity unless
    /// the shapes differ.
    fn to_storage(
        &self,
        _registry: &MapperRegistry,
        _ty: &FieldType,
        _field: &FieldDescriptor,
        value: &Value,
    ) -> Result<Value> {
        Ok(value.clone())
    }

    /// Wrap a stored value as a bindable argument. The default binds the
    /// value opaquely; override when the wire path differs (timestamps,
    /// byte sequences, engine-native arrays).
    fn bind_argument(
        &self,
        _registry: &MapperRegistry,
        _ty: &FieldType,
        _field: &FieldDescriptor,
        stored: Value,
    ) -> Result<Argument> {
        Ok(Argument::Scalar(stored))
    }

    /// Read one column's stored value from a result row. `Ok(None)` is SQL
    /// null; errors are driver faults only.
    fn extract(
        &self,
        row: &dyn ResultRow,
        column: &str,
        target: &FieldType,
    ) -> std::result::Result<Option<Value>, ExtractError>;

    /// Convert a stored value back to the domain representation. Identity
    /// unless the shapes differ.
    fn from_storage(
        &self,
        _registry: &MapperRegistry,
        _ty: &FieldType,
        _field: &FieldDescriptor,
        stored: Value,
    ) -> Result<Value> {
        Ok(stored)
    }
}
