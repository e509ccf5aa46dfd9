//! Result-row boundary.
//!
//! [`ResultRow`] is the contract a database client's row type has to meet so
//! mappers can extract column values from it. [`Row`] is a plain in-memory
//! implementation used by tests and by clients that materialize results.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::ExtractError;
use crate::types::Value;

/// Column lookup by name, returning a nullable raw value.
///
/// `Ok(None)` means SQL null — never an error. Errors are reserved for
/// driver-level faults such as an unknown column.
pub trait ResultRow {
    fn column(&self, name: &str) -> Result<Option<Value>, ExtractError>;
}

/// An in-memory row keyed by column name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Row {
    values: BTreeMap<String, Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(column.into(), value.into());
        self
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(column.into(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    /// The stored value for a column, `Null` when absent.
    pub fn value_or_null(&self, column: &str) -> Value {
        self.values.get(column).cloned().unwrap_or(Value::Null)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }
}

impl ResultRow for Row {
    fn column(&self, name: &str) -> Result<Option<Value>, ExtractError> {
        match self.values.get(name) {
            Some(Value::Null) => Ok(None),
            Some(value) => Ok(Some(value.clone())),
            None => Err(ExtractError::driver(name, "no such column in result")),
        }
    }
}

/// Typed readers shared by the scalar mappers. Each returns `Ok(None)` for
/// SQL null and a type mismatch otherwise.
pub mod read {
    use super::*;
    use chrono::{DateTime, Utc};
    use uuid::Uuid;

    pub fn i32(row: &dyn ResultRow, name: &str) -> Result<Option<i32>, ExtractError> {
        match row.column(name)? {
            None => Ok(None),
            Some(Value::Int(v)) => Ok(Some(v)),
            Some(other) => Err(ExtractError::type_mismatch(name, "integer", other.kind())),
        }
    }

    pub fn i64(row: &dyn ResultRow, name: &str) -> Result<Option<i64>, ExtractError> {
        match row.column(name)? {
            None => Ok(None),
            Some(Value::Long(v)) => Ok(Some(v)),
            Some(Value::Int(v)) => Ok(Some(v as i64)),
            Some(other) => Err(ExtractError::type_mismatch(name, "bigint", other.kind())),
        }
    }

    /// Numeric columns may come back in any numeric width.
    pub fn f64(row: &dyn ResultRow, name: &str) -> Result<Option<f64>, ExtractError> {
        match row.column(name)? {
            None => Ok(None),
            Some(value) => value
                .as_f64()
                .map(Some)
                .ok_or_else(|| ExtractError::type_mismatch(name, "numeric", value.kind())),
        }
    }

    pub fn bool(row: &dyn ResultRow, name: &str) -> Result<Option<bool>, ExtractError> {
        match row.column(name)? {
            None => Ok(None),
            Some(Value::Bool(v)) => Ok(Some(v)),
            Some(other) => Err(ExtractError::type_mismatch(name, "boolean", other.kind())),
        }
    }

    pub fn text(row: &dyn ResultRow, name: &str) -> Result<Option<String>, ExtractError> {
        match row.column(name)? {
            None => Ok(None),
            Some(Value::Text(v)) | Some(Value::EnumName(v)) => Ok(Some(v)),
            Some(other) => Err(ExtractError::type_mismatch(name, "text", other.kind())),
        }
    }

    pub fn bytes(row: &dyn ResultRow, name: &str) -> Result<Option<Vec<u8>>, ExtractError> {
        match row.column(name)? {
            None => Ok(None),
            Some(Value::Bytes(v)) => Ok(Some(v)),
            Some(other) => Err(ExtractError::type_mismatch(name, "bytea", other.kind())),
        }
    }

    pub fn timestamp(
        row: &dyn ResultRow,
        name: &str,
    ) -> Result<Option<DateTime<Utc>>, ExtractError> {
        match row.column(name)? {
            None => Ok(None),
            Some(Value::Timestamp(v)) => Ok(Some(v)),
            Some(other) => Err(ExtractError::type_mismatch(name, "timestamp", other.kind())),
        }
    }

    pub fn uuid(row: &dyn ResultRow, name: &str) -> Result<Option<Uuid>, ExtractError> {
        match row.column(name)? {
            None => Ok(None),
            Some(Value::Uuid(v)) => Ok(Some(v)),
            Some(Value::Text(s)) => s
                .parse::<Uuid>()
                .map(Some)
                .map_err(|e| ExtractError::driver(name, format!("invalid uuid text: {e}"))),
            Some(other) => Err(ExtractError::type_mismatch(name, "uuid", other.kind())),
        }
    }

    pub fn array(row: &dyn ResultRow, name: &str) -> Result<Option<Vec<Value>>, ExtractError> {
        match row.column(name)? {
            None => Ok(None),
            Some(Value::Array(items)) => Ok(Some(items)),
            Some(other) => Err(ExtractError::type_mismatch(name, "array", other.kind())),
        }
    }
}
