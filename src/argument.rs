//! Bindable statement parameters and their two-stage factories.
//!
//! Predicates are constructed before any table context exists, so the value
//! they carry cannot be converted immediately — the column's mapper is only
//! known once a concrete [`TableSchema`] is. [`ArgumentFactory`] captures the
//! column name and the raw value; [`ArgumentFactory::resolve`] performs the
//! conversion when the table is supplied.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;

use crate::errors::Result;
use crate::schema::TableSchema;
use crate::types::{DataType, FieldType, Value};

/// An opaque value ready to be bound into a prepared statement.
///
/// Carries enough shape information for the executing client (array element
/// type names for the engine's array constructor) and renders human-readably
/// for statement logging.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    /// A plain stored value bound as-is.
    Scalar(Value),
    /// A timestamp bound through the driver's timestamp path.
    Timestamp(Option<DateTime<Utc>>),
    /// A byte sequence; rendered as base64 for logs.
    Bytes(Option<Vec<u8>>),
    /// A textual value (structured documents bind through this).
    Text(Option<String>),
    /// An engine-native typed array, built via the client's array
    /// constructor from the element storage-type name.
    Array {
        element_type: DataType,
        values: Option<Vec<Value>>,
    },
}

impl Argument {
    pub fn null() -> Self {
        Argument::Scalar(Value::Null)
    }

    /// The carried payload as a plain [`Value`], for clients that bind
    /// through a uniform value channel.
    pub fn as_value(&self) -> Value {
        match self {
            Argument::Scalar(v) => v.clone(),
            Argument::Timestamp(v) => v.map(Value::Timestamp).unwrap_or(Value::Null),
            Argument::Bytes(v) => v.clone().map(Value::Bytes).unwrap_or(Value::Null),
            Argument::Text(v) => v.clone().map(Value::Text).unwrap_or(Value::Null),
            Argument::Array { values, .. } => {
                values.clone().map(Value::Array).unwrap_or(Value::Null)
            }
        }
    }

    /// Element storage-type name for array arguments.
    pub fn element_type(&self) -> Option<&DataType> {
        match self {
            Argument::Array { element_type, .. } => Some(element_type),
            _ => None,
        }
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Scalar(v) => write!(f, "{v}"),
            Argument::Timestamp(None) => f.write_str("null"),
            Argument::Timestamp(Some(v)) => {
                write!(f, "{}", v.to_rfc3339_opts(SecondsFormat::Micros, true))
            }
            Argument::Bytes(None) => f.write_str("null"),
            Argument::Bytes(Some(v)) => f.write_str(&URL_SAFE_NO_PAD.encode(v)),
            Argument::Text(None) => f.write_str("null"),
            Argument::Text(Some(v)) => f.write_str(v),
            Argument::Array { values: None, .. } => f.write_str("null"),
            Argument::Array {
                values: Some(items),
                ..
            } => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// How a factory derives the conversion type from the column it targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BindMode {
    /// Convert with the column's own declared type.
    ColumnType,
    /// Convert as an array over the column's declared type (the candidate
    /// set of a set-membership predicate).
    ArrayOfColumn,
    /// Convert as a single element of the column's array type; falls back
    /// to the raw value when element conversion fails.
    ElementOfColumn,
}

/// A column name and a deferred value, resolvable against a concrete table.
#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentFactory {
    column: String,
    value: Value,
    mode: BindMode,
}

impl ArgumentFactory {
    /// Bind with the column's own mapper.
    pub fn standard(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
            mode: BindMode::ColumnType,
        }
    }

    /// Bind a candidate set as an array over the column's type.
    pub fn array_of_column(column: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            column: column.into(),
            value: Value::Array(values),
            mode: BindMode::ArrayOfColumn,
        }
    }

    /// Bind a single element of an array column.
    pub fn element_of_column(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
            mode: BindMode::ElementOfColumn,
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Resolve against a concrete table: look up the column's descriptor,
    /// pick the mapper, convert, and wrap as a bindable argument.
    pub fn resolve(&self, table: &TableSchema) -> Result<Argument> {
        let field = table.require_field(&self.column)?;
        let registry = table.registry();

        match self.mode {
            BindMode::ColumnType => {
                let ty = &field.field_type;
                let mapper = registry.mapper_for(ty, field)?;
                let stored = mapper.to_storage(registry, ty, field, &self.value)?;
                mapper.bind_argument(registry, ty, field, stored)
            }
            BindMode::ArrayOfColumn => {
                let ty = FieldType::array(field.field_type.clone());
                let mapper = registry.mapper_for(&ty, field)?;
                let stored = mapper.to_storage(registry, &ty, field, &self.value)?;
                mapper.bind_argument(registry, &ty, field, stored)
            }
            BindMode::ElementOfColumn => {
                let ty = field.field_type.actual_array_component();
                let mapper = registry.mapper_for(ty, field)?;
                // Element conversion of a probe value may legitimately fail
                // (e.g. probing with an unconverted representation); the raw
                // value is bound instead, as the original behaves.
                let stored = mapper
                    .to_storage(registry, ty, field, &self.value)
                    .unwrap_or_else(|_| self.value.clone());
                mapper.bind_argument(registry, ty, field, stored)
            }
        }
    }
}
