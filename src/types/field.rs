//! Field metadata: domain type shapes and per-column flags.
//!
//! The original system read this information from runtime annotations; here
//! it is plain data populated at schema-registration time and consulted by
//! mapper `accepts` predicates.

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

use crate::types::Value;

/// Structured field flags attached to a column.
pub type FieldFlags = BTreeSet<FieldFlag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldFlag {
    /// Part of the table's identifying key.
    #[serde(rename = "key")]
    Key,
    /// Uniqueness constraint (keys are implicitly unique).
    #[serde(rename = "uq")]
    Unique,
    /// Value is assigned by the storage engine (serial columns).
    #[serde(rename = "ai")]
    Autoincrement,
    /// Stored as a structured (JSON) document regardless of shape.
    #[serde(rename = "json")]
    Structured,
}

/// The closed set of domain value shapes the mapping engine understands.
///
/// Recursive shapes (`Optional`, `Array`) carry their component; enums carry
/// their constant names so decoding can tolerate schema drift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    Int,
    Long,
    Double,
    Bool,
    Text,
    Bytes,
    Timestamp,
    Uuid,
    /// The sortable 64-bit identifier type.
    Id,
    Enum {
        name: String,
        variants: Vec<String>,
    },
    Optional(Box<FieldType>),
    Array(Box<FieldType>),
    Json,
}

impl FieldType {
    pub fn optional(inner: FieldType) -> Self {
        FieldType::Optional(Box::new(inner))
    }

    pub fn array(element: FieldType) -> Self {
        FieldType::Array(Box::new(element))
    }

    pub fn enumeration(name: impl Into<String>, variants: &[&str]) -> Self {
        FieldType::Enum {
            name: name.into(),
            variants: variants.iter().map(|v| v.to_string()).collect(),
        }
    }

    /// Component type of an optional or array shape.
    pub fn component(&self) -> Option<&FieldType> {
        match self {
            FieldType::Optional(inner) | FieldType::Array(inner) => Some(inner),
            _ => None,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, FieldType::Array(_))
    }

    /// The innermost element type, unwrapping arrays and optionals.
    pub fn actual_array_component(&self) -> &FieldType {
        match self {
            FieldType::Optional(inner) | FieldType::Array(inner) => inner.actual_array_component(),
            other => other,
        }
    }

    /// The padding default for this shape's *stored* representation, used
    /// when ragged nested arrays are made rectangular before array
    /// construction.
    pub fn zero_value(&self) -> Value {
        match self {
            FieldType::Int => Value::Int(0),
            FieldType::Long => Value::Long(0),
            FieldType::Double => Value::Double(0.0),
            FieldType::Bool => Value::Bool(false),
            FieldType::Text => Value::Text(String::new()),
            FieldType::Bytes => Value::Bytes(Vec::new()),
            FieldType::Timestamp => Value::Timestamp(DateTime::UNIX_EPOCH),
            FieldType::Uuid => Value::Uuid(Uuid::nil()),
            // Stored as bigint
            FieldType::Id => Value::Long(0),
            // Stored as the symbolic name
            FieldType::Enum { .. } => Value::Text(String::new()),
            FieldType::Optional(inner) => inner.zero_value(),
            FieldType::Array(_) => Value::Array(Vec::new()),
            FieldType::Json => Value::Text("null".to_string()),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Int => f.write_str("Int"),
            FieldType::Long => f.write_str("Long"),
            FieldType::Double => f.write_str("Double"),
            FieldType::Bool => f.write_str("Bool"),
            FieldType::Text => f.write_str("Text"),
            FieldType::Bytes => f.write_str("Bytes"),
            FieldType::Timestamp => f.write_str("Timestamp"),
            FieldType::Uuid => f.write_str("Uuid"),
            FieldType::Id => f.write_str("Id"),
            FieldType::Enum { name, .. } => write!(f, "Enum<{name}>"),
            FieldType::Optional(inner) => write!(f, "Optional<{inner}>"),
            FieldType::Array(inner) => write!(f, "Array<{inner}>"),
            FieldType::Json => f.write_str("Json"),
        }
    }
}

/// Per-column metadata consulted by mapper acceptance predicates and by the
/// predicate algebra's key/uniqueness helpers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub flags: FieldFlags,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            flags: FieldFlags::new(),
        }
    }

    pub fn with_flag(mut self, flag: FieldFlag) -> Self {
        self.flags.insert(flag);
        self
    }

    /// Marks the column as part of the identifying key (implies unique).
    pub fn key(self) -> Self {
        self.with_flag(FieldFlag::Key).with_flag(FieldFlag::Unique)
    }

    pub fn unique(self) -> Self {
        self.with_flag(FieldFlag::Unique)
    }

    pub fn autoincrement(self) -> Self {
        self.with_flag(FieldFlag::Autoincrement)
    }

    pub fn structured(self) -> Self {
        self.with_flag(FieldFlag::Structured)
    }

    pub fn is_key(&self) -> bool {
        self.flags.contains(&FieldFlag::Key)
    }

    pub fn is_unique(&self) -> bool {
        self.flags.contains(&FieldFlag::Unique)
    }

    pub fn is_autoincrement(&self) -> bool {
        self.flags.contains(&FieldFlag::Autoincrement)
    }

    pub fn is_structured(&self) -> bool {
        self.flags.contains(&FieldFlag::Structured)
    }
}
