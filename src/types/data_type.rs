//! Storage-level type tags.
//!
//! A [`DataType`] is nothing but a name: two values with the same name are
//! interchangeable. Mappers emit these when asked for a column's
//! schema-definition type; the DDL-emitting collaborator consumes them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named storage type (e.g. `text`, `bigint`, `text[]`).
///
/// Identity is purely name-based. Constructed via [`DataType::of_name`] or
/// one of the engine-native constructors, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataType {
    name: String,
}

impl DataType {
    /// Create a data type from a literal name.
    pub fn of_name(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The array type over this element type (`name[]`).
    pub fn array_of(&self) -> Self {
        Self::of_name(format!("{}[]", self.name))
    }

    pub fn integer() -> Self {
        Self::of_name("integer")
    }

    pub fn serial() -> Self {
        Self::of_name("serial")
    }

    pub fn bigint() -> Self {
        Self::of_name("bigint")
    }

    pub fn bigserial() -> Self {
        Self::of_name("bigserial")
    }

    pub fn numeric() -> Self {
        Self::of_name("numeric")
    }

    pub fn boolean() -> Self {
        Self::of_name("boolean")
    }

    pub fn text() -> Self {
        Self::of_name("text")
    }

    pub fn bytea() -> Self {
        Self::of_name("bytea")
    }

    pub fn timestamp() -> Self {
        Self::of_name("timestamp")
    }

    pub fn uuid() -> Self {
        Self::of_name("uuid")
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
