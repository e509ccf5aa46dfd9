//! Shared error types for rowbind.
//!
//! Three failure families exist at this layer (see the crate docs):
//! configuration errors (static mismatch between domain model and mapping
//! setup), extraction errors (driver-level faults while reading a column),
//! and client errors (statement execution, surfaced by the collaborator
//! behind [`crate::client::DatabaseClient`]). Expected-absence cases (SQL
//! null, unmatched enum names) are never errors.

use thiserror::Error;

/// Errors produced by the mapping engine and predicate algebra.
#[derive(Error, Debug)]
pub enum RowbindError {
    /// No registered mapper accepted the (type, field) pair. This is a
    /// configuration error: the registry and the domain model disagree.
    #[error("No mapper found for {0}")]
    NoMapperFound(String),

    /// Identification was requested for a table without key columns.
    #[error("Cannot identify rows of table '{0}': no key columns declared")]
    NoKeyDefined(String),

    /// A predicate or conversion referenced a column the table does not have.
    #[error("Table '{table}' has no column named '{column}'")]
    NoSuchColumn { table: String, column: String },

    /// Driver-level fault while reading a column value.
    #[error(transparent)]
    Extraction(#[from] ExtractError),

    /// Structured (JSON) encode or decode failure.
    #[error("Structured value error: {0}")]
    Structured(String),

    /// Static setup mistake (bad identifier encoding, wrong active mapper
    /// for a migration, invalid input to a conversion).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error reported by the database client collaborator.
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Result type alias using [`RowbindError`].
pub type Result<T> = std::result::Result<T, RowbindError>;

/// Driver-level failure while extracting a column from a result row.
///
/// Absent data is not an extraction error: a SQL null extracts as `None`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// The driver failed outright (unknown column, connection fault, ...).
    #[error("Driver error reading column '{column}': {message}")]
    Driver { column: String, message: String },

    /// The raw value does not have the storage kind the mapper asked for.
    #[error("Column '{column}' holds {found}, expected {expected}")]
    TypeMismatch {
        column: String,
        expected: &'static str,
        found: String,
    },
}

impl ExtractError {
    pub fn driver(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Driver {
            column: column.into(),
            message: message.into(),
        }
    }

    pub fn type_mismatch(
        column: impl Into<String>,
        expected: &'static str,
        found: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            column: column.into(),
            expected,
            found: found.into(),
        }
    }
}

/// Errors surfaced by the statement-execution collaborator.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Statement execution failed: {0}")]
    Execution(String),
}
