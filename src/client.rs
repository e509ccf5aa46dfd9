//! Minimal database execution surface.

use std::collections::HashMap;

use crate::argument::Argument;
use crate::errors::ClientError;
use crate::row::Row;

/// Executes parameterized SQL against a backing engine.
///
/// The crate generates SQL with named `:placeholder` parameters and hands over
/// the matching [`Argument`] map; substitution and escaping are the
/// implementation's job. Statements that return no rows yield an empty vec.
pub trait DatabaseClient {
    fn execute(
        &self,
        sql: &str,
        arguments: &HashMap<String, Argument>,
    ) -> Result<Vec<Row>, ClientError>;
}
