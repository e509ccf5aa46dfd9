//! Typed value mapping and predicate construction for SQL persistence
//! layers.
//!
//! The crate covers two concerns that sit between a typed data model and a
//! SQL engine:
//!
//! - **Value mapping** — an ordered, pluggable [`mappers::MapperRegistry`]
//!   converts domain values ([`types::Value`]) to and from their stored
//!   representations, decides column types, and wraps outgoing values as
//!   bindable [`argument::Argument`]s. First matching mapper wins; register
//!   your own to override a built-in.
//! - **Predicates** — [`predicate::Where`] builds parameterized boolean SQL
//!   conditions structurally, with collision-free placeholder names, and
//!   resolves them against a [`schema::TableSchema`] only when bound.
//!
//! Conversion of values and construction of predicates are pure; only
//! [`client::DatabaseClient`] (and the identifier migration helper built on
//! it) touches a database.

pub mod argument;
pub mod client;
pub mod errors;
pub mod ids;
pub mod mappers;
pub mod predicate;
pub mod row;
pub mod schema;
pub mod types;

pub use argument::{Argument, ArgumentFactory};
pub use client::DatabaseClient;
pub use errors::{ClientError, ExtractError, Result, RowbindError};
pub use ids::{IdGenerator, SortableId};
pub use mappers::{MapperRegistry, TypeMapper};
pub use predicate::{BoundWhere, Where};
pub use row::{ResultRow, Row};
pub use schema::TableSchema;
pub use types::{DataType, FieldDescriptor, FieldFlag, FieldType, Value};
