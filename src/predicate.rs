//! Composable boolean predicates over table columns.
//!
//! A [`Where`] pairs an SQL condition fragment with the named-parameter
//! factories the fragment references. Fragments combine structurally
//! (`and`, `or`, `not`) without inspecting each other; every comparison mints
//! a globally unique placeholder name, so merged predicates never collide.
//!
//! Construction is table-free: a predicate captures column names and raw
//! domain values and only learns column types when [`Where::bind`] resolves
//! it against a [`TableSchema`]. The same predicate can therefore be reused
//! across tables that share column names.

use std::collections::HashMap;

use crate::argument::{Argument, ArgumentFactory};
use crate::errors::{Result, RowbindError};
use crate::ids::SortableId;
use crate::row::Row;
use crate::schema::TableSchema;
use crate::types::Value;

/// An immutable predicate fragment plus its pending parameter bindings.
#[derive(Debug, Clone, Default)]
pub struct Where {
    fragment: String,
    factories: HashMap<String, ArgumentFactory>,
}

fn placeholder() -> String {
    SortableId::generate().as_string()
}

impl Where {
    /// The neutral predicate: identity for `and` and `or`, renders no
    /// `where` clause at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A predicate that always matches.
    pub fn truth() -> Self {
        Self::raw("TRUE")
    }

    /// A predicate that never matches.
    pub fn falsity() -> Self {
        Self::raw("FALSE")
    }

    /// Wrap a literal SQL fragment with no parameters. The fragment is
    /// inserted verbatim, so it must never contain untrusted input.
    pub fn unsafe_fragment(sql: impl Into<String>) -> Self {
        Self::raw(sql)
    }

    fn raw(fragment: impl Into<String>) -> Self {
        Self {
            fragment: fragment.into(),
            factories: HashMap::new(),
        }
    }

    fn comparison(column: &str, operator: &str, value: impl Into<Value>) -> Self {
        let id = placeholder();
        Self {
            fragment: format!("\"{column}\" {operator} :{id}"),
            factories: HashMap::from([(id, ArgumentFactory::standard(column, value))]),
        }
    }

    pub fn equals(column: &str, value: impl Into<Value>) -> Self {
        Self::comparison(column, "=", value)
    }

    pub fn not_equal(column: &str, value: impl Into<Value>) -> Self {
        Self::comparison(column, "!=", value)
    }

    pub fn like(column: &str, pattern: impl Into<Value>) -> Self {
        Self::comparison(column, "like", pattern)
    }

    pub fn like_ignore_case(column: &str, pattern: impl Into<Value>) -> Self {
        Self::comparison(column, "ilike", pattern)
    }

    pub fn greater(column: &str, value: impl Into<Value>) -> Self {
        Self::comparison(column, ">", value)
    }

    pub fn greater_or_equal(column: &str, value: impl Into<Value>) -> Self {
        Self::comparison(column, ">=", value)
    }

    pub fn lower(column: &str, value: impl Into<Value>) -> Self {
        Self::comparison(column, "<", value)
    }

    pub fn lower_or_equal(column: &str, value: impl Into<Value>) -> Self {
        Self::comparison(column, "<=", value)
    }

    /// Inclusive range check over one column.
    pub fn between(column: &str, low: impl Into<Value>, high: impl Into<Value>) -> Self {
        let low_id = placeholder();
        let high_id = placeholder();
        Self {
            fragment: format!("\"{column}\" between :{low_id} and :{high_id}"),
            factories: HashMap::from([
                (low_id, ArgumentFactory::standard(column, low)),
                (high_id, ArgumentFactory::standard(column, high)),
            ]),
        }
    }

    pub fn is_null(column: &str) -> Self {
        Self::raw(format!("{column} is null"))
    }

    pub fn is_not_null(column: &str) -> Self {
        Self::raw(format!("{column} is not null"))
    }

    /// Matches rows whose column value is one of `values`. An empty set can
    /// match nothing, so it collapses to [`falsity`](Self::falsity).
    pub fn value_contains_field(column: &str, values: Vec<Value>) -> Self {
        if values.is_empty() {
            return Self::falsity();
        }
        let id = placeholder();
        Self {
            fragment: format!("{column} = any(:{id})"),
            factories: HashMap::from([(id, ArgumentFactory::array_of_column(column, values))]),
        }
    }

    /// Matches rows whose array column contains `value`.
    pub fn field_contains_value(column: &str, value: impl Into<Value>) -> Self {
        let id = placeholder();
        Self {
            fragment: format!(":{id} = any(\"{column}\")"),
            factories: HashMap::from([(id, ArgumentFactory::element_of_column(column, value))]),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fragment.is_empty()
    }

    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    /// Conjunction. Empty operands drop out structurally, so `and` never
    /// wraps the surviving side in redundant parentheses.
    pub fn and(self, other: Where) -> Where {
        self.combine("and", other)
    }

    /// Disjunction, with the same empty-operand short-circuit as
    /// [`and`](Self::and).
    pub fn or(self, other: Where) -> Where {
        self.combine("or", other)
    }

    fn combine(self, operator: &str, other: Where) -> Where {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }
        let mut factories = self.factories;
        factories.extend(other.factories);
        Where {
            fragment: format!("({}) {operator} ({})", self.fragment, other.fragment),
            factories,
        }
    }

    /// Negation. The empty predicate stays empty; everything else is
    /// parenthesized before the `not`, so combined fragments negate as a
    /// whole.
    pub fn not(self) -> Where {
        if self.is_empty() {
            return self;
        }
        Where {
            fragment: format!("not ({})", self.fragment),
            factories: self.factories,
        }
    }

    /// Conjunction over any number of predicates. Empty input folds to the
    /// empty predicate.
    pub fn all_of(predicates: impl IntoIterator<Item = Where>) -> Where {
        predicates.into_iter().fold(Where::empty(), Where::and)
    }

    /// Disjunction over any number of predicates.
    pub fn any_of(predicates: impl IntoIterator<Item = Where>) -> Where {
        predicates.into_iter().fold(Where::empty(), Where::or)
    }

    /// True when none of the predicates match.
    pub fn none_of(predicates: impl IntoIterator<Item = Where>) -> Where {
        Where::any_of(predicates).not()
    }

    /// The predicate that matches exactly `row` by its key columns.
    pub fn identify(table: &TableSchema, row: &Row) -> Result<Where> {
        let keys = table.keys();
        if keys.is_empty() {
            return Err(RowbindError::NoKeyDefined(table.name().to_string()));
        }
        Ok(Where::all_of(keys.into_iter().map(|field| {
            Where::equals(&field.name, row.value_or_null(&field.name))
        })))
    }

    /// The predicate that matches rows `row` would collide with.
    ///
    /// A collision is a match on any uniqueness-constrained column. On
    /// insert the row's own key values may also collide, so the key match is
    /// included; on update the row itself already exists and is excluded by
    /// negating its identity. With no unique columns beyond the key the
    /// check degrades to the key alone (insert) or never matches (update).
    pub fn detect_conflict(table: &TableSchema, row: &Row, is_insert: bool) -> Result<Where> {
        let unique = Where::any_of(table.unique_columns().into_iter().map(|field| {
            Where::equals(&field.name, row.value_or_null(&field.name))
        }));

        if is_insert {
            Ok(unique.or(Where::identify(table, row)?))
        } else if unique.is_empty() {
            Ok(Where::falsity())
        } else {
            Ok(unique.and(Where::identify(table, row)?.not()))
        }
    }

    /// The full clause, prefixed with `where`, or nothing when empty.
    pub fn to_clause(&self) -> String {
        if self.is_empty() {
            String::new()
        } else {
            format!("where {}", self.fragment)
        }
    }

    /// Resolve every pending parameter against `table`.
    pub fn bind(&self, table: &TableSchema) -> Result<BoundWhere> {
        let mut arguments = HashMap::with_capacity(self.factories.len());
        for (id, factory) in &self.factories {
            arguments.insert(id.clone(), factory.resolve(table)?);
        }
        Ok(BoundWhere {
            clause: self.to_clause(),
            arguments,
        })
    }
}

/// A predicate resolved against a concrete table: the final clause plus the
/// named arguments to pass alongside it.
#[derive(Debug)]
pub struct BoundWhere {
    clause: String,
    arguments: HashMap<String, Argument>,
}

impl BoundWhere {
    pub fn clause(&self) -> &str {
        &self.clause
    }

    pub fn arguments(&self) -> &HashMap<String, Argument> {
        &self.arguments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mappers::MapperRegistry;
    use crate::types::{FieldDescriptor, FieldType};
    use std::sync::Arc;

    fn schema() -> TableSchema {
        TableSchema::new("items", Arc::new(MapperRegistry::new()))
            .with_field(FieldDescriptor::new("id", FieldType::Long).key().autoincrement())
            .with_field(FieldDescriptor::new("label", FieldType::Text).unique())
            .with_field(FieldDescriptor::new("rank", FieldType::Int))
    }

    #[test]
    fn test_empty_is_identity_for_and_and_or() {
        let left = Where::equals("label", "a");
        assert_eq!(
            left.clone().and(Where::empty()).fragment(),
            left.fragment()
        );
        assert_eq!(Where::empty().or(left.clone()).fragment(), left.fragment());
        assert!(Where::empty().and(Where::empty()).is_empty());
    }

    #[test]
    fn test_empty_not_stays_empty() {
        assert!(Where::empty().not().is_empty());
    }

    #[test]
    fn test_combined_fragments_are_parenthesized() {
        let combined = Where::equals("label", "a").or(Where::greater("rank", 3));
        assert!(combined.fragment().starts_with('('));
        assert!(combined.fragment().contains(") or ("));

        let negated = combined.not();
        assert!(negated.fragment().starts_with("not ("));
        assert!(negated.fragment().ends_with(')'));
    }

    #[test]
    fn test_placeholders_do_not_collide_across_merges() {
        let combined = Where::equals("label", "a")
            .and(Where::equals("label", "b"))
            .and(Where::between("rank", 1, 5));
        assert_eq!(combined.factories.len(), 4);
    }

    #[test]
    fn test_empty_value_set_matches_nothing() {
        let predicate = Where::value_contains_field("label", Vec::new());
        assert_eq!(predicate.fragment(), "FALSE");
        assert!(predicate.factories.is_empty());
    }

    #[test]
    fn test_all_of_nothing_is_empty() {
        assert!(Where::all_of([]).is_empty());
        assert!(Where::any_of([]).is_empty());
        assert!(Where::none_of([]).is_empty());
    }

    #[test]
    fn test_to_clause() {
        assert_eq!(Where::empty().to_clause(), "");
        let clause = Where::equals("label", "a").to_clause();
        assert!(clause.starts_with("where \"label\" = :"));
    }

    #[test]
    fn test_null_comparison_keeps_operator() {
        // Matching engine null semantics: `= null` never matches, and that
        // is deliberate. Null checks go through is_null.
        let predicate = Where::equals("label", Value::Null);
        assert!(predicate.fragment().contains("\"label\" = :"));
        assert_eq!(Where::is_null("label").fragment(), "label is null");
        assert_eq!(
            Where::is_not_null("label").fragment(),
            "label is not null"
        );
    }

    #[test]
    fn test_bind_resolves_every_placeholder() {
        let table = schema();
        let predicate = Where::equals("label", "a").and(Where::between("rank", 1, 5));
        let bound = predicate.bind(&table).unwrap();
        assert_eq!(bound.arguments().len(), 3);
        assert!(bound.clause().starts_with("where ("));
    }

    #[test]
    fn test_bind_unknown_column_fails() {
        let table = schema();
        let err = Where::equals("missing", 1).bind(&table).unwrap_err();
        assert!(matches!(err, RowbindError::NoSuchColumn { .. }));
    }

    #[test]
    fn test_identify_requires_keys() {
        let keyless = TableSchema::new("log", Arc::new(MapperRegistry::new()))
            .with_field(FieldDescriptor::new("message", FieldType::Text));
        let err = Where::identify(&keyless, &Row::new()).unwrap_err();
        assert!(matches!(err, RowbindError::NoKeyDefined(ref table) if table == "log"));
    }

    #[test]
    fn test_identify_matches_all_keys() {
        let table = TableSchema::new("pairs", Arc::new(MapperRegistry::new()))
            .with_field(FieldDescriptor::new("left", FieldType::Int).key())
            .with_field(FieldDescriptor::new("right", FieldType::Int).key());
        let row = Row::new().with("left", 1).with("right", 2);
        let predicate = Where::identify(&table, &row).unwrap();
        assert!(predicate.fragment().contains("\"left\" = :"));
        assert!(predicate.fragment().contains("\"right\" = :"));
        assert!(predicate.fragment().contains(") and ("));
    }

    #[test]
    fn test_detect_conflict_without_unique_columns() {
        let table = TableSchema::new("plain", Arc::new(MapperRegistry::new()))
            .with_field(FieldDescriptor::new("id", FieldType::Long).key());
        let row = Row::new().with("id", 7i64);

        let update = Where::detect_conflict(&table, &row, false).unwrap();
        assert_eq!(update.fragment(), "FALSE");

        // On insert the key itself can still collide.
        let insert = Where::detect_conflict(&table, &row, true).unwrap();
        assert!(insert.fragment().contains("\"id\" = :"));
    }

    #[test]
    fn test_detect_conflict_on_update_excludes_own_row() {
        let table = schema();
        let row = Row::new().with("id", 7i64).with("label", "a");
        let predicate = Where::detect_conflict(&table, &row, false).unwrap();
        assert!(predicate.fragment().contains("\"label\" = :"));
        assert!(predicate.fragment().contains("and (not ("));
    }
}
