//! In-memory [`DatabaseClient`] used by the integration tests.
//!
//! Supports exactly the statements this crate generates: `select * from
//! "table" [where ...]` and the single-column rewrite `update "table" set
//! "col" = :new where "col" = :old`. The where-clause evaluator understands
//! the fragment grammar the predicate builders emit, so bound predicates are
//! exercised end to end, arguments included.

// Each test binary uses a different subset of this module.
#![allow(dead_code)]

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Mutex;

use rowbind::argument::Argument;
use rowbind::client::DatabaseClient;
use rowbind::errors::ClientError;
use rowbind::row::Row;
use rowbind::types::Value;

pub struct MockClient {
    rows: Mutex<Vec<Row>>,
}

impl MockClient {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows: Mutex::new(rows),
        }
    }

    pub fn rows(&self) -> Vec<Row> {
        self.rows.lock().unwrap().clone()
    }
}

impl DatabaseClient for MockClient {
    fn execute(
        &self,
        sql: &str,
        arguments: &HashMap<String, Argument>,
    ) -> Result<Vec<Row>, ClientError> {
        let sql = sql.trim();
        if let Some(rest) = sql.strip_prefix("select * from ") {
            let (_, clause) = parse_quoted(rest.trim_start())
                .ok_or_else(|| ClientError::Execution(format!("bad select: {sql}")))?;
            let fragment = clause
                .trim()
                .strip_prefix("where ")
                .unwrap_or_else(|| clause.trim());
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .iter()
                .filter(|row| eval(fragment, row, arguments))
                .cloned()
                .collect())
        } else if let Some(rest) = sql.strip_prefix("update ") {
            let (_, rest) = parse_quoted(rest.trim_start())
                .ok_or_else(|| ClientError::Execution(format!("bad update: {sql}")))?;
            let rest = rest
                .trim_start()
                .strip_prefix("set ")
                .ok_or_else(|| ClientError::Execution(format!("bad update: {sql}")))?;
            let (column, rest) = parse_quoted(rest)
                .ok_or_else(|| ClientError::Execution(format!("bad update: {sql}")))?;
            if rest.trim() != format!("= :new where \"{column}\" = :old") {
                return Err(ClientError::Execution(format!("bad update: {sql}")));
            }
            let old = argument_value(arguments, "old")?;
            let new = argument_value(arguments, "new")?;

            let mut rows = self.rows.lock().unwrap();
            for row in rows.iter_mut() {
                if row.value_or_null(&column) == old {
                    row.set(&column, new.clone());
                }
            }
            Ok(Vec::new())
        } else {
            Err(ClientError::Execution(format!(
                "unsupported statement: {sql}"
            )))
        }
    }
}

fn argument_value(arguments: &HashMap<String, Argument>, name: &str) -> Result<Value, ClientError> {
    arguments
        .get(name)
        .map(Argument::as_value)
        .ok_or_else(|| ClientError::Execution(format!("missing argument :{name}")))
}

/// Parse a leading `"quoted"` identifier, returning it and the remainder.
fn parse_quoted(input: &str) -> Option<(String, &str)> {
    let rest = input.strip_prefix('"')?;
    let end = rest.find('"')?;
    Some((rest[..end].to_string(), &rest[end + 1..]))
}

/// Index of the parenthesis matching the one at `open`.
fn matching_paren(s: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in s.char_indices().skip(open) {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// `Some(inner)` when the whole string is one parenthesized group.
fn unwrap_parens(s: &str) -> Option<&str> {
    if !s.starts_with('(') {
        return None;
    }
    match matching_paren(s, 0) {
        Some(close) if close == s.len() - 1 => Some(&s[1..close]),
        _ => None,
    }
}

pub fn eval(fragment: &str, row: &Row, arguments: &HashMap<String, Argument>) -> bool {
    let fragment = fragment.trim();
    if fragment.is_empty() || fragment == "TRUE" {
        return true;
    }
    if fragment == "FALSE" {
        return false;
    }

    if let Some(rest) = fragment.strip_prefix("not ") {
        if let Some(inner) = unwrap_parens(rest.trim_start()) {
            return !eval(inner, row, arguments);
        }
    }

    if fragment.starts_with('(') {
        if let Some(close) = matching_paren(fragment, 0) {
            let left = &fragment[1..close];
            let rest = fragment[close + 1..].trim_start();
            if let Some(right) = rest.strip_prefix("and ").and_then(|r| unwrap_parens(r.trim_start())) {
                return eval(left, row, arguments) && eval(right, row, arguments);
            }
            if let Some(right) = rest.strip_prefix("or ").and_then(|r| unwrap_parens(r.trim_start())) {
                return eval(left, row, arguments) || eval(right, row, arguments);
            }
            if rest.is_empty() {
                return eval(left, row, arguments);
            }
        }
    }

    eval_atom(fragment, row, arguments)
}

fn eval_atom(atom: &str, row: &Row, arguments: &HashMap<String, Argument>) -> bool {
    // :id = any("col")
    if let Some(rest) = atom.strip_prefix(':') {
        let Some((id, rest)) = rest.split_once(' ') else {
            return false;
        };
        let Some(rest) = rest.trim_start().strip_prefix("= any(") else {
            return false;
        };
        let Some((column, _)) = parse_quoted(rest) else {
            return false;
        };
        let probe = match arguments.get(id).map(Argument::as_value) {
            Some(v) if !v.is_null() => v,
            _ => return false,
        };
        return match row.value_or_null(&column) {
            Value::Array(items) => items.iter().any(|item| value_eq(item, &probe)),
            _ => false,
        };
    }

    // "col" <op> :id  |  "col" between :a and :b
    if let Some((column, rest)) = parse_quoted(atom) {
        let rest = rest.trim_start();
        if let Some(rest) = rest.strip_prefix("between :") {
            let Some((low_id, rest)) = rest.split_once(' ') else {
                return false;
            };
            let Some(high_id) = rest.trim_start().strip_prefix("and :") else {
                return false;
            };
            let left = row.value_or_null(&column);
            let (Ok(low), Ok(high)) = (
                argument_value(arguments, low_id),
                argument_value(arguments, high_id.trim()),
            ) else {
                return false;
            };
            return matches!(compare(&left, &low), Some(Ordering::Greater | Ordering::Equal))
                && matches!(compare(&left, &high), Some(Ordering::Less | Ordering::Equal));
        }

        let Some((op, id)) = rest.split_once(" :") else {
            return false;
        };
        let left = row.value_or_null(&column);
        let Ok(right) = argument_value(arguments, id.trim()) else {
            return false;
        };
        return match op {
            "=" => value_eq(&left, &right),
            "!=" => !left.is_null() && !right.is_null() && !value_eq(&left, &right),
            ">" => matches!(compare(&left, &right), Some(Ordering::Greater)),
            ">=" => matches!(compare(&left, &right), Some(Ordering::Greater | Ordering::Equal)),
            "<" => matches!(compare(&left, &right), Some(Ordering::Less)),
            "<=" => matches!(compare(&left, &right), Some(Ordering::Less | Ordering::Equal)),
            "like" => like_match(&left, &right, false),
            "ilike" => like_match(&left, &right, true),
            _ => false,
        };
    }

    // col is null  |  col is not null  |  col = any(:id)
    if let Some(column) = atom.strip_suffix(" is not null") {
        return !row.value_or_null(column.trim()).is_null();
    }
    if let Some(column) = atom.strip_suffix(" is null") {
        return row.value_or_null(column.trim()).is_null();
    }
    if let Some((column, rest)) = atom.split_once(" = any(:") {
        let Some(id) = rest.strip_suffix(')') else {
            return false;
        };
        let left = row.value_or_null(column.trim());
        if left.is_null() {
            return false;
        }
        return match arguments.get(id).map(Argument::as_value) {
            Some(Value::Array(candidates)) => {
                candidates.iter().any(|candidate| value_eq(&left, candidate))
            }
            _ => false,
        };
    }

    false
}

/// SQL equality: null never matches anything, numbers compare by value.
pub fn value_eq(a: &Value, b: &Value) -> bool {
    if a.is_null() || b.is_null() {
        return false;
    }
    if a == b {
        return true;
    }
    matches!(compare(a, b), Some(Ordering::Equal))
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Text(x), Value::Text(y)) => Some(x.cmp(y)),
        (Value::Timestamp(x), Value::Timestamp(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y),
            _ => None,
        },
    }
}

/// `%`-wildcard matching, enough for the patterns the tests use.
fn like_match(value: &Value, pattern: &Value, ignore_case: bool) -> bool {
    let (Value::Text(value), Value::Text(pattern)) = (value, pattern) else {
        return false;
    };
    let (value, pattern) = if ignore_case {
        (value.to_lowercase(), pattern.to_lowercase())
    } else {
        (value.clone(), pattern.clone())
    };
    wildcard_match(&value, &pattern)
}

fn wildcard_match(value: &str, pattern: &str) -> bool {
    let segments: Vec<&str> = pattern.split('%').collect();
    if segments.len() == 1 {
        return value == pattern;
    }

    let mut remaining = value;
    let last = segments.len() - 1;
    for (i, segment) in segments.iter().enumerate() {
        if i == 0 {
            match remaining.strip_prefix(segment) {
                Some(rest) => remaining = rest,
                None => return false,
            }
        } else if i == last {
            return segment.is_empty() || remaining.ends_with(segment);
        } else if !segment.is_empty() {
            match remaining.find(segment) {
                Some(pos) => remaining = &remaining[pos + segment.len()..],
                None => return false,
            }
        }
    }
    true
}
