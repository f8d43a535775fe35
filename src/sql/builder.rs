//! Builds parameterized SELECT, INSERT, UPDATE, DELETE and CREATE TABLE from a registered type.

use crate::model::{FieldKind, FieldValue, ResourceSchema};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dialect {
    Postgres,
    Sqlite,
}

impl Dialect {
    /// Whether the store has a column mapping for this kind.
    pub fn supports(self, kind: FieldKind) -> bool {
        match self {
            Dialect::Postgres => true,
            Dialect::Sqlite => kind != FieldKind::Json,
        }
    }

    /// Column type used in CREATE TABLE. None when unsupported.
    pub fn column_type(self, kind: FieldKind) -> Option<&'static str> {
        Some(match (self, kind) {
            (_, FieldKind::Text) => "TEXT",
            (_, FieldKind::Boolean) => "BOOLEAN",
            (Dialect::Postgres, FieldKind::Integer) => "BIGINT",
            (Dialect::Postgres, FieldKind::Real) => "DOUBLE PRECISION",
            (Dialect::Postgres, FieldKind::Timestamp) => "TIMESTAMPTZ",
            (Dialect::Postgres, FieldKind::Uuid) => "UUID",
            (Dialect::Postgres, FieldKind::Json) => "JSONB",
            (Dialect::Sqlite, FieldKind::Integer) => "INTEGER",
            (Dialect::Sqlite, FieldKind::Real) => "REAL",
            (Dialect::Sqlite, FieldKind::Timestamp) => "DATETIME",
            (Dialect::Sqlite, FieldKind::Uuid) => "BLOB",
            (Dialect::Sqlite, FieldKind::Json) => return None,
        })
    }

    fn placeholder(self, n: usize) -> String {
        match self {
            Dialect::Postgres => format!("${}", n),
            Dialect::Sqlite => "?".to_string(),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Dialect::Postgres => "postgres",
            Dialect::Sqlite => "sqlite",
        })
    }
}

/// One `column = value` constraint.
#[derive(Clone, Debug, PartialEq)]
pub struct Constraint {
    pub column: String,
    pub value: FieldValue,
}

/// AND of equality constraints. Empty matches every row.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Predicate {
    pub constraints: Vec<Constraint>,
}

impl Predicate {
    pub fn is_unconstrained(&self) -> bool {
        self.constraints.is_empty()
    }
}

/// Column name with its kind and an optional value (None binds the store's NULL).
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: FieldKind,
    pub value: Option<FieldValue>,
}

/// A parameter to bind: the column kind picks the type of a NULL.
#[derive(Clone, Debug, PartialEq)]
pub struct BindParam {
    pub kind: FieldKind,
    pub value: Option<FieldValue>,
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<BindParam>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, dialect: Dialect, kind: FieldKind, value: Option<FieldValue>) -> String {
        self.params.push(BindParam { kind, value });
        dialect.placeholder(self.params.len())
    }
}

/// Quote identifier (safe: only from registered descriptors).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn column_list(schema: &ResourceSchema) -> String {
    schema
        .fields
        .iter()
        .map(|f| quoted(&f.name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn kind_of(schema: &ResourceSchema, column: &str) -> FieldKind {
    schema
        .fields
        .iter()
        .find(|f| f.name == column)
        .map(|f| f.kind)
        .unwrap_or(FieldKind::Text)
}

fn where_clause(q: &mut QueryBuf, dialect: Dialect, schema: &ResourceSchema, predicate: &Predicate) -> String {
    if predicate.is_unconstrained() {
        return String::new();
    }
    let parts: Vec<String> = predicate
        .constraints
        .iter()
        .map(|c| {
            let ph = q.push_param(dialect, kind_of(schema, &c.column), Some(c.value.clone()));
            format!("{} = {}", quoted(&c.column), ph)
        })
        .collect();
    format!(" WHERE {}", parts.join(" AND "))
}

/// SELECT every column in descriptor order, filtered by the predicate.
pub fn select(dialect: Dialect, schema: &ResourceSchema, predicate: &Predicate) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_sql = where_clause(&mut q, dialect, schema, predicate);
    q.sql = format!(
        "SELECT {} FROM {}{}",
        column_list(schema),
        quoted(&schema.name),
        where_sql
    );
    q
}

/// INSERT one row; unset columns bind NULL.
pub fn insert(dialect: Dialect, schema: &ResourceSchema, columns: &[Column]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut names = Vec::with_capacity(columns.len());
    let mut placeholders = Vec::with_capacity(columns.len());
    for c in columns {
        names.push(quoted(&c.name));
        placeholders.push(q.push_param(dialect, c.kind, c.value.clone()));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quoted(&schema.name),
        names.join(", "),
        placeholders.join(", ")
    );
    q
}

/// UPDATE: SET exactly the given columns on rows matching the predicate. None when there is nothing to set.
pub fn update(
    dialect: Dialect,
    schema: &ResourceSchema,
    predicate: &Predicate,
    columns: &[Column],
) -> Option<QueryBuf> {
    if columns.is_empty() {
        return None;
    }
    let mut q = QueryBuf::new();
    let sets: Vec<String> = columns
        .iter()
        .map(|c| {
            let ph = q.push_param(dialect, c.kind, c.value.clone());
            format!("{} = {}", quoted(&c.name), ph)
        })
        .collect();
    let where_sql = where_clause(&mut q, dialect, schema, predicate);
    q.sql = format!(
        "UPDATE {} SET {}{}",
        quoted(&schema.name),
        sets.join(", "),
        where_sql
    );
    Some(q)
}

pub fn delete(dialect: Dialect, schema: &ResourceSchema, predicate: &Predicate) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_sql = where_clause(&mut q, dialect, schema, predicate);
    q.sql = format!("DELETE FROM {}{}", quoted(&schema.name), where_sql);
    q
}

/// CREATE TABLE IF NOT EXISTS with every column nullable and no constraints.
pub fn create_table(dialect: Dialect, schema: &ResourceSchema) -> Option<String> {
    let mut cols = Vec::with_capacity(schema.fields.len());
    for f in &schema.fields {
        cols.push(format!("{} {}", quoted(&f.name), dialect.column_type(f.kind)?));
    }
    Some(format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        quoted(&schema.name),
        cols.join(", ")
    ))
}
