//! Bind `BindParam`s to sqlx queries. NULLs are bound with the column's own type.

use crate::error::StoreError;
use crate::model::{FieldKind, FieldValue};
use crate::sql::BindParam;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgArguments, Postgres};
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments};

pub type PgQuery<'q> = Query<'q, Postgres, PgArguments>;
pub type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

pub fn bind_pg<'q>(query: PgQuery<'q>, param: &BindParam) -> PgQuery<'q> {
    match (&param.value, param.kind) {
        (Some(FieldValue::Integer(n)), _) => query.bind(*n),
        (Some(FieldValue::Real(n)), _) => query.bind(*n),
        (Some(FieldValue::Text(s)), _) => query.bind(s.clone()),
        (Some(FieldValue::Boolean(b)), _) => query.bind(*b),
        (Some(FieldValue::Timestamp(t)), _) => query.bind(*t),
        (Some(FieldValue::Uuid(u)), _) => query.bind(*u),
        (Some(FieldValue::Json(v)), _) => query.bind(v.clone()),
        (None, FieldKind::Integer) => query.bind(None::<i64>),
        (None, FieldKind::Real) => query.bind(None::<f64>),
        (None, FieldKind::Text) => query.bind(None::<String>),
        (None, FieldKind::Boolean) => query.bind(None::<bool>),
        (None, FieldKind::Timestamp) => query.bind(None::<DateTime<Utc>>),
        (None, FieldKind::Uuid) => query.bind(None::<uuid::Uuid>),
        (None, FieldKind::Json) => query.bind(None::<serde_json::Value>),
    }
}

pub fn bind_sqlite<'q>(query: SqliteQuery<'q>, param: &BindParam) -> Result<SqliteQuery<'q>, StoreError> {
    Ok(match (&param.value, param.kind) {
        (Some(FieldValue::Json(_)), _) | (None, FieldKind::Json) => {
            return Err(StoreError::Unsupported(FieldKind::Json))
        }
        (Some(FieldValue::Integer(n)), _) => query.bind(*n),
        (Some(FieldValue::Real(n)), _) => query.bind(*n),
        (Some(FieldValue::Text(s)), _) => query.bind(s.clone()),
        (Some(FieldValue::Boolean(b)), _) => query.bind(*b),
        (Some(FieldValue::Timestamp(t)), _) => query.bind(*t),
        (Some(FieldValue::Uuid(u)), _) => query.bind(*u),
        (None, FieldKind::Integer) => query.bind(None::<i64>),
        (None, FieldKind::Real) => query.bind(None::<f64>),
        (None, FieldKind::Text) => query.bind(None::<String>),
        (None, FieldKind::Boolean) => query.bind(None::<bool>),
        (None, FieldKind::Timestamp) => query.bind(None::<DateTime<Utc>>),
        (None, FieldKind::Uuid) => query.bind(None::<uuid::Uuid>),
    })
}
