//! SQLite store over a shared `SqlitePool`.

use crate::error::StoreError;
use crate::model::{FieldDescriptor, FieldKind, FieldValue, TypeHandle};
use crate::sql::{self, bind_sqlite, Column, Dialect, Predicate, QueryBuf};
use crate::store::{Row, Store};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteStore { pool }
    }

    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Private in-memory database. One connection that is never recycled, so the data lives as long as the store.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Ok(Self::new(pool))
    }

    async fn fetch_all(&self, q: &QueryBuf) -> Result<Vec<SqliteRow>, StoreError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = bind_sqlite(query, p)?;
        }
        Ok(query.fetch_all(&self.pool).await?)
    }

    async fn execute(&self, q: &QueryBuf) -> Result<u64, StoreError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "execute");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = bind_sqlite(query, p)?;
        }
        Ok(query.execute(&self.pool).await?.rows_affected())
    }
}

#[async_trait]
impl Store for SqliteStore {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    async fn select(&self, table: &TypeHandle, predicate: &Predicate) -> Result<Vec<Row>, StoreError> {
        let q = sql::select(Dialect::Sqlite, table.schema(), predicate);
        let rows = self.fetch_all(&q).await?;
        rows.iter().map(|r| decode_row(r, table.fields())).collect()
    }

    async fn insert(&self, table: &TypeHandle, columns: &[Column]) -> Result<(), StoreError> {
        let q = sql::insert(Dialect::Sqlite, table.schema(), columns);
        self.execute(&q).await?;
        Ok(())
    }

    async fn update(
        &self,
        table: &TypeHandle,
        predicate: &Predicate,
        columns: &[Column],
    ) -> Result<u64, StoreError> {
        match sql::update(Dialect::Sqlite, table.schema(), predicate, columns) {
            Some(q) => self.execute(&q).await,
            None => Ok(0),
        }
    }

    async fn delete(&self, table: &TypeHandle, predicate: &Predicate) -> Result<u64, StoreError> {
        let q = sql::delete(Dialect::Sqlite, table.schema(), predicate);
        self.execute(&q).await
    }

    async fn ensure_table(&self, table: &TypeHandle) -> Result<(), StoreError> {
        let ddl = sql::create_table(Dialect::Sqlite, table.schema())
            .ok_or(StoreError::Unsupported(FieldKind::Json))?;
        tracing::debug!(sql = %ddl, "ensure table");
        sqlx::query(&ddl).execute(&self.pool).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}

fn decode_row(row: &SqliteRow, fields: &[FieldDescriptor]) -> Result<Row, StoreError> {
    fields
        .iter()
        .enumerate()
        .map(|(i, f)| decode_cell(row, i, f.kind))
        .collect()
}

fn decode_cell(row: &SqliteRow, i: usize, kind: FieldKind) -> Result<Option<FieldValue>, StoreError> {
    use sqlx::Row as _;
    Ok(match kind {
        FieldKind::Integer => row.try_get::<Option<i64>, _>(i)?.map(FieldValue::Integer),
        FieldKind::Real => row.try_get::<Option<f64>, _>(i)?.map(FieldValue::Real),
        FieldKind::Text => row.try_get::<Option<String>, _>(i)?.map(FieldValue::Text),
        FieldKind::Boolean => row.try_get::<Option<bool>, _>(i)?.map(FieldValue::Boolean),
        FieldKind::Timestamp => row
            .try_get::<Option<DateTime<Utc>>, _>(i)?
            .map(FieldValue::Timestamp),
        FieldKind::Uuid => row.try_get::<Option<uuid::Uuid>, _>(i)?.map(FieldValue::Uuid),
        FieldKind::Json => return Err(StoreError::Unsupported(FieldKind::Json)),
    })
}
