//! PostgreSQL store over a shared `PgPool`.

use crate::error::StoreError;
use crate::model::{FieldDescriptor, FieldKind, FieldValue, TypeHandle};
use crate::sql::{self, bind_pg, Column, Dialect, Predicate, QueryBuf};
use crate::store::{Row, Store};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }

    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        Ok(Self::new(pool))
    }

    async fn fetch_all(&self, q: &QueryBuf) -> Result<Vec<PgRow>, StoreError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = bind_pg(query, p);
        }
        Ok(query.fetch_all(&self.pool).await?)
    }

    async fn execute(&self, q: &QueryBuf) -> Result<u64, StoreError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "execute");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = bind_pg(query, p);
        }
        Ok(query.execute(&self.pool).await?.rows_affected())
    }
}

#[async_trait]
impl Store for PgStore {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    async fn select(&self, table: &TypeHandle, predicate: &Predicate) -> Result<Vec<Row>, StoreError> {
        let q = sql::select(Dialect::Postgres, table.schema(), predicate);
        let rows = self.fetch_all(&q).await?;
        rows.iter().map(|r| decode_row(r, table.fields())).collect()
    }

    async fn insert(&self, table: &TypeHandle, columns: &[Column]) -> Result<(), StoreError> {
        let q = sql::insert(Dialect::Postgres, table.schema(), columns);
        self.execute(&q).await?;
        Ok(())
    }

    async fn update(
        &self,
        table: &TypeHandle,
        predicate: &Predicate,
        columns: &[Column],
    ) -> Result<u64, StoreError> {
        match sql::update(Dialect::Postgres, table.schema(), predicate, columns) {
            Some(q) => self.execute(&q).await,
            None => Ok(0),
        }
    }

    async fn delete(&self, table: &TypeHandle, predicate: &Predicate) -> Result<u64, StoreError> {
        let q = sql::delete(Dialect::Postgres, table.schema(), predicate);
        self.execute(&q).await
    }

    async fn ensure_table(&self, table: &TypeHandle) -> Result<(), StoreError> {
        let ddl = sql::create_table(Dialect::Postgres, table.schema())
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

fn decode_row(row: &PgRow, fields: &[FieldDescriptor]) -> Result<Row, StoreError> {
    fields
        .iter()
        .enumerate()
        .map(|(i, f)| decode_cell(row, i, f.kind))
        .collect()
}

fn decode_cell(row: &PgRow, i: usize, kind: FieldKind) -> Result<Option<FieldValue>, StoreError> {
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
        FieldKind::Json => row
            .try_get::<Option<serde_json::Value>, _>(i)?
            .map(FieldValue::Json),
    })
}
