//! Store boundary: the four primitive row operations plus table setup, behind one trait.

mod postgres;
mod sqlite;

pub use postgres::PgStore;
pub use sqlite::SqliteStore;

use crate::error::{AppError, ConfigError, StoreError};
use crate::model::{FieldValue, TypeHandle};
use crate::sql::{Column, Dialect, Predicate};
use async_trait::async_trait;
use std::sync::Arc;

/// One stored row, columns in descriptor order, `None` for the store's NULL.
pub type Row = Vec<Option<FieldValue>>;

/// Shared, concurrency-safe store handle. Implementations own a connection pool.
#[async_trait]
pub trait Store: Send + Sync {
    fn dialect(&self) -> Dialect;

    async fn select(&self, table: &TypeHandle, predicate: &Predicate) -> Result<Vec<Row>, StoreError>;

    async fn insert(&self, table: &TypeHandle, columns: &[Column]) -> Result<(), StoreError>;

    /// Returns the number of rows touched.
    async fn update(
        &self,
        table: &TypeHandle,
        predicate: &Predicate,
        columns: &[Column],
    ) -> Result<u64, StoreError>;

    async fn delete(&self, table: &TypeHandle, predicate: &Predicate) -> Result<u64, StoreError>;

    /// CREATE TABLE IF NOT EXISTS for a registered type.
    async fn ensure_table(&self, table: &TypeHandle) -> Result<(), StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

/// Dialect implied by a database URL.
pub fn dialect_for_url(url: &str) -> Result<Dialect, ConfigError> {
    if url.starts_with("postgres://") || url.starts_with("postgresql://") {
        Ok(Dialect::Postgres)
    } else if url.starts_with("sqlite:") {
        Ok(Dialect::Sqlite)
    } else {
        Err(ConfigError::UnsupportedUrl(url.to_string()))
    }
}

/// Open a pooled store for the URL's scheme.
pub async fn connect(url: &str, max_connections: u32) -> Result<Arc<dyn Store>, AppError> {
    let store: Arc<dyn Store> = match dialect_for_url(url)? {
        Dialect::Postgres => Arc::new(PgStore::connect(url, max_connections).await?),
        Dialect::Sqlite => Arc::new(SqliteStore::connect(url, max_connections).await?),
    };
    Ok(store)
}

/// Create the backing table of every handle.
pub async fn ensure_tables<'a>(
    store: &dyn Store,
    handles: impl IntoIterator<Item = &'a TypeHandle>,
) -> Result<(), StoreError> {
    for handle in handles {
        store.ensure_table(handle).await?;
    }
    Ok(())
}
