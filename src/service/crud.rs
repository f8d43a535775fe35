//! Generic resource API: get, get_first, create, update, delete over one registered type.

use crate::error::{AppError, RegistryError};
use crate::model::{Resource, TypeHandle};
use crate::service::example::{build_predicate, patch_columns, record_to_columns, row_to_record};
use crate::store::Store;
use std::marker::PhantomData;
use std::sync::Arc;

/// CRUD for one resource type. Stateless beyond the shared store; cheap to clone.
pub struct ResourceApi<R> {
    handle: TypeHandle,
    store: Arc<dyn Store>,
    _record: PhantomData<fn() -> R>,
}

impl<R> Clone for ResourceApi<R> {
    fn clone(&self) -> Self {
        ResourceApi {
            handle: self.handle.clone(),
            store: self.store.clone(),
            _record: PhantomData,
        }
    }
}

impl<R: Resource> ResourceApi<R> {
    /// Bind a registered type to a store. The handle must describe `R`, and the store must map every kind.
    pub fn new(handle: TypeHandle, store: Arc<dyn Store>) -> Result<Self, RegistryError> {
        if handle.name() != R::NAME || handle.fields() != R::fields().as_slice() {
            return Err(RegistryError::InvalidDescriptor {
                type_name: R::NAME.to_string(),
                reason: format!("handle for '{}' does not describe this record type", handle.name()),
            });
        }
        let dialect = store.dialect();
        if let Some(f) = handle.fields().iter().find(|f| !dialect.supports(f.kind)) {
            return Err(RegistryError::UnsupportedKind {
                type_name: R::NAME.to_string(),
                field: f.name.clone(),
                kind: f.kind,
            });
        }
        Ok(ResourceApi {
            handle,
            store,
            _record: PhantomData,
        })
    }

    pub fn handle(&self) -> &TypeHandle {
        &self.handle
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// All rows matching the example, in store order.
    pub async fn get(&self, example: R) -> Result<Vec<R>, AppError> {
        let predicate = build_predicate(self.handle.schema(), example.to_values());
        let rows = self.store.select(&self.handle, &predicate).await?;
        let records = rows
            .into_iter()
            .map(row_to_record::<R>)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Some matching row. No ordering is assumed between calls.
    pub async fn get_first(&self, example: R) -> Result<R, AppError> {
        self.get(example)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(R::NAME.to_string()))
    }

    /// Insert one row. Identity freshness is the caller's job.
    pub async fn create(&self, record: R) -> Result<(), AppError> {
        let columns = record_to_columns(self.handle.schema(), record.to_values());
        self.store.insert(&self.handle, &columns).await?;
        Ok(())
    }

    /// Apply the patch's set fields to every row matching `find`. Zero matches is fine.
    pub async fn update(&self, find: R, patch: R) -> Result<u64, AppError> {
        let columns = patch_columns(self.handle.schema(), patch.to_values());
        if columns.is_empty() {
            return Ok(0);
        }
        let predicate = build_predicate(self.handle.schema(), find.to_values());
        Ok(self.store.update(&self.handle, &predicate, &columns).await?)
    }

    /// Delete every row matching the example. An all-unset example deletes the whole table.
    pub async fn delete(&self, example: R) -> Result<u64, AppError> {
        let predicate = build_predicate(self.handle.schema(), example.to_values());
        if predicate.is_unconstrained() {
            tracing::debug!(resource = R::NAME, "unconstrained delete");
        }
        Ok(self.store.delete(&self.handle, &predicate).await?)
    }
}
