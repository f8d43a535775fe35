//! Hook pipeline around the resource API: pre-hook, one API call, response shaping.

use crate::error::AppError;
use crate::extractors::RequestContext;
use crate::hooks::{CustomOperation, Hooks};
use crate::model::Resource;
use crate::service::ResourceApi;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

pub struct RestResource<R: Resource> {
    api: ResourceApi<R>,
    hooks: Hooks<R>,
    operations: HashMap<String, Arc<dyn CustomOperation<R>>>,
}

impl<R: Resource> RestResource<R> {
    pub fn new(api: ResourceApi<R>) -> Self {
        RestResource {
            api,
            hooks: Hooks::default(),
            operations: HashMap::new(),
        }
    }

    pub fn with_hooks(mut self, hooks: Hooks<R>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Mount a named operation. A later registration under the same name replaces the earlier one.
    pub fn with_operation(mut self, name: &str, op: impl CustomOperation<R> + 'static) -> Self {
        self.operations.insert(name.to_string(), Arc::new(op));
        self
    }

    pub fn operation_names(&self) -> impl Iterator<Item = &str> {
        self.operations.keys().map(String::as_str)
    }

    pub async fn get(&self, ctx: &RequestContext, mut example: R) -> Result<Value, AppError> {
        self.hooks
            .pre_get
            .pre_get(ctx, &mut example)
            .await
            .inspect_err(|e| rejected(R::NAME, "get", e))?;
        let records = self.api.get(example).await?;
        self.hooks.get_response.get_response(ctx, records).await
    }

    /// Same hooks as `get`; the response hook sees a single record.
    pub async fn get_first(&self, ctx: &RequestContext, mut example: R) -> Result<Value, AppError> {
        self.hooks
            .pre_get
            .pre_get(ctx, &mut example)
            .await
            .inspect_err(|e| rejected(R::NAME, "get_first", e))?;
        let record = self.api.get_first(example).await?;
        self.hooks.get_response.get_response(ctx, vec![record]).await
    }

    pub async fn create(&self, ctx: &RequestContext, mut record: R) -> Result<(), AppError> {
        self.hooks
            .pre_create
            .pre_create(ctx, &mut record)
            .await
            .inspect_err(|e| rejected(R::NAME, "create", e))?;
        self.api.create(record).await
    }

    pub async fn update(&self, ctx: &RequestContext, mut find: R, mut patch: R) -> Result<(), AppError> {
        self.hooks
            .pre_update
            .pre_update(ctx, &mut find, &mut patch)
            .await
            .inspect_err(|e| rejected(R::NAME, "update", e))?;
        self.api.update(find, patch).await?;
        Ok(())
    }

    pub async fn delete(&self, ctx: &RequestContext, mut example: R) -> Result<(), AppError> {
        self.hooks
            .pre_delete
            .pre_delete(ctx, &mut example)
            .await
            .inspect_err(|e| rejected(R::NAME, "delete", e))?;
        self.api.delete(example).await?;
        Ok(())
    }

    /// Run a named custom operation.
    pub async fn call(&self, name: &str, ctx: &RequestContext, record: R) -> Result<Value, AppError> {
        let op = self
            .operations
            .get(name)
            .ok_or_else(|| AppError::NotFound(format!("{}/{}", R::NAME, name)))?;
        op.call(ctx, record).await
    }
}

fn rejected(resource: &str, operation: &str, error: &AppError) {
    tracing::debug!(resource, operation, error = %error, "hook rejected request");
}
