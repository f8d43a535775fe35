//! Interception points around each generic operation, one strategy per hook kind.
//!
//! A pre-hook may rewrite the record(s) it is given or reject the request. A
//! rejection stops the pipeline before the store is touched. `GetResponse`
//! shapes what a successful read returns to the caller; it is the place to
//! drop fields entirely rather than null them.

use crate::error::AppError;
use crate::extractors::RequestContext;
use crate::model::Resource;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

#[async_trait]
pub trait PreCreate<R: Resource>: Send + Sync {
    async fn pre_create(&self, ctx: &RequestContext, record: &mut R) -> Result<(), AppError>;
}

#[async_trait]
pub trait PreGet<R: Resource>: Send + Sync {
    async fn pre_get(&self, ctx: &RequestContext, example: &mut R) -> Result<(), AppError>;
}

#[async_trait]
pub trait PreUpdate<R: Resource>: Send + Sync {
    async fn pre_update(&self, ctx: &RequestContext, find: &mut R, patch: &mut R) -> Result<(), AppError>;
}

#[async_trait]
pub trait PreDelete<R: Resource>: Send + Sync {
    async fn pre_delete(&self, ctx: &RequestContext, example: &mut R) -> Result<(), AppError>;
}

#[async_trait]
pub trait GetResponse<R: Resource>: Send + Sync {
    async fn get_response(&self, ctx: &RequestContext, records: Vec<R>) -> Result<Value, AppError>;
}

/// Named operation outside the CRUD framing (e.g. login). Free to call any resource API.
#[async_trait]
pub trait CustomOperation<R: Resource>: Send + Sync {
    async fn call(&self, ctx: &RequestContext, record: R) -> Result<Value, AppError>;
}

/// Default for every hook kind: never rejects, changes nothing, returns records as a JSON array.
#[derive(Clone, Copy, Debug, Default)]
pub struct PassThrough;

#[async_trait]
impl<R: Resource> PreCreate<R> for PassThrough {
    async fn pre_create(&self, _ctx: &RequestContext, _record: &mut R) -> Result<(), AppError> {
        Ok(())
    }
}

#[async_trait]
impl<R: Resource> PreGet<R> for PassThrough {
    async fn pre_get(&self, _ctx: &RequestContext, _example: &mut R) -> Result<(), AppError> {
        Ok(())
    }
}

#[async_trait]
impl<R: Resource> PreUpdate<R> for PassThrough {
    async fn pre_update(&self, _ctx: &RequestContext, _find: &mut R, _patch: &mut R) -> Result<(), AppError> {
        Ok(())
    }
}

#[async_trait]
impl<R: Resource> PreDelete<R> for PassThrough {
    async fn pre_delete(&self, _ctx: &RequestContext, _example: &mut R) -> Result<(), AppError> {
        Ok(())
    }
}

#[async_trait]
impl<R: Resource> GetResponse<R> for PassThrough {
    async fn get_response(&self, _ctx: &RequestContext, records: Vec<R>) -> Result<Value, AppError> {
        Ok(serde_json::to_value(records)?)
    }
}

/// Exactly one hook of each kind for one resource type.
pub struct Hooks<R: Resource> {
    pub pre_create: Arc<dyn PreCreate<R>>,
    pub pre_get: Arc<dyn PreGet<R>>,
    pub pre_update: Arc<dyn PreUpdate<R>>,
    pub pre_delete: Arc<dyn PreDelete<R>>,
    pub get_response: Arc<dyn GetResponse<R>>,
}

impl<R: Resource> Default for Hooks<R> {
    fn default() -> Self {
        Hooks {
            pre_create: Arc::new(PassThrough),
            pre_get: Arc::new(PassThrough),
            pre_update: Arc::new(PassThrough),
            pre_delete: Arc::new(PassThrough),
            get_response: Arc::new(PassThrough),
        }
    }
}

impl<R: Resource> Clone for Hooks<R> {
    fn clone(&self) -> Self {
        Hooks {
            pre_create: self.pre_create.clone(),
            pre_get: self.pre_get.clone(),
            pre_update: self.pre_update.clone(),
            pre_delete: self.pre_delete.clone(),
            get_response: self.get_response.clone(),
        }
    }
}

impl<R: Resource> Hooks<R> {
    pub fn with_pre_create(mut self, hook: impl PreCreate<R> + 'static) -> Self {
        self.pre_create = Arc::new(hook);
        self
    }

    pub fn with_pre_get(mut self, hook: impl PreGet<R> + 'static) -> Self {
        self.pre_get = Arc::new(hook);
        self
    }

    pub fn with_pre_update(mut self, hook: impl PreUpdate<R> + 'static) -> Self {
        self.pre_update = Arc::new(hook);
        self
    }

    pub fn with_pre_delete(mut self, hook: impl PreDelete<R> + 'static) -> Self {
        self.pre_delete = Arc::new(hook);
        self
    }

    pub fn with_get_response(mut self, hook: impl GetResponse<R> + 'static) -> Self {
        self.get_response = Arc::new(hook);
        self
    }
}
