//! Resource handlers: parse the partial record, run it through the pipeline, wrap the result.

use crate::error::AppError;
use crate::extractors::RequestContext;
use crate::model::Resource;
use crate::response::success_value;
use crate::rest::RestResource;
use axum::{
    body::Bytes,
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::Response,
    Json,
};
use serde::{de::DeserializeOwned, Deserialize};
use std::sync::Arc;

/// PATCH body: rows selected by `find` receive the set fields of `patch`.
#[derive(Deserialize)]
#[serde(bound(deserialize = "R: DeserializeOwned + Default"))]
pub struct UpdateBody<R> {
    #[serde(default)]
    pub find: R,
    #[serde(default)]
    pub patch: R,
}

/// Empty body means an all-unset record.
fn parse_record<R: Resource>(body: &Bytes) -> Result<R, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(R::default());
    }
    serde_json::from_slice(body).map_err(|e| AppError::BadRequest(format!("invalid {} body: {}", R::NAME, e)))
}

pub async fn list<R: Resource>(
    State(resource): State<Arc<RestResource<R>>>,
    ctx: RequestContext,
    example: Result<Query<R>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(example) = example?;
    let value = resource.get(&ctx, example).await?;
    Ok(success_value(value))
}

pub async fn first<R: Resource>(
    State(resource): State<Arc<RestResource<R>>>,
    ctx: RequestContext,
    example: Result<Query<R>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(example) = example?;
    let value = resource.get_first(&ctx, example).await?;
    Ok(success_value(value))
}

pub async fn create<R: Resource>(
    State(resource): State<Arc<RestResource<R>>>,
    ctx: RequestContext,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let record = parse_record::<R>(&body)?;
    resource.create(&ctx, record).await?;
    Ok(StatusCode::CREATED)
}

pub async fn update<R: Resource>(
    State(resource): State<Arc<RestResource<R>>>,
    ctx: RequestContext,
    body: Result<Json<UpdateBody<R>>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(body) = body?;
    resource.update(&ctx, body.find, body.patch).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete<R: Resource>(
    State(resource): State<Arc<RestResource<R>>>,
    ctx: RequestContext,
    example: Result<Query<R>, QueryRejection>,
) -> Result<StatusCode, AppError> {
    let Query(example) = example?;
    resource.delete(&ctx, example).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn operation<R: Resource>(
    State(resource): State<Arc<RestResource<R>>>,
    Path(name): Path<String>,
    ctx: RequestContext,
    body: Bytes,
) -> Result<Response, AppError> {
    let record = parse_record::<R>(&body)?;
    let value = resource.call(&name, &ctx, record).await?;
    Ok(success_value(value))
}
