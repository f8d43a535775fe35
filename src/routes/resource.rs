//! Routes for one resource type, meant to be nested under its path prefix.

use crate::handlers::resource::{create, delete, first, list, operation, update};
use crate::model::Resource;
use crate::rest::RestResource;
use axum::{routing::get, routing::post, Router};
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;

pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// `GET|POST|PATCH|DELETE /`, `GET /first`, `POST /:operation`.
pub fn resource_routes<R: Resource>(resource: Arc<RestResource<R>>) -> Router {
    Router::new()
        .route(
            "/",
            get(list::<R>)
                .post(create::<R>)
                .patch(update::<R>)
                .delete(delete::<R>),
        )
        .route("/first", get(first::<R>))
        .route("/:operation", post(operation::<R>))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(resource)
}
