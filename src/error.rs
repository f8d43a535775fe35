//! Typed errors and HTTP mapping.

use crate::model::FieldKind;
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Message returned to callers for any failure whose detail must stay internal.
pub const UNEXPECTED_ERROR: &str = "an unexpected error occurred";

/// Registration-time failures. Fatal: the process should not start.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("duplicate resource type: {0}")]
    DuplicateType(String),
    #[error("invalid descriptor for {type_name}: {reason}")]
    InvalidDescriptor { type_name: String, reason: String },
    #[error("unsupported kind {kind} for {type_name}.{field}")]
    UnsupportedKind {
        type_name: String,
        field: String,
        kind: FieldKind,
    },
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("column {column}: expected {expected} value")]
    UnexpectedValue { column: String, expected: FieldKind },
    #[error("row is missing column {0}")]
    MissingColumn(String),
    #[error("kind {0} has no mapping in this store")]
    Unsupported(FieldKind),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
    #[error("unsupported database url: {0}")]
    UnsupportedUrl(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("access denied")]
    AccessDenied,
    #[error("validation: {0}")]
    Validation(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("serialize: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("no free identity for {resource} after {attempts} attempts")]
    IdentityExhausted { resource: &'static str, attempts: u32 },
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Store(StoreError::Sqlx(e))
    }
}

impl From<QueryRejection> for AppError {
    fn from(e: QueryRejection) -> Self {
        AppError::BadRequest(e.body_text())
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        AppError::BadRequest(e.body_text())
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AccessDenied => StatusCode::FORBIDDEN,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Store(_)
            | AppError::Registry(_)
            | AppError::Config(_)
            | AppError::Serialize(_)
            | AppError::IdentityExhausted { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "not_found",
            AppError::AccessDenied => "access_denied",
            AppError::Validation(_) => "validation_error",
            AppError::BadRequest(_) => "bad_request",
            _ => "unexpected_error",
        }
    }

    /// Text safe to hand to an external caller.
    pub fn public_message(&self) -> String {
        if self.status_code().is_server_error() {
            UNEXPECTED_ERROR.to_string()
        } else {
            self.to_string()
        }
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code().to_string(),
                message: self.public_message(),
            },
        };
        (status, Json(body)).into_response()
    }
}
