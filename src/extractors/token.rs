//! Per-request context handed to hooks: headers, including the bearer credential.

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap, HeaderValue},
};

/// Header carrying the bearer credential.
pub const TOKEN_HEADER: &str = "Token";

#[derive(Clone, Debug, Default)]
pub struct RequestContext {
    pub headers: HeaderMap,
}

impl RequestContext {
    pub fn new(headers: HeaderMap) -> Self {
        RequestContext { headers }
    }

    /// Context carrying only a bearer credential.
    pub fn with_token(token: &str) -> Self {
        let mut headers = HeaderMap::new();
        if let Ok(v) = HeaderValue::from_str(token) {
            headers.insert(TOKEN_HEADER, v);
        }
        RequestContext { headers }
    }

    /// Trimmed, non-empty value of the `Token` header.
    pub fn bearer_token(&self) -> Option<&str> {
        self.headers
            .get(TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(RequestContext::new(parts.headers.clone()))
    }
}
