//! Transport seam between the repository client and an HTTP stack.
//!
//! # Invariants
//! - One `send` is exactly one request/response round trip; transports never
//!   retry.
//! - Non-2xx statuses are returned as responses, not errors; only failures to
//!   obtain a response are `ApiError::Transport`.

use crate::repo::error::ApiResult;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One outgoing request. The path is kept as raw segments so transports can
/// percent-encode them.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub segments: Vec<String>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, segments: &[&str]) -> Self {
        Self {
            method,
            segments: segments.iter().map(|segment| segment.to_string()).collect(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Display form of the path, e.g. `/notes/42`.
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }
}

/// Raw response: status code plus body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Request executor used by the repository client.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> ApiResult<ApiResponse>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: ApiRequest) -> ApiResult<ApiResponse> {
        (**self).send(request).await
    }
}
