//! Structured errors for the nfz-queues HTTP surface.
//!
//! Every error body carries a stable `code` and a human-readable `message`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use nfzq_core::{Error, QueryViolation};
use serde::Serialize;

/// JSON error body.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<ViolationBody>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ViolationBody {
    pub field: String,
    pub message: String,
}

/// Structured API error returned by handlers.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    /// 400 listing every rule the request broke.
    pub fn invalid_query(violations: &[QueryViolation]) -> Self {
        let message = violations.first().map(QueryViolation::message).unwrap_or("invalid query").to_string();
        let violations = violations
            .iter()
            .map(|v| ViolationBody { field: v.field().to_string(), message: v.message().to_string() })
            .collect();

        Self { status: StatusCode::BAD_REQUEST, body: ErrorBody { code: "invalid_query".to_string(), message, violations } }
    }

    fn new(status: StatusCode, code: &str, message: String) -> Self {
        Self { status, body: ErrorBody { code: code.to_string(), message, violations: Vec::new() } }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::InvalidQuery(msg) => ApiError::new(StatusCode::BAD_REQUEST, "invalid_query", msg),
            Error::UpstreamFetch(msg) => {
                tracing::warn!(error = %msg, "upstream fetch failed");
                ApiError::new(StatusCode::BAD_GATEWAY, "upstream_error", msg)
            }
            other => {
                tracing::error!(error = %other, "request failed");
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal error".to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
