use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::any::Any;
use thiserror::Error;

/// Failures the slot API reports to clients. Both carry the identity of the
/// answering slot so a misrouted request is still attributable.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Route not found")]
    RouteNotFound { identity: String },

    #[error("Internal Server Error")]
    Internal { identity: String },
}

/// Error response that gets serialized to JSON
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub identity: String,
    pub timestamp: DateTime<Utc>,
}

impl ApiError {
    pub fn not_found(identity: impl Into<String>) -> Self {
        ApiError::RouteNotFound {
            identity: identity.into(),
        }
    }

    pub fn internal(identity: impl Into<String>) -> Self {
        ApiError::Internal {
            identity: identity.into(),
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn identity(&self) -> &str {
        match self {
            ApiError::RouteNotFound { identity } | ApiError::Internal { identity } => identity,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.to_string(),
            identity: self.identity().to_string(),
            timestamp: Utc::now(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

/// Turns a caught handler panic into the generic 500 body. The panic
/// message is logged, never returned.
pub fn panic_response(identity: &str, panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    tracing::error!(identity, panic = detail, "handler panicked");
    ApiError::internal(identity).into_response()
}
