//! API error types and response handling.
//!
//! This module provides a unified error type for all API handlers
//! with automatic conversion to appropriate HTTP responses.

use axum::extract::rejection::PathRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Result type alias for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type.
///
/// Each variant maps to a specific HTTP status code and produces a
/// consistent JSON error response.
#[derive(Debug, Clone)]
pub enum ApiError {
    /// 400 Bad Request - A path placeholder could not be parsed.
    BadRequest {
        /// Machine-readable error code.
        error_code: String,
        /// Human-readable error message.
        message: String,
    },

    /// 404 Not Found - Unknown path or no record for the given identifiers.
    NotFound {
        /// Machine-readable error code.
        error_code: String,
        /// Human-readable error message.
        message: String,
    },

    /// 405 Method Not Allowed - Known path, but not a GET.
    MethodNotAllowed {
        /// Machine-readable error code.
        error_code: String,
        /// Human-readable error message.
        message: String,
    },

    /// 500 Internal Server Error - Unexpected server-side error.
    InternalError {
        /// Machine-readable error code.
        error_code: String,
        /// Human-readable error message.
        message: String,
    },
}

/// Standard JSON error response body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "error": "invalid_date",
    "message": "Invalid date: '2025-13-01'. Expected ISO 8601 format 'YYYY-MM-DD' (e.g., '2025-01-31').",
    "details": null
}))]
pub struct ErrorResponse {
    /// Machine-readable error code (e.g., "arrival_not_found").
    #[schema(example = "arrival_not_found")]
    pub error: String,

    /// Human-readable error message.
    pub message: String,

    /// Optional additional details for debugging.
    #[schema(nullable)]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            Self::BadRequest {
                error_code,
                message,
            } => (StatusCode::BAD_REQUEST, error_code, message),

            Self::NotFound {
                error_code,
                message,
            } => (StatusCode::NOT_FOUND, error_code, message),

            Self::MethodNotAllowed {
                error_code,
                message,
            } => (StatusCode::METHOD_NOT_ALLOWED, error_code, message),

            Self::InternalError {
                error_code,
                message,
            } => {
                tracing::error!(
                    error_code = %error_code,
                    message = %message,
                    "Internal server error"
                );
                (StatusCode::INTERNAL_SERVER_ERROR, error_code, message)
            }
        };

        let body = ErrorResponse {
            error: error_code,
            message,
            details: None,
        };
        (status, Json(body)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadRequest { message, .. } => write!(f, "Bad Request: {message}"),
            Self::NotFound { message, .. } => write!(f, "Not Found: {message}"),
            Self::MethodNotAllowed { message, .. } => write!(f, "Method Not Allowed: {message}"),
            Self::InternalError { message, .. } => write!(f, "Internal Error: {message}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// Convert from railboard_core errors.
impl From<railboard_core::RailboardError> for ApiError {
    fn from(err: railboard_core::RailboardError) -> Self {
        let error_code = err.error_code().to_string();
        let message = err.to_string();

        if err.is_client_error() {
            Self::BadRequest {
                error_code,
                message,
            }
        } else if err.is_not_found() {
            Self::NotFound {
                error_code,
                message,
            }
        } else {
            Self::InternalError {
                error_code,
                message,
            }
        }
    }
}

/// Path placeholders that cannot be extracted, e.g. percent-encoded bytes
/// that are not UTF-8.
impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest {
            error_code: "invalid_path".to_string(),
            message: rejection.body_text(),
        }
    }
}

/// Fallback for paths that match no route.
pub async fn not_found() -> ApiError {
    ApiError::NotFound {
        error_code: "not_found".to_string(),
        message: "No route matches the requested path".to_string(),
    }
}

/// Fallback for known paths requested with a method other than GET.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed {
        error_code: "method_not_allowed".to_string(),
        message: "Only GET is supported on this path".to_string(),
    }
}
