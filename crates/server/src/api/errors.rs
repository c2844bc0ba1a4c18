//! API error types mapped to HTTP status codes.
//!
//! Each [`ApiError`] variant maps to a specific HTTP status code and produces
//! a JSON body `{"success": false, "message": ...}`. Internal errors also
//! carry an `error` field with the underlying cause.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use pulseboard_core::FilterError;
use serde_json::json;

/// Application-level error type that implements `IntoResponse`.
///
/// - `BadRequest` → 400
/// - `Unauthorized` → 401
/// - `Internal` → 500
#[derive(Debug)]
pub enum ApiError {
    /// Malformed filter or pagination parameters (400).
    BadRequest(String),
    /// Missing or unknown bearer token (401).
    Unauthorized(String),
    /// Store or task failure (500). The message is the cause; clients see a generic message.
    Internal(String),
}

impl From<FilterError> for ApiError {
    fn from(err: FilterError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                json!({ "success": false, "message": msg }),
            ),
            ApiError::Unauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                json!({ "success": false, "message": msg }),
            ),
            ApiError::Internal(cause) => {
                tracing::error!(error = %cause, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "success": false, "message": "Server error", "error": cause }),
                )
            }
        };
        (status, axum::Json(body)).into_response()
    }
}
