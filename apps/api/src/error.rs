//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │                      Error Flow                                    │
//! │                                                                    │
//! │  ValidationError (miga-core) ──┐                                   │
//! │  DbError (miga-db) ────────────┼──► ApiError { code, message }     │
//! │  RenderError (pdf gateway) ────┘          │                        │
//! │                                           ▼                        │
//! │                              HTTP status + JSON body               │
//! │                              { "code": "...", "message": "..." }   │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Ownership-scoped lookup misses always surface as NOT_FOUND - existence
//! is never revealed to non-owners. Authentication failures carry no
//! detail beyond the code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use miga_core::ValidationError;
use miga_db::DbError;

use crate::pdf::renderer::RenderError;

/// API error returned from handlers.
///
/// ## Serialization
/// ```json
/// { "code": "NOT_FOUND", "message": "Proforma not found: 1b2c..." }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// No authenticated principal (401)
    Unauthorized,

    /// Resource not found for this owner (404)
    NotFound,

    /// A supplied reference does not belong to the owner (400)
    InvalidReference,

    /// Input validation failed (400)
    ValidationError,

    /// Duplicate tax id, or sequence allocation retries exhausted (409)
    Conflict,

    /// The PDF gateway could not produce output (502)
    RenderFailure,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Authentication failure. Intentionally detail-free.
    pub fn unauthorized() -> Self {
        ApiError::new(ErrorCode::Unauthorized, "Authentication required")
    }

    /// Ownership-scoped lookup miss.
    pub fn not_found(entity: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{entity} not found: {id}"))
    }

    /// Validation failure with field-level detail in the message.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Internal failure.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    fn status(&self) -> StatusCode {
        match self.code {
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::InvalidReference => StatusCode::BAD_REQUEST,
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::RenderFailure => StatusCode::BAD_GATEWAY,
            ErrorCode::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match &err {
            DbError::NotFound { .. } => ApiError::new(ErrorCode::NotFound, err.to_string()),
            DbError::InvalidReference { .. } => {
                ApiError::new(ErrorCode::InvalidReference, err.to_string())
            }
            DbError::UniqueViolation { .. } | DbError::AllocationExhausted { .. } => {
                ApiError::new(ErrorCode::Conflict, err.to_string())
            }
            _ => ApiError::new(ErrorCode::DatabaseError, err.to_string()),
        }
    }
}

impl From<RenderError> for ApiError {
    fn from(err: RenderError) -> Self {
        ApiError::new(ErrorCode::RenderFailure, err.to_string())
    }
}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;
