//! Error types for the REST API.
//!
//! Every error leaving a handler becomes a JSON body of the shape
//! `{"error": "<message>"}` with a status code that reflects the cause:
//!
//! ```text
//! Unknown product / batch / transaction  → 404 Not Found
//! Insufficient stock, duplicate SKU      → 409 Conflict
//! Validation failure                     → 422 Unprocessable Entity
//! Database / internal failure            → 500 Internal Server Error
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use apotek_core::{CoreError, ValidationError};
use apotek_db::DbError;

/// API errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(_)
            | CoreError::BatchNotFound(_)
            | CoreError::TransactionNotFound(_) => ApiError::NotFound(err.to_string()),
            CoreError::InsufficientStock { .. } => ApiError::Conflict(err.to_string()),
            CoreError::TooManyItems { .. } | CoreError::Validation(_) => {
                ApiError::InvalidRequest(err.to_string())
            }
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::InvalidRequest(err.to_string())
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            DbError::UniqueViolation { .. } => ApiError::Conflict(err.to_string()),
            DbError::ForeignKeyViolation { .. } => ApiError::InvalidRequest(err.to_string()),
            DbError::Domain(core_err) => core_err.into(),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self, "Request failed");
        }

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
