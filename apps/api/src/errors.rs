use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::artifacts::locator::LocateError;
use crate::artifacts::reader::StorageError;
use crate::jobs::status::InvalidStatus;
use crate::render_client::RenderError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
/// Every variant maps to exactly one HTTP status.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    InvalidStatus(#[from] InvalidStatus),

    /// The stored artifact path is unparseable. Data corruption, not a client error.
    #[error("Malformed artifact path: {0}")]
    MalformedPath(#[from] LocateError),

    #[error("Render service unavailable: {0}")]
    RenderServiceUnavailable(String),

    #[error("Render compilation failed: {0}")]
    RenderCompilationFailed(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => AppError::NotFound(format!("Artifact {key} not found")),
            other => AppError::Storage(other.to_string()),
        }
    }
}

impl From<RenderError> for AppError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Unavailable(msg) => AppError::RenderServiceUnavailable(msg),
            RenderError::CompilationFailed(msg) => AppError::RenderCompilationFailed(msg),
        }
    }
}

// Extractor rejections share the JSON error body instead of axum's plain text.

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::InvalidStatus(e) => (StatusCode::BAD_REQUEST, "INVALID_STATUS", e.to_string()),
            AppError::MalformedPath(e) => {
                tracing::error!("Malformed artifact path: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "MALFORMED_PATH",
                    "The stored resume path is invalid".to_string(),
                )
            }
            AppError::RenderServiceUnavailable(msg) => {
                tracing::error!("Render service unavailable: {msg}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "RENDER_SERVICE_UNAVAILABLE",
                    "LaTeX service unavailable".to_string(),
                )
            }
            AppError::RenderCompilationFailed(msg) => {
                tracing::error!("Render compilation failed: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "RENDER_COMPILATION_FAILED",
                    "PDF compilation failed".to_string(),
                )
            }
            AppError::Storage(msg) => {
                tracing::error!("Storage error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
