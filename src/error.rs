//! Error types for Bookloan server

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Stable, machine-checkable error codes returned in every error body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    NotAuthenticated = 2,
    Unauthorized = 3,
    InvalidInput = 4,
    InvalidRange = 5,
    BookUnavailable = 6,
    Unavailable = 7,
    NotFound = 8,
    InvalidStatus = 9,
    InvalidTransition = 10,
    Duplicate = 11,
    StoreFailure = 12,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid date range")]
    InvalidRange,

    #[error("Book unavailable")]
    BookUnavailable,

    #[error("Book already borrowed for given dates")]
    Unavailable,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Persistence failure; details are only logged under `incident`
    #[error("Store failure (incident {incident})")]
    StoreFailure { incident: Uuid },

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Authentication(_) => ErrorCode::NotAuthenticated,
            AppError::Unauthorized(_) => ErrorCode::Unauthorized,
            AppError::InvalidInput(_) => ErrorCode::InvalidInput,
            AppError::InvalidRange => ErrorCode::InvalidRange,
            AppError::BookUnavailable => ErrorCode::BookUnavailable,
            AppError::Unavailable => ErrorCode::Unavailable,
            AppError::NotFound(_) => ErrorCode::NotFound,
            AppError::InvalidStatus(_) => ErrorCode::InvalidStatus,
            AppError::InvalidTransition(_) => ErrorCode::InvalidTransition,
            AppError::Conflict(_) => ErrorCode::Duplicate,
            AppError::StoreFailure { .. } => ErrorCode::StoreFailure,
            AppError::Internal(_) => ErrorCode::Failure,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Authentication(_) => StatusCode::UNAUTHORIZED,
            AppError::Unauthorized(_) => StatusCode::FORBIDDEN,
            AppError::InvalidInput(_) | AppError::InvalidRange | AppError::InvalidStatus(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::BookUnavailable => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Unavailable | AppError::InvalidTransition(_) | AppError::Conflict(_) => {
                StatusCode::CONFLICT
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::StoreFailure { .. } | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        let incident = Uuid::new_v4();
        tracing::error!(%incident, error = ?e, "Database error");
        AppError::StoreFailure { incident }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::InvalidInput(e.to_string())
    }
}

// Extractor rejections (bad JSON, wrong types, missing fields or params)

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let message = match &self {
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (self.status(), body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_failure_hides_driver_text() {
        let err = AppError::from(sqlx::Error::PoolTimedOut);
        let text = err.to_string();
        assert!(matches!(err, AppError::StoreFailure { .. }));
        assert!(!text.contains("pool"));
        assert_eq!(err.code(), ErrorCode::StoreFailure);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::InvalidRange.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Unavailable.status(), StatusCode::CONFLICT);
        assert_eq!(AppError::BookUnavailable.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            AppError::Unauthorized("librarian only".into()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::StoreFailure { incident: Uuid::nil() }.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
