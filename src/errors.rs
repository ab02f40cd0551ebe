use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::error::DbErr;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// JSON body returned on every failed request.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// HTTP status category (e.g. "Not Found", "Conflict")
    pub error: String,
    /// Human-readable error description
    pub message: String,
    /// Field-level validation or driver detail, when available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Event error: {0}")]
    EventError(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Concurrent modification: {0}")]
    ConcurrentModification(Uuid),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl ServiceError {
    /// Wraps a database error, promoting constraint violations to the
    /// error kinds callers can act on: unique violations become
    /// `Conflict`, foreign-key blocks on delete become `Conflict` too.
    pub fn from_db(err: DbErr) -> Self {
        match err.sql_err() {
            Some(sea_orm::SqlErr::UniqueConstraintViolation(detail)) => {
                ServiceError::Conflict(format!("Unique constraint violated: {}", detail))
            }
            Some(sea_orm::SqlErr::ForeignKeyConstraintViolation(detail)) => {
                ServiceError::Conflict(format!("Foreign key constraint violated: {}", detail))
            }
            _ => ServiceError::DatabaseError(err),
        }
    }

    /// Returns the HTTP status code for this error.
    /// This is the single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ValidationError(_) | Self::InvalidOperation(_) | Self::InvalidStatus(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Conflict(_) | Self::ConcurrentModification(_) => StatusCode::CONFLICT,
            Self::DatabaseError(_) | Self::EventError(_) | Self::InternalError(_) | Self::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the error message suitable for HTTP responses.
    /// Internal errors return generic messages to avoid leaking driver detail.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(_) => "Database error".to_string(),
            Self::EventError(_) | Self::InternalError(_) | Self::Other(_) => {
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let err = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.response_message(),
            details: None,
        };

        (status, Json(err)).into_response()
    }
}

/// API error type for HTTP handlers; wraps `ServiceError` and adds the
/// handler-local failure kinds (payload validation, missing route params).
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Service error: {0}")]
    ServiceError(#[from] ServiceError),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, details) = match self {
            ApiError::ServiceError(service_error) => {
                return service_error.into_response();
            }
            ApiError::ValidationError(msg) => {
                let details = serde_json::to_value(&msg).ok();
                (StatusCode::BAD_REQUEST, msg, details)
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
        };

        let err = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message,
            details,
        };

        (status, Json(err)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_error_status_code_mapping() {
        assert_eq!(
            ServiceError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::ValidationError("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::Conflict("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ServiceError::InvalidStatus("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::InternalError("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn response_message_hides_database_detail() {
        let err = ServiceError::DatabaseError(DbErr::Custom("connection reset".into()));
        assert_eq!(err.response_message(), "Database error");

        assert_eq!(
            ServiceError::NotFound("batch missing".into()).response_message(),
            "Not found: batch missing"
        );
    }
}
