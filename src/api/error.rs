//! API Error Types
//!
//! Defines error types for the API layer and implements conversion
//! to HTTP responses with appropriate status codes. The message of every
//! variant is the plain text the UI shows in its form error or toast.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::AuthError;
use crate::backend::BackendError;
use crate::invoice::InvoiceError;

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request validation failed
    #[error("{0}")]
    Validation(String),

    /// Missing or invalid session
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// The hosted backend rejected the call
    #[error("{0}")]
    Upstream(String),

    /// Service unavailable (backend down or timing out)
    #[error("{0}")]
    ServiceUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
    pub request_id: String,
}

/// Error details
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            ApiError::Upstream(_) => (StatusCode::BAD_GATEWAY, "BACKEND_ERROR"),
            ApiError::ServiceUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE")
            }
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let request_id = uuid::Uuid::new_v4().to_string();

        if status.is_server_error() {
            tracing::error!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "API error occurred"
            );
        } else {
            tracing::debug!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "Request rejected"
            );
        }

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: self.to_string(),
            },
            request_id,
        };

        (status, Json(body)).into_response()
    }
}

impl From<BackendError> for ApiError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Unauthorized(msg) => ApiError::Unauthorized(msg),
            BackendError::NotFound(_) => ApiError::NotFound(err.to_string()),
            BackendError::Conflict(msg) => ApiError::Conflict(msg),
            BackendError::Api { status: 404, message } => ApiError::NotFound(message),
            BackendError::Api { status, message } if (400..500).contains(&status) => {
                ApiError::Validation(message)
            }
            BackendError::Api { message, .. } => ApiError::Upstream(message),
            BackendError::Timeout | BackendError::Unavailable => {
                ApiError::ServiceUnavailable(err.to_string())
            }
            BackendError::Http(e) => ApiError::Upstream(e.to_string()),
            BackendError::Storage(_) | BackendError::Serialization(_) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Backend(e) => e.into(),
            other => ApiError::Validation(other.to_string()),
        }
    }
}

impl From<InvoiceError> for ApiError {
    fn from(err: InvoiceError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_mapping() {
        let err: ApiError = BackendError::Unauthorized("Invalid credentials".to_string()).into();
        assert_eq!(err.status_and_code().0, StatusCode::UNAUTHORIZED);
        assert_eq!(err.to_string(), "Invalid credentials");

        let err: ApiError = BackendError::Api {
            status: 400,
            message: "Invalid `email` param".to_string(),
        }
        .into();
        assert_eq!(err.status_and_code().0, StatusCode::BAD_REQUEST);

        let err: ApiError = BackendError::Api {
            status: 500,
            message: "Server Error".to_string(),
        }
        .into();
        assert_eq!(err.status_and_code().0, StatusCode::BAD_GATEWAY);

        let err: ApiError = BackendError::Timeout.into();
        assert_eq!(err.status_and_code().0, StatusCode::SERVICE_UNAVAILABLE);

        let err: ApiError = BackendError::NotFound("inv-1".to_string()).into();
        assert_eq!(err.status_and_code(), (StatusCode::NOT_FOUND, "NOT_FOUND"));
    }

    #[test]
    fn test_auth_error_is_validation() {
        let err: ApiError = AuthError::PasswordTooShort.into();
        assert_eq!(err.status_and_code().0, StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Password must be at least 8 characters");
    }
}
