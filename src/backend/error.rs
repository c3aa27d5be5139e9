//! Backend error types
//!
//! The `Display` text of each variant is the plain message shown to the user.

use thiserror::Error;

/// Errors returned by account and invoice backends
#[derive(Error, Debug)]
pub enum BackendError {
    /// Missing, expired or invalid session, or wrong credentials
    #[error("{0}")]
    Unauthorized(String),

    #[error("Invoice not found: {0}")]
    NotFound(String),

    /// Account or document already exists
    #[error("{0}")]
    Conflict(String),

    /// The hosted service answered with an error body
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Backend request timed out")]
    Timeout,

    #[error("Backend unavailable")]
    Unavailable,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Local database failure
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl BackendError {
    /// Map a transport error the way every outbound call does
    pub fn from_request(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BackendError::Timeout
        } else if err.is_connect() {
            BackendError::Unavailable
        } else {
            BackendError::Http(err)
        }
    }
}

impl From<rusqlite::Error> for BackendError {
    fn from(err: rusqlite::Error) -> Self {
        BackendError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        BackendError::Serialization(err.to_string())
    }
}

/// Result type alias for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_is_plain_message() {
        let err = BackendError::Api {
            status: 401,
            message: "Invalid credentials. Please check the email and password.".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid credentials. Please check the email and password."
        );

        let err = BackendError::NotFound("inv-1".to_string());
        assert_eq!(err.to_string(), "Invoice not found: inv-1");
    }

    #[test]
    fn test_sqlite_error_conversion() {
        let err: BackendError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, BackendError::Storage(_)));
    }
}
