//! Invoice validation errors

use thiserror::Error;

/// Errors raised while validating invoice input
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvoiceError {
    /// A required field is blank
    #[error("Please fill in all fields ({0} is required)")]
    MissingField(&'static str),

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    /// Amount is negative or not a number
    #[error("Amount must be a non-negative number, got {0}")]
    InvalidAmount(f64),

    #[error("VAT percentage must be between 0 and 100, got {0}")]
    InvalidVatPercentage(f64),

    #[error("Invalid status '{0}': expected paid, unpaid or pending")]
    InvalidStatus(String),
}

/// Result type alias for invoice operations
pub type InvoiceResult<T> = Result<T, InvoiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = InvoiceError::InvalidVatPercentage(120.0);
        assert_eq!(
            err.to_string(),
            "VAT percentage must be between 0 and 100, got 120"
        );

        let err = InvoiceError::MissingField("clientName");
        assert!(err.to_string().starts_with("Please fill in all fields"));
    }
}
