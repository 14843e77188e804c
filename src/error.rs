//! Custom error types for Spendwise
//!
//! A single error enum covers every layer of the application. Services return
//! [`SpendwiseResult`]; the binary converts to `anyhow` at the top level.

use thiserror::Error;

/// The main error type for Spendwise operations
#[derive(Error, Debug)]
pub enum SpendwiseError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// CSV reading/writing errors
    #[error("CSV error: {0}")]
    Csv(String),

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// Entity is still referenced and cannot be removed
    #[error("{entity_type} '{identifier}' is still used by {count} transaction(s)")]
    InUse {
        entity_type: &'static str,
        identifier: String,
        count: usize,
    },

    /// Budget-related errors
    #[error("Budget error: {0}")]
    Budget(String),

    /// Statement import errors
    #[error("Import error: {0}")]
    Import(String),

    /// Open banking API errors
    #[error("Bank API error: {0}")]
    Api(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl SpendwiseError {
    /// Create a "not found" error for categories
    pub fn category_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Category",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for transactions
    pub fn transaction_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Transaction",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<std::io::Error> for SpendwiseError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for SpendwiseError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<csv::Error> for SpendwiseError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err.to_string())
    }
}

/// Result type alias for Spendwise operations
pub type SpendwiseResult<T> = Result<T, SpendwiseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SpendwiseError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_not_found_error() {
        let err = SpendwiseError::category_not_found("Groceries");
        assert_eq!(err.to_string(), "Category not found: Groceries");
        assert!(err.is_not_found());
        assert!(!err.is_validation());
    }

    #[test]
    fn test_in_use_error() {
        let err = SpendwiseError::InUse {
            entity_type: "Category",
            identifier: "Travel".into(),
            count: 3,
        };
        assert_eq!(
            err.to_string(),
            "Category 'Travel' is still used by 3 transaction(s)"
        );
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: SpendwiseError = io_err.into();
        assert!(matches!(err, SpendwiseError::Io(_)));
    }
}
