//! Error types for the statistical computation engine
//!
//! Provides a unified error type for all statbench crates. Every variant is a
//! local, recoverable validation or computation failure; nothing here is
//! fatal to the process.

use thiserror::Error;

/// Core error type for statbench operations
#[derive(Error, Debug)]
pub enum Error {
    /// No dataset has been loaded into the session
    #[error("No dataset loaded")]
    MissingDataset,

    /// Requested column does not exist in the dataset view
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// Column exists but does not hold numeric values
    #[error("Column is not numeric: {0}")]
    NonNumericColumn(String),

    /// Every row was removed by missing-value or category filtering
    #[error("No rows left after filtering: {0}")]
    EmptyAfterFiltering(String),

    /// Invalid parameter provided to a function
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Invalid input data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Insufficient data for the requested operation
    #[error("Insufficient data: expected at least {expected} samples, got {actual}")]
    InsufficientData { expected: usize, actual: usize },

    /// Fewer distinct non-empty groups than the operation needs
    #[error("Insufficient groups: expected at least {expected} non-empty groups, got {actual}")]
    InsufficientGroups { expected: usize, actual: usize },

    /// Requested combination of options cannot be honoured
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Numerical computation error
    #[error("Computation error: {0}")]
    Computation(String),

    /// Errors raised by a dataset backend
    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Short machine-oriented identifier for the error kind
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingDataset => "missing_dataset",
            Self::ColumnNotFound(_) => "column_not_found",
            Self::NonNumericColumn(_) => "non_numeric_column",
            Self::EmptyAfterFiltering(_) => "empty_after_filtering",
            Self::InvalidParameter(_) => "invalid_parameter",
            Self::InvalidInput(_) => "invalid_input",
            Self::InsufficientData { .. } => "insufficient_data",
            Self::InsufficientGroups { .. } => "insufficient_groups",
            Self::InvalidConfiguration(_) => "invalid_configuration",
            Self::Computation(_) => "computation",
            Self::Other(_) => "other",
        }
    }

    /// Create an error for empty input
    pub fn empty_input(_operation: &str) -> Self {
        Self::InsufficientData {
            expected: 1,
            actual: 0,
        }
    }

    /// Create an error for a probability outside the open unit interval
    pub fn invalid_probability(p: f64) -> Self {
        Self::InvalidParameter(format!("Probability {p} must be in (0, 1)"))
    }

    /// Create an error for an invalid confidence level
    pub fn invalid_level(level: f64) -> Self {
        Self::InvalidParameter(format!("Confidence level {level} must be in (0, 1)"))
    }

    /// Create an error for size mismatch
    pub fn size_mismatch(expected: usize, actual: usize, context: &str) -> Self {
        Self::InvalidInput(format!(
            "Size mismatch in {context}: expected {expected}, got {actual}"
        ))
    }

    /// Create an error for NaN/Inf values
    pub fn non_finite(context: &str) -> Self {
        Self::InvalidInput(format!("{context} contains NaN or infinite values"))
    }

    /// Wrap a statrs construction failure
    pub fn distribution(name: &str, err: impl std::fmt::Display) -> Self {
        Self::Computation(format!("Failed to create {name} distribution: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::MissingDataset;
        assert_eq!(err.to_string(), "No dataset loaded");

        let err = Error::ColumnNotFound("height".to_string());
        assert_eq!(err.to_string(), "Column not found: height");

        let err = Error::InsufficientData { expected: 2, actual: 1 };
        assert_eq!(
            err.to_string(),
            "Insufficient data: expected at least 2 samples, got 1"
        );

        let err = Error::InsufficientGroups { expected: 2, actual: 1 };
        assert!(err.to_string().contains("non-empty groups"));
    }

    #[test]
    fn test_error_codes_are_distinct() {
        let errors = [
            Error::MissingDataset,
            Error::ColumnNotFound(String::new()),
            Error::NonNumericColumn(String::new()),
            Error::EmptyAfterFiltering(String::new()),
            Error::InvalidParameter(String::new()),
            Error::InvalidInput(String::new()),
            Error::InsufficientData { expected: 0, actual: 0 },
            Error::InsufficientGroups { expected: 0, actual: 0 },
            Error::InvalidConfiguration(String::new()),
            Error::Computation(String::new()),
        ];
        let mut codes: Vec<_> = errors.iter().map(Error::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_error_helper_functions() {
        match Error::empty_input("mean") {
            Error::InsufficientData { expected, actual } => {
                assert_eq!(expected, 1);
                assert_eq!(actual, 0);
            }
            _ => panic!("Wrong error type"),
        }

        let err = Error::invalid_level(1.5);
        assert_eq!(
            err.to_string(),
            "Invalid parameter: Confidence level 1.5 must be in (0, 1)"
        );
        assert_eq!(err.code(), "invalid_parameter");

        let err = Error::size_mismatch(10, 9, "weights");
        assert_eq!(
            err.to_string(),
            "Invalid input: Size mismatch in weights: expected 10, got 9"
        );
    }

    #[test]
    fn test_error_from_anyhow() {
        let err: Error = anyhow::anyhow!("backend failure").into();
        assert_eq!(err.code(), "other");
        assert!(err.to_string().contains("backend failure"));
    }
}
