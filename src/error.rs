//! Error types for store operations.

use thiserror::Error;

/// Main error type for store operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Unknown reducer: {0}")]
    UnknownReducer(String),

    #[error("Reducer registered twice: {0}")]
    DuplicateReducer(String),

    #[error("Reducer name must not be empty")]
    InvalidReducerName,

    #[error("Payload mismatch for reducer {reducer}: expected {expected}")]
    PayloadMismatch {
        reducer: String,
        expected: &'static str,
    },
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
