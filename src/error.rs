//! Error types for the spatial pooler crate.
//!
//! This module provides a unified error type for all operations, using the
//! `thiserror` crate for ergonomic error handling.

use thiserror::Error;

/// The main error type for spatial pooler operations.
///
/// Construction-time constraint violations, shape mismatches, and
/// out-of-range column indices are distinct variants so callers can
/// match on the failure kind rather than parse a message.
#[derive(Error, Debug)]
pub enum SpError {
    /// A construction-time constraint was violated: conflicting density
    /// parameters, rank mismatch between input and column dimensions,
    /// a permanence parameter outside its valid range, or a potential
    /// pool smaller than `stimulus_threshold`.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// An input or output vector did not have the expected length.
    #[error("shape mismatch: expected length {expected}, got {actual}")]
    Shape {
        /// Expected length.
        expected: usize,
        /// Actual length received.
        actual: usize,
    },

    /// A column index was outside `[0, num_columns)`.
    #[error("column index out of range: index {index}, num_columns {num_columns}")]
    Index {
        /// The index that was accessed.
        index: usize,
        /// The number of columns (exclusive upper bound).
        num_columns: usize,
    },

    /// I/O error occurred while saving or loading state.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Binary (de)serialization error occurred while saving or loading state.
    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// JSON (de)serialization error occurred while saving or loading state.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized `Result` type for spatial pooler operations.
pub type Result<T> = std::result::Result<T, SpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SpError::Shape {
            expected: 1024,
            actual: 512,
        };
        assert_eq!(err.to_string(), "shape mismatch: expected length 1024, got 512");

        let err = SpError::Index {
            index: 10,
            num_columns: 5,
        };
        assert_eq!(
            err.to_string(),
            "column index out of range: index 10, num_columns 5"
        );

        let err = SpError::Config("stimulusThreshold exceeds potential pool size".to_string());
        assert_eq!(
            err.to_string(),
            "invalid configuration: stimulusThreshold exceeds potential pool size"
        );
    }

    #[test]
    fn test_result_type() {
        fn returns_result() -> Result<i32> {
            Ok(42)
        }

        assert_eq!(returns_result().unwrap(), 42);
    }
}
