//! Error types for field generation and streamline extraction.

use thiserror::Error;

/// Result type alias using FieldError.
pub type FieldResult<T> = Result<T, FieldError>;

#[derive(Debug, Error)]
pub enum FieldError {
    #[error("Invalid bounding box: {0}")]
    InvalidBbox(String),

    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    #[error("Dimension mismatch: expected {expected_rows}x{expected_cols}, got {rows}x{cols}")]
    DimensionMismatch {
        expected_rows: usize,
        expected_cols: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Invalid streamline parameters: {0}")]
    InvalidParameters(String),
}
