//! Error types for order intake.

use std::path::PathBuf;
use thiserror::Error;

/// Error classes for order processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// File could not be opened, read or written
    FileAccess,
    /// Quantity or price is not a non-negative decimal
    InvalidNumber,
    /// Sheet header or row width does not match the schema
    SheetLayoutMismatch,
    /// Date text could not be parsed
    DateParse,
    /// Phone number rejected on submit
    InvalidPhone,
    /// Caller passed an out-of-range or inconsistent argument
    InvalidInput,
}

/// Main error type for order intake.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Cannot access {path}: {message}")]
    FileAccess { path: PathBuf, message: String },

    #[error("Invalid number for '{field}': '{value}'")]
    InvalidNumber { field: String, value: String },

    #[error("Commission must be within 0..=100, got {value}")]
    InvalidCommission { value: u32 },

    #[error("Sheet layout mismatch: {message}")]
    SheetLayoutMismatch { message: String },

    #[error("Cannot parse date '{value}' with format '{format}'")]
    DateParse { value: String, format: String },

    #[error("Phone number '{phone}' does not match +7 (DDD) DDD-DD-DD")]
    InvalidPhone { phone: String },

    #[error("Cell {cell} holds the error value {value}, which cannot be written back")]
    UnsupportedCell { cell: String, value: String },

    #[error("Expected {expected} serial(s), got {got}")]
    SerialCountMismatch { expected: usize, got: usize },

    #[error("Line index {index} out of range ({len} line(s))")]
    LineIndexOutOfRange { index: usize, len: usize },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl OrderError {
    /// Wrap any displayable failure as a file access error for `path`.
    pub fn file_access(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        OrderError::FileAccess {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Get the error class for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            OrderError::FileAccess { .. } => ErrorCode::FileAccess,
            OrderError::InvalidNumber { .. } => ErrorCode::InvalidNumber,
            OrderError::InvalidCommission { .. } => ErrorCode::InvalidInput,
            OrderError::SheetLayoutMismatch { .. } => ErrorCode::SheetLayoutMismatch,
            OrderError::DateParse { .. } => ErrorCode::DateParse,
            OrderError::InvalidPhone { .. } => ErrorCode::InvalidPhone,
            OrderError::UnsupportedCell { .. } => ErrorCode::SheetLayoutMismatch,
            OrderError::SerialCountMismatch { .. } => ErrorCode::InvalidInput,
            OrderError::LineIndexOutOfRange { .. } => ErrorCode::InvalidInput,
            OrderError::InvalidConfig { .. } => ErrorCode::InvalidInput,
            OrderError::Io(_) => ErrorCode::FileAccess,
        }
    }
}

/// Result type alias for order operations.
pub type Result<T> = std::result::Result<T, OrderError>;
