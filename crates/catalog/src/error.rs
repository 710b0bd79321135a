//! Error types for the catalog crate.
//!
//! Rust error handling concepts demonstrated:
//! - thiserror for defining custom error types
//! - Enum variants for different error cases
//! - Error messages with context
//! - Automatic `Display` and `Error` trait implementations

use thiserror::Error;

/// Errors that can occur while loading and parsing the catalog sources.
///
/// A `LoadError` is fatal: the process must not serve any recommendation
/// endpoint over a partially loaded catalog.
#[derive(Error, Debug)]
pub enum LoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The header row lacks a column the engine needs
    #[error("Missing required column '{column}' in {file}")]
    MissingColumn { file: String, column: String },

    /// Line in a data file couldn't be parsed
    ///
    /// This variant stores context about where the error occurred
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, LoadError>;
