/*!
 * Error types for the yavat application.
 *
 * This module contains custom error types for different parts of the
 * application, using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when working with the label registry
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    /// Removal was requested for a label the registry does not know.
    ///
    /// The registry is strict here; callers that want lenient removal
    /// check existence first (see `AnnotationSession::remove_label`).
    #[error("unknown label: {0}")]
    LabelNotFound(String),
}

/// Errors that can occur when mutating the interval store
#[derive(Error, Debug, PartialEq, Eq)]
pub enum StoreError {
    /// A row index was outside the current mark table
    #[error("row {index} out of range (store has {len} rows)")]
    RowOutOfRange {
        /// Requested row index
        index: usize,
        /// Current number of rows
        len: usize,
    },
}

/// Errors raised at the CSV-shaped import/export boundary
#[derive(Error, Debug)]
pub enum InterchangeError {
    /// A delimited record had fewer fields than the row shape requires
    #[error("record has {found} fields, expected at least {expected}: {record}")]
    MissingFields {
        /// Fields found in the record
        found: usize,
        /// Minimum fields for the row shape
        expected: usize,
        /// Offending record text
        record: String,
    },

    /// A quoted field was never closed
    #[error("unterminated quoted field in record: {0}")]
    UnterminatedQuote(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the label registry
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Error from the interval store
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Error at the import/export boundary
    #[error("Interchange error: {0}")]
    Interchange(#[from] InterchangeError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
