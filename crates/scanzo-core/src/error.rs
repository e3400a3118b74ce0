//! Error types for the scanzo-core library.

use thiserror::Error;

/// Main error type for the scanzo library.
#[derive(Error, Debug)]
pub enum ScanzoError {
    /// Receipt extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to receipt field extraction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// A numeric substring could not be read as an amount or a rate.
    ///
    /// Rules catch this locally and skip the offending match.
    #[error("not a number: {0:?}")]
    NotANumber(String),

    /// No rule produced a candidate reading of the text.
    #[error("no financial data found")]
    NoCandidates,
}

/// Result type for the scanzo library.
pub type Result<T> = std::result::Result<T, ScanzoError>;
