// this_file: src/error.rs
//! Error types for the imgdiff library

use thiserror::Error;

/// Main error type for imgdiff operations
#[derive(Debug, Error)]
pub enum Error {
    /// Image file loading, decoding or encoding error
    #[error("Image error: {0}")]
    Image(String),

    /// IO operation error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON report serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Caller precondition violation (malformed configuration, degenerate input)
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type alias for imgdiff operations
pub type Result<T> = std::result::Result<T, Error>;
