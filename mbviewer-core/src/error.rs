//! Error types for mbviewer

use thiserror::Error;

/// Main error type for mbviewer operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Visualization error: {0}")]
    Visualization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Result type alias for mbviewer operations
pub type Result<T> = std::result::Result<T, Error>;
