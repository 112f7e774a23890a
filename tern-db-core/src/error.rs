//! Error types for tern-db-core

use thiserror::Error;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Query was cancelled by the executor
    #[error("operation cancelled")]
    Cancelled,

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }
}
