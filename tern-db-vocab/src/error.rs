//! Error types for tern-db-vocab

use thiserror::Error;

use crate::codebook::NUM_COMPRESSION_PREFIXES;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

/// Vocabulary error type
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error while reading or writing a vocabulary file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed on-disk vocabulary data
    #[error("invalid vocabulary file: {0}")]
    Format(String),

    /// Codebook capacity exceeded
    #[error("too many compression prefixes: {0} (max {NUM_COMPRESSION_PREFIXES})")]
    TooManyPrefixes(usize),
}

impl Error {
    /// Create a format error
    pub fn format(msg: impl Into<String>) -> Self {
        Error::Format(msg.into())
    }
}
