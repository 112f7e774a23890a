//! Error types for tern-db-query

use thiserror::Error;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

/// Query operator error type
#[derive(Error, Debug)]
pub enum Error {
    /// Query was cancelled by the executor
    #[error("operation cancelled")]
    Cancelled,

    /// A side of a transitive path was bound twice
    #[error("transitive path side is already bound")]
    AlreadyBound,

    /// Malformed operator construction (bad column index, inverted bounds)
    #[error("invalid operator plan: {0}")]
    InvalidPlan(String),
}

impl Error {
    /// Create an invalid-plan error
    pub fn invalid_plan(msg: impl Into<String>) -> Self {
        Error::InvalidPlan(msg.into())
    }
}

impl From<tern_db_core::Error> for Error {
    fn from(e: tern_db_core::Error) -> Self {
        match e {
            tern_db_core::Error::Cancelled => Error::Cancelled,
            tern_db_core::Error::Other(msg) => Error::InvalidPlan(msg),
        }
    }
}
