//! Error types for tern-db-sparql

use thiserror::Error;

/// Result type alias using our ParseError
pub type Result<T> = std::result::Result<T, ParseError>;

/// Failures raised by the post-parse passes.
///
/// All variants carry the offending substring; these errors are fatal to
/// the query and abort compilation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// `@lang@predicate` annotation without the second `@`
    #[error("language-tagged predicates must have the form @lang@predicate; second @ is missing in {0}")]
    MissingLanguageDelimiter(String),

    /// Alias without a space-padded `as` keyword
    #[error("alias ({0}) is malformed: keyword 'as' is missing or not surrounded by spaces")]
    MissingAsKeyword(String),

    /// Alias without an input variable
    #[error("alias ({0}) is malformed: no input variable given (e.g. COUNT(?a))")]
    MissingInputVariable(String),

    /// Alias body does not start with a known aggregate function
    #[error("unknown or malformed alias: ({0})")]
    UnknownAlias(String),

    /// Alias not enclosed in parentheses
    #[error("alias ({0}) is malformed: missing enclosing parentheses")]
    MissingParentheses(String),

    /// Two incompatible aliases bind the same output variable
    #[error("two aliases try to bind values to the variable {0}")]
    ConflictingAlias(String),
}
