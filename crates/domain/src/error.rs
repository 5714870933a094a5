//! Repository error types.

use thiserror::Error;

/// Failure outcome of a repository operation.
///
/// Every variant carries a single human-readable message. The kind only
/// decides how callers report the failure; it is not a retry hint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// The input was rejected before or by the store (bad id, blank name,
    /// empty order, foreign key violation).
    #[error("{0}")]
    Invalid(String),

    /// The targeted row, or a row it references, does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The store itself failed.
    #[error("{0}")]
    Store(String),
}

impl RepositoryError {
    pub fn invalid(message: impl Into<String>) -> Self {
        RepositoryError::Invalid(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        RepositoryError::NotFound(message.into())
    }

    pub fn store(message: impl Into<String>) -> Self {
        RepositoryError::Store(message.into())
    }

    /// Returns the message carried by the error.
    pub fn message(&self) -> &str {
        match self {
            RepositoryError::Invalid(msg)
            | RepositoryError::NotFound(msg)
            | RepositoryError::Store(msg) => msg,
        }
    }

    /// Returns true if the error reports a missing row.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RepositoryError::NotFound(_))
    }
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;
