//! Storage collaborator error classification
//!
//! Stores classify their failures so callers can decide what to do:
//! transient failures may be retried, missing entities are surfaced as
//! "no result", duplicate inserts never reach the caller.

use thiserror::Error;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors reported by storage collaborators
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Connection or availability failure; the caller may retry
    #[error("Transient storage error: {0}")]
    Transient(String),

    /// The referenced workspace, role or record does not exist
    #[error("No result found")]
    NoResult,

    /// A record with the same identity already exists
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// The request was rejected before reaching storage
    #[error("Invalid: {0}")]
    Invalid(String),

    /// Serialization of a stored representation failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Uncategorized storage failure
    #[error("Internal storage error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Create a transient error
    pub fn transient<S: Into<String>>(msg: S) -> Self {
        StoreError::Transient(msg.into())
    }

    /// Create an invalid-request error
    pub fn invalid<S: Into<String>>(msg: S) -> Self {
        StoreError::Invalid(msg.into())
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        StoreError::Internal(msg.into())
    }

    /// Whether the caller may retry the operation unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Transient(_))
    }

    /// Whether the failure means the referenced entity is absent
    pub fn is_no_result(&self) -> bool {
        matches!(self, StoreError::NoResult)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}
