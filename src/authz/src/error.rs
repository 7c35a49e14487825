//! Error types for the authorization crate

use rubix_core::StoreError;
use thiserror::Error;

/// Authorization errors
#[derive(Debug, Error)]
pub enum AuthzError {
    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Storage collaborator failure
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthzError {
    /// Whether retrying the call unchanged may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, AuthzError::Store(err) if err.is_retryable())
    }
}

/// Result type for authorization operations
pub type Result<T> = std::result::Result<T, AuthzError>;
