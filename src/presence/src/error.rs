//! Error types for presence operations

use rubix_core::StoreError;
use thiserror::Error;

/// Result type for presence operations
pub type Result<T> = std::result::Result<T, PresenceError>;

/// Presence errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PresenceError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl PresenceError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, PresenceError::Store(err) if err.is_retryable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_only_for_transient_store_errors() {
        assert!(PresenceError::from(StoreError::transient("connection reset")).is_retryable());
        assert!(!PresenceError::from(StoreError::NoResult).is_retryable());
        assert!(!PresenceError::InvalidInput("id".into()).is_retryable());
    }
}
