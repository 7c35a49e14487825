//! # Rubix Core
//!
//! Shared identifiers, the per-request context snapshot and the storage error
//! classification used by the authorization and presence crates.

pub mod types;
pub mod error;

// Re-export commonly used types
pub use error::{StoreError, StoreResult};
pub use types::{GlobalAppId, Lookup, RoleId, UserId, WorkspaceId};
