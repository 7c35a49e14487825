//! Permission statement resolution
//!
//! Turns the candidate rows held by a user's roles into one allow or deny
//! statement per permission key.

pub mod types;
pub mod resolver;

pub use resolver::{resolve_permissions, resolve_permissions_at};
pub use types::{merge_options, CandidateRow, Effect, PermissionStatement};
