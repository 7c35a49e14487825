//! Shared types for the Rubix platform

pub mod lookup;

pub use lookup::{GlobalAppId, Lookup};

/// Workspace (tenant) identifier
pub type WorkspaceId = String;

/// User identifier
pub type UserId = String;

/// Role identifier, unique within a workspace
pub type RoleId = String;
