//! Storage collaborator contracts
//!
//! The engines never read storage themselves; these traits describe what a
//! backend must provide. Backends classify failures with [`StoreError`] and
//! swallow duplicate inserts.

pub mod memory;
pub mod ip_group;

pub use ip_group::MemoryIpGroupStore;
pub use memory::MemoryRoleStore;

use crate::ip_group::{IpGroup, IpGroupSnapshot, MutateIpGroup};
use crate::permission::CandidateRow;
use crate::role::{MutateRole, Role, RolePermission, UserRole};
use async_trait::async_trait;
use rubix_core::{Lookup, StoreError, StoreResult};

/// Supplies the rows a permission decision is made from
#[async_trait]
pub trait CandidateRowSource: Send + Sync {
    /// Workspace-wide rows for `permissions` held by the lookup's user, each
    /// joined with its role's condition. Returns the full set at once.
    async fn candidate_rows(&self, lookup: &Lookup, permissions: &[String]) -> StoreResult<Vec<CandidateRow>>;
}

/// Role persistence
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Create a role with initial permissions and members
    async fn create_role(
        &self,
        workspace: &str,
        role: &str,
        name: &str,
        description: &str,
        permissions: Vec<RolePermission>,
        users: Vec<String>,
    ) -> StoreResult<()>;

    /// Load a role with its members and permission rows
    async fn get_role(&self, workspace: &str, role: &str) -> StoreResult<Role>;

    /// List role metadata ordered by name
    async fn get_roles(&self, workspace: &str) -> StoreResult<Vec<Role>>;

    /// Roles held by a user
    async fn get_user_roles(&self, workspace: &str, user: &str) -> StoreResult<Vec<UserRole>>;

    async fn delete_role(&self, workspace: &str, role: &str) -> StoreResult<()>;

    /// Apply a change set; see [`MutateRole`] for atomicity
    async fn mutate_role(&self, workspace: &str, role: &str, mutation: MutateRole) -> StoreResult<()>;

    /// Add and remove role memberships for one user
    async fn mutate_user_roles(
        &self,
        workspace: &str,
        user: &str,
        roles_to_add: Vec<String>,
        roles_to_remove: Vec<String>,
    ) -> StoreResult<()>;
}

/// Named IP group persistence
#[async_trait]
pub trait IpGroupStore: Send + Sync {
    /// Store a new group, assigning an identifier when none is set
    async fn create_ip_group(&self, group: IpGroup) -> StoreResult<IpGroup>;

    async fn get_ip_group(&self, workspace: &str, id: &str) -> StoreResult<IpGroup>;

    async fn get_ip_groups(&self, workspace: &str) -> StoreResult<Vec<IpGroup>>;

    async fn mutate_ip_group(&self, workspace: &str, id: &str, mutation: MutateIpGroup) -> StoreResult<()>;

    async fn delete_ip_group(&self, workspace: &str, id: &str) -> StoreResult<()>;

    /// Snapshot of a workspace's groups for condition evaluation
    async fn resolver(&self, workspace: &str) -> StoreResult<IpGroupSnapshot>;
}

/// Reject empty identifiers before touching storage
pub(crate) fn require_id(kind: &str, value: &str) -> StoreResult<()> {
    if value.is_empty() {
        return Err(StoreError::invalid(format!("{} is required", kind)));
    }
    Ok(())
}
