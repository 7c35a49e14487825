//! Roles and role permissions

use crate::condition::Condition;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Free-form per-permission option metadata, merged by key across roles
pub type PermissionOptions = BTreeMap<String, Vec<String>>;

/// Role within a workspace, carrying permissions and an access condition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Role {
    pub workspace: String,
    pub id: String,
    pub name: String,
    pub description: String,

    /// Member user IDs
    pub users: Vec<String>,

    /// Granted or denied permissions
    pub permissions: Vec<RolePermission>,

    /// Condition gating every allow granted by this role
    pub condition: Condition,
}

impl Role {
    pub fn new(workspace: impl Into<String>, id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            workspace: workspace.into(),
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Single permission row owned by a role
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RolePermission {
    pub workspace: String,
    pub role: String,

    /// Permission key
    pub permission: String,

    /// Resource scope; empty for workspace-wide permissions
    pub resource: String,

    /// Grant (true) or denial (false)
    pub allow: bool,

    pub options: PermissionOptions,
}

impl RolePermission {
    /// Workspace-wide grant of `permission`
    pub fn allow(permission: impl Into<String>) -> Self {
        Self {
            permission: permission.into(),
            allow: true,
            ..Default::default()
        }
    }

    /// Workspace-wide denial of `permission`
    pub fn deny(permission: impl Into<String>) -> Self {
        Self {
            permission: permission.into(),
            allow: false,
            ..Default::default()
        }
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = resource.into();
        self
    }

    pub fn with_option<I, S>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options
            .entry(key.into())
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }

    /// True for rows that apply to the whole workspace
    pub fn is_workspace_wide(&self) -> bool {
        self.resource.is_empty()
    }
}

/// Change set for a role.
///
/// Each list is applied by its own sub-operation; sub-operations run
/// concurrently and are not atomic with respect to each other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutateRole {
    pub name: Option<String>,
    pub description: Option<String>,

    /// Replaces the role's condition wholesale
    pub condition: Option<Condition>,

    pub users_to_add: Vec<String>,
    pub users_to_remove: Vec<String>,
    pub permissions_to_add: Vec<RolePermission>,

    /// Permission keys to remove
    pub permissions_to_remove: Vec<String>,
}

impl MutateRole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn add_users<I, S>(mut self, users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.users_to_add.extend(users.into_iter().map(Into::into));
        self
    }

    pub fn remove_users<I, S>(mut self, users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.users_to_remove.extend(users.into_iter().map(Into::into));
        self
    }

    pub fn add_permissions<I: IntoIterator<Item = RolePermission>>(mut self, permissions: I) -> Self {
        self.permissions_to_add.extend(permissions);
        self
    }

    pub fn remove_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions_to_remove.extend(permissions.into_iter().map(Into::into));
        self
    }

    /// True when the metadata row needs updating
    pub fn touches_metadata(&self) -> bool {
        self.name.is_some() || self.description.is_some() || self.condition.is_some()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Membership of a user in a role
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRole {
    pub workspace: String,
    pub user: String,
    pub role: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_builders() {
        let perm = RolePermission::allow("docs.read")
            .with_option("folders", ["a", "b"])
            .with_option("folders", ["c"]);

        assert!(perm.allow);
        assert!(perm.is_workspace_wide());
        assert_eq!(perm.options["folders"], vec!["a", "b", "c"]);

        let scoped = RolePermission::deny("docs.delete").with_resource("doc-1");
        assert!(!scoped.allow);
        assert!(!scoped.is_workspace_wide());
    }

    #[test]
    fn test_mutation_builder() {
        let mutation = MutateRole::new()
            .add_users(["alice", "bob"])
            .remove_permissions(["docs.delete"]);

        assert!(!mutation.touches_metadata());
        assert!(!mutation.is_empty());
        assert_eq!(mutation.users_to_add.len(), 2);

        assert!(MutateRole::new().condition(Condition::new().require_mfa()).touches_metadata());
        assert!(MutateRole::new().is_empty());
    }

    #[test]
    fn test_role_roundtrip_keeps_condition() {
        let mut role = Role::new("ws", "admins", "Admins");
        role.condition = Condition::new().require_mfa().allow_locations(["GB"]);

        let json = serde_json::to_string(&role).unwrap();
        let back: Role = serde_json::from_str(&json).unwrap();
        assert_eq!(back, role);
    }
}
