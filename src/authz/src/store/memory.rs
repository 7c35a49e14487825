//! In-memory role store
//!
//! Keeps roles, memberships and permission rows in separate tables, the way
//! a relational backend would, so role loads and mutations are assembled
//! from independent sub-operations.

use super::{require_id, CandidateRowSource, RoleStore};
use crate::condition::Condition;
use crate::permission::CandidateRow;
use crate::role::{MutateRole, Role, RolePermission, UserRole};
use async_trait::async_trait;
use rubix_core::{Lookup, StoreError, StoreResult};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// (workspace, role)
type RoleKey = (String, String);

/// (workspace, role, permission, resource)
type PermissionKey = (String, String, String, String);

#[derive(Debug, Clone, Default)]
struct RoleRecord {
    name: String,
    description: String,
    condition: Condition,
}

/// In-memory [`RoleStore`] and [`CandidateRowSource`]
#[derive(Default)]
pub struct MemoryRoleStore {
    roles: RwLock<BTreeMap<RoleKey, RoleRecord>>,
    members: RwLock<BTreeSet<UserRole>>,
    permissions: RwLock<BTreeMap<PermissionKey, RolePermission>>,
}

impl MemoryRoleStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn ensure_role(&self, workspace: &str, role: &str) -> StoreResult<()> {
        let roles = self.roles.read().await;
        if roles.contains_key(&(workspace.to_string(), role.to_string())) {
            Ok(())
        } else {
            Err(StoreError::NoResult)
        }
    }

    async fn update_metadata(&self, workspace: &str, role: &str, mutation: &MutateRole) -> StoreResult<()> {
        if !mutation.touches_metadata() {
            return Ok(());
        }

        let mut roles = self.roles.write().await;
        let record = roles
            .get_mut(&(workspace.to_string(), role.to_string()))
            .ok_or(StoreError::NoResult)?;

        if let Some(name) = &mutation.name {
            record.name = name.clone();
        }
        if let Some(description) = &mutation.description {
            record.description = description.clone();
        }
        if let Some(condition) = &mutation.condition {
            record.condition = condition.clone();
        }
        Ok(())
    }

    async fn add_members(&self, workspace: &str, role: &str, users: &[String]) -> StoreResult<()> {
        for user in users {
            require_id("user", user)?;
            self.ensure_role(workspace, role).await?;

            let membership = UserRole {
                workspace: workspace.to_string(),
                user: user.clone(),
                role: role.to_string(),
            };
            // Already a member is a no-op
            self.members.write().await.insert(membership);
        }
        Ok(())
    }

    async fn remove_members(&self, workspace: &str, role: &str, users: &[String]) -> StoreResult<()> {
        for user in users {
            self.members.write().await.remove(&UserRole {
                workspace: workspace.to_string(),
                user: user.clone(),
                role: role.to_string(),
            });
        }
        Ok(())
    }

    async fn add_permissions(&self, workspace: &str, role: &str, permissions: &[RolePermission]) -> StoreResult<()> {
        for permission in permissions {
            require_id("permission", &permission.permission)?;
            self.ensure_role(workspace, role).await?;

            let key = (
                workspace.to_string(),
                role.to_string(),
                permission.permission.clone(),
                permission.resource.clone(),
            );
            let mut table = self.permissions.write().await;
            // Already granted is a no-op
            table.entry(key).or_insert_with(|| RolePermission {
                workspace: workspace.to_string(),
                role: role.to_string(),
                ..permission.clone()
            });
        }
        Ok(())
    }

    async fn remove_permissions(&self, workspace: &str, role: &str, permissions: &[String]) -> StoreResult<()> {
        for permission in permissions {
            self.permissions.write().await.retain(|(ws, r, p, _), _| {
                !(ws == workspace && r == role && p == permission)
            });
        }
        Ok(())
    }

    async fn add_user_roles(&self, workspace: &str, user: &str, roles: &[String]) -> StoreResult<()> {
        let users = [user.to_string()];
        for role in roles {
            self.add_members(workspace, role, &users).await?;
        }
        Ok(())
    }

    async fn remove_user_roles(&self, workspace: &str, user: &str, roles: &[String]) -> StoreResult<()> {
        let users = [user.to_string()];
        for role in roles {
            self.remove_members(workspace, role, &users).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl RoleStore for MemoryRoleStore {
    async fn create_role(
        &self,
        workspace: &str,
        role: &str,
        name: &str,
        description: &str,
        permissions: Vec<RolePermission>,
        users: Vec<String>,
    ) -> StoreResult<()> {
        require_id("workspace", workspace)?;
        require_id("role", role)?;

        {
            let mut roles = self.roles.write().await;
            let key = (workspace.to_string(), role.to_string());
            if roles.contains_key(&key) {
                return Err(StoreError::AlreadyExists(format!("role {}", role)));
            }
            roles.insert(
                key,
                RoleRecord {
                    name: name.to_string(),
                    description: description.to_string(),
                    condition: Condition::default(),
                },
            );
        }

        info!(workspace, role, "role created");

        self.mutate_role(
            workspace,
            role,
            MutateRole::new().add_users(users).add_permissions(permissions),
        )
        .await
    }

    async fn get_role(&self, workspace: &str, role: &str) -> StoreResult<Role> {
        let metadata = async {
            let roles = self.roles.read().await;
            roles
                .get(&(workspace.to_string(), role.to_string()))
                .cloned()
                .ok_or(StoreError::NoResult)
        };

        let users = async {
            let members = self.members.read().await;
            Ok::<_, StoreError>(
                members
                    .iter()
                    .filter(|m| m.workspace == workspace && m.role == role)
                    .map(|m| m.user.clone())
                    .collect::<Vec<_>>(),
            )
        };

        let permissions = async {
            let table = self.permissions.read().await;
            Ok::<_, StoreError>(
                table
                    .iter()
                    .filter(|((ws, r, _, _), _)| ws == workspace && r == role)
                    .map(|(_, permission)| permission.clone())
                    .collect::<Vec<_>>(),
            )
        };

        let (record, users, permissions) = tokio::try_join!(metadata, users, permissions)?;

        Ok(Role {
            workspace: workspace.to_string(),
            id: role.to_string(),
            name: record.name,
            description: record.description,
            users,
            permissions,
            condition: record.condition,
        })
    }

    async fn get_roles(&self, workspace: &str) -> StoreResult<Vec<Role>> {
        let roles = self.roles.read().await;
        let mut listed: Vec<Role> = roles
            .iter()
            .filter(|((ws, _), _)| ws == workspace)
            .map(|((ws, id), record)| Role {
                workspace: ws.clone(),
                id: id.clone(),
                name: record.name.clone(),
                description: record.description.clone(),
                condition: record.condition.clone(),
                ..Default::default()
            })
            .collect();
        listed.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(listed)
    }

    async fn get_user_roles(&self, workspace: &str, user: &str) -> StoreResult<Vec<UserRole>> {
        let members = self.members.read().await;
        Ok(members
            .iter()
            .filter(|m| m.workspace == workspace && m.user == user)
            .cloned()
            .collect())
    }

    async fn delete_role(&self, workspace: &str, role: &str) -> StoreResult<()> {
        let removed = self
            .roles
            .write()
            .await
            .remove(&(workspace.to_string(), role.to_string()));
        if removed.is_none() {
            return Err(StoreError::NoResult);
        }

        self.members
            .write()
            .await
            .retain(|m| !(m.workspace == workspace && m.role == role));
        self.permissions
            .write()
            .await
            .retain(|(ws, r, _, _), _| !(ws == workspace && r == role));

        info!(workspace, role, "role deleted");
        Ok(())
    }

    async fn mutate_role(&self, workspace: &str, role: &str, mutation: MutateRole) -> StoreResult<()> {
        if mutation.is_empty() {
            return Ok(());
        }

        let (metadata, added_users, removed_users, added_permissions, removed_permissions) = futures::join!(
            self.update_metadata(workspace, role, &mutation),
            self.add_members(workspace, role, &mutation.users_to_add),
            self.remove_members(workspace, role, &mutation.users_to_remove),
            self.add_permissions(workspace, role, &mutation.permissions_to_add),
            self.remove_permissions(workspace, role, &mutation.permissions_to_remove),
        );

        debug!(workspace, role, "role mutation applied");

        metadata
            .and(added_users)
            .and(removed_users)
            .and(added_permissions)
            .and(removed_permissions)
    }

    async fn mutate_user_roles(
        &self,
        workspace: &str,
        user: &str,
        roles_to_add: Vec<String>,
        roles_to_remove: Vec<String>,
    ) -> StoreResult<()> {
        let (added, removed) = futures::join!(
            self.add_user_roles(workspace, user, &roles_to_add),
            self.remove_user_roles(workspace, user, &roles_to_remove),
        );
        added.and(removed)
    }
}

#[async_trait]
impl CandidateRowSource for MemoryRoleStore {
    async fn candidate_rows(&self, lookup: &Lookup, permissions: &[String]) -> StoreResult<Vec<CandidateRow>> {
        if permissions.is_empty() {
            return Ok(Vec::new());
        }

        let wanted: HashSet<&str> = permissions.iter().map(String::as_str).collect();

        let held: Vec<String> = {
            let members = self.members.read().await;
            members
                .iter()
                .filter(|m| m.workspace == lookup.workspace && m.user == lookup.user)
                .map(|m| m.role.clone())
                .collect()
        };

        let roles = self.roles.read().await;
        let table = self.permissions.read().await;

        let mut rows = Vec::new();
        for role in &held {
            let Some(record) = roles.get(&(lookup.workspace.clone(), role.clone())) else {
                continue;
            };

            rows.extend(
                table
                    .iter()
                    .filter(|((ws, r, p, resource), _)| {
                        ws == &lookup.workspace
                            && r == role
                            && resource.is_empty()
                            && wanted.contains(p.as_str())
                    })
                    .map(|(_, permission)| CandidateRow::from_role_permission(permission, &record.condition)),
            );
        }

        debug!(lookup = %lookup, roles = held.len(), rows = rows.len(), "loaded candidate rows");
        Ok(rows)
    }
}
