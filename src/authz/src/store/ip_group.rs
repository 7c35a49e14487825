//! In-memory named IP group store

use super::{require_id, IpGroupStore};
use crate::ip_group::{IpGroup, IpGroupSnapshot, MutateIpGroup};
use async_trait::async_trait;
use rubix_core::{StoreError, StoreResult};
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

/// In-memory [`IpGroupStore`]
#[derive(Default)]
pub struct MemoryIpGroupStore {
    groups: RwLock<BTreeMap<(String, String), IpGroup>>,
}

impl MemoryIpGroupStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn key(workspace: &str, id: &str) -> (String, String) {
    (workspace.to_string(), id.to_string())
}

#[async_trait]
impl IpGroupStore for MemoryIpGroupStore {
    async fn create_ip_group(&self, mut group: IpGroup) -> StoreResult<IpGroup> {
        require_id("workspace", &group.workspace)?;
        if group.id.is_empty() {
            group.id = Uuid::new_v4().to_string();
        }
        group.entry_count = group.entries.len();

        let mut groups = self.groups.write().await;
        let k = key(&group.workspace, &group.id);
        if groups.contains_key(&k) {
            return Err(StoreError::AlreadyExists(format!("ip group {}", group.id)));
        }
        groups.insert(k, group.clone());

        info!(workspace = %group.workspace, id = %group.id, entries = group.entry_count, "ip group created");
        Ok(group)
    }

    async fn get_ip_group(&self, workspace: &str, id: &str) -> StoreResult<IpGroup> {
        self.groups
            .read()
            .await
            .get(&key(workspace, id))
            .cloned()
            .ok_or(StoreError::NoResult)
    }

    async fn get_ip_groups(&self, workspace: &str) -> StoreResult<Vec<IpGroup>> {
        let groups = self.groups.read().await;
        let mut listed: Vec<IpGroup> = groups
            .values()
            .filter(|g| g.workspace == workspace)
            .cloned()
            .collect();
        listed.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(listed)
    }

    async fn mutate_ip_group(&self, workspace: &str, id: &str, mutation: MutateIpGroup) -> StoreResult<()> {
        if mutation.is_empty() {
            return Ok(());
        }

        let mut groups = self.groups.write().await;
        let group = groups.get_mut(&key(workspace, id)).ok_or(StoreError::NoResult)?;
        group.apply(mutation);

        debug!(workspace, id, entries = group.entry_count, "ip group updated");
        Ok(())
    }

    async fn delete_ip_group(&self, workspace: &str, id: &str) -> StoreResult<()> {
        self.groups
            .write()
            .await
            .remove(&key(workspace, id))
            .map(|_| ())
            .ok_or(StoreError::NoResult)
    }

    async fn resolver(&self, workspace: &str) -> StoreResult<IpGroupSnapshot> {
        let groups = self.groups.read().await;
        Ok(IpGroupSnapshot::new(
            groups.values().filter(|g| g.workspace == workspace).cloned(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::GroupResolver;

    #[tokio::test]
    async fn test_create_assigns_id() {
        let store = MemoryIpGroupStore::new();
        let created = store
            .create_ip_group(IpGroup::new("ws", "", "Office").with_entries(["10.0.0.0/8"]))
            .await
            .unwrap();

        assert!(!created.id.is_empty());
        assert_eq!(store.get_ip_group("ws", &created.id).await.unwrap().name, "Office");
    }

    #[tokio::test]
    async fn test_mutate_and_resolve() {
        let store = MemoryIpGroupStore::new();
        store
            .create_ip_group(IpGroup::new("ws", "vpn", "VPN").with_entries(["1.1.1.1"]))
            .await
            .unwrap();
        store
            .create_ip_group(IpGroup::new("other", "vpn", "Other VPN").with_entries(["2.2.2.2"]))
            .await
            .unwrap();

        store
            .mutate_ip_group("ws", "vpn", MutateIpGroup::new().entries(["1.1.1.1", "1.1.1.2"]))
            .await
            .unwrap();

        let snapshot = store.resolver("ws").await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.entries("vpn").unwrap().len(), 2);
        assert_eq!(store.get_ip_group("ws", "vpn").await.unwrap().entry_count, 2);
    }

    #[tokio::test]
    async fn test_missing_group() {
        let store = MemoryIpGroupStore::new();
        assert_eq!(
            store.mutate_ip_group("ws", "nope", MutateIpGroup::new().name("x")).await.unwrap_err(),
            StoreError::NoResult
        );
        assert_eq!(store.delete_ip_group("ws", "nope").await.unwrap_err(), StoreError::NoResult);
    }
}
