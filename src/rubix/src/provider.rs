//! Storage provider loading
//!
//! A provider bundles every storage collaborator the engines consume. The
//! loader picks an implementation by its provider key and hands it the
//! provider-specific configuration table.

use crate::config::{MemoryProviderConfig, StorageSection};
use anyhow::{Context, Result};
use rubix_authz::store::{CandidateRowSource, IpGroupStore, MemoryIpGroupStore, MemoryRoleStore, RoleStore};
use rubix_authz::{EngineConfig, PermissionEngine, PermissionStatement};
use rubix_core::Lookup;
use rubix_presence::{MemoryPresenceStore, PresenceStore};
use std::sync::Arc;
use tracing::info;

/// Provider key of the in-memory backend
pub const MEMORY_PROVIDER: &str = "memory";

/// Loaded storage collaborators
pub struct Provider {
    pub name: String,
    pub roles: Arc<dyn RoleStore>,
    pub rows: Arc<dyn CandidateRowSource>,
    pub ip_groups: Arc<dyn IpGroupStore>,
    pub presence: Arc<dyn PresenceStore>,
    engine: PermissionEngine,
}

impl Provider {
    /// Permission engine wired to this provider's stores
    pub fn engine(&self) -> &PermissionEngine {
        &self.engine
    }

    pub async fn get_permission_statements(
        &self,
        lookup: &Lookup,
        permissions: &[String],
    ) -> rubix_authz::Result<Vec<PermissionStatement>> {
        self.engine.permission_statements(lookup, permissions).await
    }

    /// True when every key resolves to an allow; an empty list is allowed
    pub async fn user_has_permission(&self, lookup: &Lookup, permissions: &[String]) -> rubix_authz::Result<bool> {
        self.engine.has_permission(lookup, permissions).await
    }
}

/// Build the provider named by `section.provider`
pub fn load_provider(section: &StorageSection) -> Result<Provider> {
    match section.provider.as_str() {
        MEMORY_PROVIDER => memory_provider(section),
        other => anyhow::bail!("unable to load storage provider '{}'", other),
    }
}

fn memory_provider(section: &StorageSection) -> Result<Provider> {
    let config: MemoryProviderConfig = toml::Value::Table(section.configuration.clone())
        .try_into()
        .context("Invalid memory provider configuration")?;

    let roles = Arc::new(MemoryRoleStore::new());
    let ip_groups = Arc::new(MemoryIpGroupStore::new());
    let rows: Arc<dyn CandidateRowSource> = roles.clone();

    let engine = PermissionEngine::new(
        EngineConfig {
            enable_metrics: config.enable_metrics,
        },
        rows.clone(),
    )
    .with_ip_groups(ip_groups.clone());

    info!(provider = MEMORY_PROVIDER, metrics = config.enable_metrics, "storage provider loaded");

    Ok(Provider {
        name: MEMORY_PROVIDER.to_string(),
        roles,
        rows,
        ip_groups,
        presence: Arc::new(MemoryPresenceStore::new()),
        engine,
    })
}
