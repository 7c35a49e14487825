//! Access decision facade
//!
//! Loads candidate rows and IP groups from the storage collaborators,
//! resolves statements and reduces them to a single decision.

pub mod decision;
pub mod metrics;

pub use decision::{has_all_permissions, has_all_permissions_at, statements_grant_all};
pub use metrics::{DecisionMetrics, MetricsCollector};

use crate::condition::GroupResolver;
use crate::error::Result;
use crate::ip_group::IpGroupSnapshot;
use crate::permission::{resolve_permissions, PermissionStatement};
use crate::store::{CandidateRowSource, IpGroupStore};
use rubix_core::Lookup;

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Collect decision counters
    pub enable_metrics: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enable_metrics: true,
        }
    }
}

/// Answers permission questions for a principal
///
/// ```text
/// Lookup → CandidateRowSource → Resolver (+ IP groups) → statements → decision
///                                                              ↓
///                                                          [Metrics]
/// ```
pub struct PermissionEngine {
    /// Source of role permission rows
    rows: Arc<dyn CandidateRowSource>,

    /// Named IP groups; without it group clauses do not constrain
    ip_groups: Option<Arc<dyn IpGroupStore>>,

    metrics: Option<Arc<MetricsCollector>>,

    config: EngineConfig,
}

impl PermissionEngine {
    pub fn new(config: EngineConfig, rows: Arc<dyn CandidateRowSource>) -> Self {
        let metrics = config
            .enable_metrics
            .then(|| Arc::new(MetricsCollector::new()));

        info!(metrics = config.enable_metrics, "PermissionEngine initialized");

        Self {
            rows,
            ip_groups: None,
            metrics,
            config,
        }
    }

    /// Resolve IP group clauses against `store`
    pub fn with_ip_groups(mut self, store: Arc<dyn IpGroupStore>) -> Self {
        self.ip_groups = Some(store);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Effective statements for the lookup's user over `permissions`
    pub async fn permission_statements(
        &self,
        lookup: &Lookup,
        permissions: &[String],
    ) -> Result<Vec<PermissionStatement>> {
        let start = Instant::now();
        let result = self.resolve(lookup, permissions).await;

        if let Some(metrics) = &self.metrics {
            metrics.record_resolution();
            metrics.record_latency(start.elapsed());
            if result.is_err() {
                metrics.record_error();
            }
        }

        result
    }

    /// True only when every key in `permissions` resolves to an allow
    pub async fn has_permission(&self, lookup: &Lookup, permissions: &[String]) -> Result<bool> {
        if permissions.is_empty() {
            return Ok(true);
        }

        let statements = match self.permission_statements(lookup, permissions).await {
            Ok(statements) => statements,
            Err(err) => {
                warn!(lookup = %lookup, error = %err, "permission check failed");
                return Err(err);
            }
        };

        let allowed = statements_grant_all(&statements, permissions);
        if let Some(metrics) = &self.metrics {
            metrics.record_check(allowed);
        }

        debug!(
            lookup = %lookup,
            permissions = ?permissions,
            decision = if allowed { "ALLOW" } else { "DENY" },
            "permission check"
        );

        Ok(allowed)
    }

    /// Decision counters, when enabled
    pub fn metrics(&self) -> Option<DecisionMetrics> {
        self.metrics.as_ref().map(|m| m.snapshot())
    }

    async fn resolve(&self, lookup: &Lookup, permissions: &[String]) -> Result<Vec<PermissionStatement>> {
        if permissions.is_empty() {
            return Ok(Vec::new());
        }

        let rows = self.rows.candidate_rows(lookup, permissions).await?;
        let groups = self.group_snapshot(&lookup.workspace).await?;
        let resolver = groups.as_ref().map(|g| g as &dyn GroupResolver);

        Ok(resolve_permissions(&rows, lookup, resolver))
    }

    async fn group_snapshot(&self, workspace: &str) -> Result<Option<IpGroupSnapshot>> {
        match &self.ip_groups {
            Some(store) => Ok(Some(store.resolver(workspace).await?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryRoleStore;

    #[tokio::test]
    async fn test_engine_creation() {
        let engine = PermissionEngine::new(EngineConfig::default(), Arc::new(MemoryRoleStore::new()));
        assert!(engine.metrics().is_some());

        let quiet = PermissionEngine::new(
            EngineConfig { enable_metrics: false },
            Arc::new(MemoryRoleStore::new()),
        );
        assert!(quiet.metrics().is_none());
    }

    #[tokio::test]
    async fn test_empty_request_is_allowed() {
        let engine = PermissionEngine::new(EngineConfig::default(), Arc::new(MemoryRoleStore::new()));
        assert!(engine.has_permission(&Lookup::new("ws", "u"), &[]).await.unwrap());
    }
}
