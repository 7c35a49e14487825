//! Decision counters for permission checks

use parking_lot::Mutex;
use std::time::Duration;

/// Snapshot of decision counters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecisionMetrics {
    /// Permission checks answered
    pub total_checks: u64,

    /// Checks that granted every requested key
    pub allowed: u64,

    /// Checks that were refused
    pub denied: u64,

    /// Statement resolutions (including those behind checks)
    pub resolutions: u64,

    /// Collaborator failures surfaced to callers
    pub errors: u64,

    /// Mean latency across recorded checks and resolutions
    pub avg_latency_ms: f64,
}

impl DecisionMetrics {
    /// Share of checks that were allowed
    pub fn allow_rate(&self) -> f64 {
        if self.total_checks == 0 {
            0.0
        } else {
            self.allowed as f64 / self.total_checks as f64
        }
    }
}

#[derive(Default)]
struct Inner {
    metrics: DecisionMetrics,
    latency_samples: u64,
    latency_total_ms: f64,
}

/// Thread-safe collector shared by a [`PermissionEngine`](super::PermissionEngine)
#[derive(Default)]
pub struct MetricsCollector {
    inner: Mutex<Inner>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of a permission check
    pub fn record_check(&self, allowed: bool) {
        let mut inner = self.inner.lock();
        inner.metrics.total_checks += 1;
        if allowed {
            inner.metrics.allowed += 1;
        } else {
            inner.metrics.denied += 1;
        }
    }

    pub fn record_resolution(&self) {
        self.inner.lock().metrics.resolutions += 1;
    }

    pub fn record_error(&self) {
        self.inner.lock().metrics.errors += 1;
    }

    pub fn record_latency(&self, latency: Duration) {
        let mut inner = self.inner.lock();
        inner.latency_samples += 1;
        inner.latency_total_ms += latency.as_secs_f64() * 1000.0;
        inner.metrics.avg_latency_ms = inner.latency_total_ms / inner.latency_samples as f64;
    }

    pub fn snapshot(&self) -> DecisionMetrics {
        self.inner.lock().metrics.clone()
    }

    pub fn reset(&self) {
        *self.inner.lock() = Inner::default();
    }

    /// Render counters in Prometheus text exposition format
    pub fn export_prometheus(&self) -> String {
        let metrics = self.snapshot();

        format!(
            r#"# HELP rubix_permission_checks_total Permission checks answered
# TYPE rubix_permission_checks_total counter
rubix_permission_checks_total {}

# HELP rubix_permission_allowed_total Checks granting every requested key
# TYPE rubix_permission_allowed_total counter
rubix_permission_allowed_total {}

# HELP rubix_permission_denied_total Checks refused
# TYPE rubix_permission_denied_total counter
rubix_permission_denied_total {}

# HELP rubix_permission_resolutions_total Statement resolutions
# TYPE rubix_permission_resolutions_total counter
rubix_permission_resolutions_total {}

# HELP rubix_permission_errors_total Storage failures surfaced
# TYPE rubix_permission_errors_total counter
rubix_permission_errors_total {}

# HELP rubix_permission_latency_seconds_avg Mean decision latency
# TYPE rubix_permission_latency_seconds_avg gauge
rubix_permission_latency_seconds_avg {}
"#,
            metrics.total_checks,
            metrics.allowed,
            metrics.denied,
            metrics.resolutions,
            metrics.errors,
            metrics.avg_latency_ms / 1000.0,
        )
    }
}
