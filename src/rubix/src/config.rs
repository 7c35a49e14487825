//! Configuration loading and validation

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing_subscriber::EnvFilter;

use crate::provider::MEMORY_PROVIDER;

/// Complete configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RubixConfig {
    #[serde(default)]
    pub storage: StorageSection,

    #[serde(default)]
    pub logging: LoggingSection,
}

/// Storage provider selection
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSection {
    /// Provider key, e.g. `memory`
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Provider-specific settings, passed to the provider untouched
    #[serde(default)]
    pub configuration: toml::Table,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            configuration: toml::Table::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingSection {
    /// Filter directive; `RUST_LOG` takes precedence when set
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human readable output
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl RubixConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read configuration file {}", path.as_ref().display()))?;

        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Failed to parse configuration file")
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.storage.provider != MEMORY_PROVIDER {
            anyhow::bail!("Unknown storage provider '{}'", self.storage.provider);
        }

        EnvFilter::try_new(&self.logging.level)
            .with_context(|| format!("Invalid log level '{}'", self.logging.level))?;

        Ok(())
    }
}

fn default_provider() -> String {
    MEMORY_PROVIDER.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

/// Settings understood by the `memory` provider
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MemoryProviderConfig {
    /// Collect permission decision counters
    #[serde(default = "default_true")]
    pub enable_metrics: bool,
}

impl Default for MemoryProviderConfig {
    fn default() -> Self {
        Self { enable_metrics: true }
    }
}
