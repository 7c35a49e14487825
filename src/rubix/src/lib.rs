//! # Rubix
//!
//! Wires the authorization and presence engines to a storage provider
//! chosen by configuration.
//!
//! ```rust,no_run
//! use rubix::{load_provider, telemetry, RubixConfig};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = RubixConfig::from_file("rubix.toml")?;
//! config.validate()?;
//! telemetry::init_tracing(&config.logging)?;
//!
//! let provider = load_provider(&config.storage)?;
//! # let _ = provider;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod provider;
pub mod telemetry;

pub use config::{LoggingSection, MemoryProviderConfig, RubixConfig, StorageSection};
pub use provider::{load_provider, Provider, MEMORY_PROVIDER};

pub use rubix_authz as authz;
pub use rubix_presence as presence;
