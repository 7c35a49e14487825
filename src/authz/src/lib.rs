//! # Rubix Authorization
//!
//! Decides whether a principal may act in a workspace.
//!
//! - **Conditions**: MFA, verified account, session age, location and named
//!   IP group clauses evaluated against a per-request [`Lookup`](rubix_core::Lookup)
//! - **Permission statements**: deny-wins aggregation of the grants held
//!   through a user's roles, gated by each role's condition
//! - **Decisions**: every requested key must resolve to an allow
//!
//! ## Example
//!
//! ```rust
//! use rubix_authz::{has_all_permissions, CandidateRow, Condition};
//! use rubix_core::Lookup;
//!
//! let rows = vec![
//!     CandidateRow::allow("docs.read"),
//!     CandidateRow::allow("docs.write").with_condition(Condition::new().require_mfa()),
//! ];
//! let lookup = Lookup::new("ws-1", "alice");
//!
//! assert!(has_all_permissions(&rows, &lookup, None, &["docs.read"]));
//! assert!(!has_all_permissions(&rows, &lookup, None, &["docs.read", "docs.write"]));
//! ```

pub mod condition;
pub mod engine;
pub mod error;
pub mod ip_group;
pub mod permission;
pub mod role;
pub mod store;

// Re-export commonly used types
pub use condition::{evaluate_condition, Condition, GroupResolver};
pub use engine::{has_all_permissions, EngineConfig, PermissionEngine};
pub use error::{AuthzError, Result};
pub use ip_group::{IpGroup, IpGroupSnapshot, IpGroupSource, MutateIpGroup};
pub use permission::{resolve_permissions, CandidateRow, Effect, PermissionStatement};
pub use role::{MutateRole, PermissionOptions, Role, RolePermission, UserRole};
pub use store::{CandidateRowSource, IpGroupStore, MemoryIpGroupStore, MemoryRoleStore, RoleStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
