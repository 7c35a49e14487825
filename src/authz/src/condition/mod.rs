//! Access condition evaluation
//!
//! A [`Condition`] is a fixed set of independent clauses (MFA, verified
//! account, session age, locations, named IP groups). Evaluation is a pure,
//! total function of the condition, the request [`Lookup`](rubix_core::Lookup)
//! and an optional [`GroupResolver`] supplied by the caller.
//!
//! # Example
//!
//! ```rust
//! use rubix_authz::condition::{evaluate_condition, Condition};
//! use rubix_core::Lookup;
//! use std::collections::HashMap;
//!
//! let mut groups = HashMap::new();
//! groups.insert("office".to_string(), vec!["10.0.0.0/8".to_string()]);
//!
//! let condition = Condition::new().require_mfa().allow_ip_groups(["office"]);
//! let lookup = Lookup::new("ws", "alice")
//!     .with_mfa(true)
//!     .with_ip("10.5.3.1".parse().unwrap());
//!
//! assert!(evaluate_condition(&condition, &lookup, Some(&groups)));
//! ```

pub mod types;
pub mod matcher;
pub mod resolver;
pub mod evaluator;

#[cfg(test)]
mod tests;

pub use evaluator::{evaluate_condition, evaluate_condition_at};
pub use matcher::{ip_matches_any, ip_matches_entry};
pub use resolver::{collect_group_entries, GroupResolver};
pub use types::Condition;
