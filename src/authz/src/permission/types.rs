//! Permission statement types

use crate::condition::Condition;
use crate::role::{PermissionOptions, RolePermission};
use serde::{Deserialize, Serialize};

/// Outcome of a permission statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    Allow,
    Deny,
}

impl Effect {
    pub fn from_allow(allow: bool) -> Self {
        if allow {
            Effect::Allow
        } else {
            Effect::Deny
        }
    }

    /// Restrictiveness rank; a deny outranks an allow
    fn rank(self) -> u8 {
        match self {
            Effect::Allow => 0,
            Effect::Deny => 1,
        }
    }

    /// True when `self` should replace `other` during aggregation
    pub fn is_more_restrictive_than(self, other: Effect) -> bool {
        self.rank() > other.rank()
    }
}

/// One role permission row joined with its owning role's condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRow {
    pub permission: String,

    #[serde(default)]
    pub resource: String,

    pub allow: bool,

    /// Condition of the role granting this row
    #[serde(default)]
    pub condition: Condition,

    #[serde(default)]
    pub options: PermissionOptions,
}

impl CandidateRow {
    pub fn allow(permission: impl Into<String>) -> Self {
        Self {
            permission: permission.into(),
            resource: String::new(),
            allow: true,
            condition: Condition::default(),
            options: PermissionOptions::new(),
        }
    }

    pub fn deny(permission: impl Into<String>) -> Self {
        Self {
            allow: false,
            ..Self::allow(permission)
        }
    }

    /// Join a role permission with its role's condition
    pub fn from_role_permission(permission: &RolePermission, condition: &Condition) -> Self {
        Self {
            permission: permission.permission.clone(),
            resource: permission.resource.clone(),
            allow: permission.allow,
            condition: condition.clone(),
            options: permission.options.clone(),
        }
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = condition;
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

    pub fn effect(&self) -> Effect {
        Effect::from_allow(self.allow)
    }
}

/// Resolved decision for a single permission key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionStatement {
    pub permission: String,
    pub effect: Effect,

    #[serde(default)]
    pub options: PermissionOptions,
}

impl PermissionStatement {
    pub fn is_allow(&self) -> bool {
        self.effect == Effect::Allow
    }
}

/// Merge option lists by key, concatenating values without deduplication
pub fn merge_options(into: &mut PermissionOptions, from: &PermissionOptions) {
    for (key, values) in from {
        into.entry(key.clone()).or_default().extend(values.iter().cloned());
    }
}
