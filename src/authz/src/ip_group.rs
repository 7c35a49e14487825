//! Named IP groups
//!
//! A group is a curated or externally synchronized list of addresses and CIDR
//! ranges, referenced by identifier from [`Condition`](crate::condition::Condition)
//! clauses.

use crate::condition::GroupResolver;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Where a group's entries come from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpGroupSource {
    /// Entries maintained by hand
    #[default]
    Manual,
    /// Entries synchronized from an external URL
    External,
}

/// Named collection of network entries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IpGroup {
    pub workspace: String,
    pub id: String,
    pub name: String,
    pub description: String,
    pub source: IpGroupSource,

    /// Single addresses and CIDR ranges
    pub entries: Vec<String>,

    /// Sync source for external groups
    pub external_url: String,

    /// Path to the entry list within the external JSON document
    pub json_path: String,

    /// Last successful external sync
    pub last_synced: Option<DateTime<Utc>>,

    pub entry_count: usize,
}

impl IpGroup {
    /// Create a manual group
    pub fn new(workspace: impl Into<String>, id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            workspace: workspace.into(),
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_entries<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries = entries.into_iter().map(Into::into).collect();
        self.entry_count = self.entries.len();
        self
    }

    /// Apply a mutation payload
    pub fn apply(&mut self, payload: MutateIpGroup) {
        if let Some(name) = payload.name {
            self.name = name;
        }
        if let Some(description) = payload.description {
            self.description = description;
        }
        if let Some(source) = payload.source {
            self.source = source;
        }
        if let Some(entries) = payload.entries {
            self.entry_count = entries.len();
            self.entries = entries;
        }
        if let Some(url) = payload.external_url {
            self.external_url = url;
        }
        if let Some(path) = payload.json_path {
            self.json_path = path;
        }
        if let Some(synced) = payload.last_synced {
            self.last_synced = Some(synced);
        }
    }
}

/// Partial update of an [`IpGroup`]; unset fields are left alone
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutateIpGroup {
    pub name: Option<String>,
    pub description: Option<String>,
    pub source: Option<IpGroupSource>,
    pub entries: Option<Vec<String>>,
    pub external_url: Option<String>,
    pub json_path: Option<String>,
    pub last_synced: Option<DateTime<Utc>>,
}

impl MutateIpGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn source(mut self, source: IpGroupSource) -> Self {
        self.source = Some(source);
        self
    }

    pub fn entries<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries = Some(entries.into_iter().map(Into::into).collect());
        self
    }

    pub fn external_url(mut self, url: impl Into<String>) -> Self {
        self.external_url = Some(url.into());
        self
    }

    pub fn json_path(mut self, path: impl Into<String>) -> Self {
        self.json_path = Some(path.into());
        self
    }

    pub fn last_synced(mut self, at: DateTime<Utc>) -> Self {
        self.last_synced = Some(at);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Point-in-time copy of a workspace's groups, usable as a [`GroupResolver`]
#[derive(Debug, Clone, Default)]
pub struct IpGroupSnapshot {
    groups: HashMap<String, Vec<String>>,
}

impl IpGroupSnapshot {
    pub fn new<I: IntoIterator<Item = IpGroup>>(groups: I) -> Self {
        Self {
            groups: groups.into_iter().map(|g| (g.id, g.entries)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl GroupResolver for IpGroupSnapshot {
    fn entries(&self, group_id: &str) -> Option<Vec<String>> {
        self.groups.get(group_id).cloned()
    }
}
