//! Named IP group resolution capability

use std::collections::HashMap;

/// Resolves a named IP group to its entries (addresses and CIDR ranges).
///
/// Supplied by the caller at evaluation time. Returns `None` for unknown groups.
pub trait GroupResolver: Send + Sync {
    fn entries(&self, group_id: &str) -> Option<Vec<String>>;
}

impl<F> GroupResolver for F
where
    F: Fn(&str) -> Option<Vec<String>> + Send + Sync,
{
    fn entries(&self, group_id: &str) -> Option<Vec<String>> {
        self(group_id)
    }
}

impl GroupResolver for HashMap<String, Vec<String>> {
    fn entries(&self, group_id: &str) -> Option<Vec<String>> {
        self.get(group_id).cloned()
    }
}

/// Flatten the entries of every listed group.
///
/// Without a resolver there are no entries, so group clauses do not constrain.
pub fn collect_group_entries(group_ids: &[String], resolver: Option<&dyn GroupResolver>) -> Vec<String> {
    let Some(resolver) = resolver else {
        return Vec::new();
    };

    group_ids
        .iter()
        .filter_map(|group_id| resolver.entries(group_id))
        .flatten()
        .collect()
}
