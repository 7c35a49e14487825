//! Access decisions over resolved statements

use crate::condition::GroupResolver;
use crate::permission::{resolve_permissions_at, CandidateRow, Effect, PermissionStatement};
use chrono::{DateTime, Utc};
use rubix_core::Lookup;
use std::collections::HashMap;

/// True when every required key has an allow statement.
///
/// A missing key or a deny for any key refuses the whole request. An empty
/// requirement list is trivially satisfied.
pub fn statements_grant_all<S: AsRef<str>>(statements: &[PermissionStatement], required: &[S]) -> bool {
    let effects: HashMap<&str, Effect> = statements
        .iter()
        .map(|s| (s.permission.as_str(), s.effect))
        .collect();

    required
        .iter()
        .all(|key| effects.get(key.as_ref()) == Some(&Effect::Allow))
}

/// Resolve `rows` and require an allow for every key in `required`
pub fn has_all_permissions<S: AsRef<str>>(
    rows: &[CandidateRow],
    lookup: &Lookup,
    resolver: Option<&dyn GroupResolver>,
    required: &[S],
) -> bool {
    has_all_permissions_at(rows, lookup, resolver, required, Utc::now())
}

/// [`has_all_permissions`] with condition time fixed at `now`
pub fn has_all_permissions_at<S: AsRef<str>>(
    rows: &[CandidateRow],
    lookup: &Lookup,
    resolver: Option<&dyn GroupResolver>,
    required: &[S],
    now: DateTime<Utc>,
) -> bool {
    if required.is_empty() {
        return true;
    }
    let statements = resolve_permissions_at(rows, lookup, resolver, now);
    statements_grant_all(&statements, required)
}
