//! Aggregation of candidate rows into permission statements
//!
//! Rows arrive from a join whose order is unspecified, so aggregation is a
//! fold keyed by permission: a row replaces the accumulated entry only if it
//! is strictly more restrictive, rows with the same effect are merged, and an
//! allow never weakens a denied key. Conditions are checked after the fold
//! and only gate allows.

use super::types::{merge_options, CandidateRow, Effect, PermissionStatement};
use crate::condition::{evaluate_condition_at, GroupResolver};
use crate::role::PermissionOptions;
use chrono::{DateTime, Utc};
use rubix_core::Lookup;
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Accumulated state for one permission key
struct Accumulator<'a> {
    effect: Effect,
    rows: Vec<&'a CandidateRow>,
}

impl<'a> Accumulator<'a> {
    fn new(row: &'a CandidateRow) -> Self {
        Self {
            effect: row.effect(),
            rows: vec![row],
        }
    }

    fn fold(&mut self, row: &'a CandidateRow) {
        let effect = row.effect();
        if effect.is_more_restrictive_than(self.effect) {
            *self = Self::new(row);
        } else if effect == self.effect {
            self.rows.push(row);
        } else {
            trace!(permission = %row.permission, "allow ignored for denied permission");
        }
    }
}

/// Resolve candidate rows into one statement per permission key.
///
/// Denials are emitted unconditionally. A granted key is emitted as an allow
/// when at least one granting role's condition passes; otherwise it is left
/// out. Resource-scoped rows do not take part.
pub fn resolve_permissions(
    rows: &[CandidateRow],
    lookup: &Lookup,
    resolver: Option<&dyn GroupResolver>,
) -> Vec<PermissionStatement> {
    resolve_permissions_at(rows, lookup, resolver, Utc::now())
}

/// [`resolve_permissions`] with condition time fixed at `now`
pub fn resolve_permissions_at(
    rows: &[CandidateRow],
    lookup: &Lookup,
    resolver: Option<&dyn GroupResolver>,
    now: DateTime<Utc>,
) -> Vec<PermissionStatement> {
    let mut accumulated: BTreeMap<&str, Accumulator<'_>> = BTreeMap::new();

    for row in rows.iter().filter(|row| row.resource.is_empty()) {
        accumulated
            .entry(row.permission.as_str())
            .and_modify(|entry| entry.fold(row))
            .or_insert_with(|| Accumulator::new(row));
    }

    let mut statements = Vec::with_capacity(accumulated.len());
    for (permission, entry) in accumulated {
        let mut options = PermissionOptions::new();

        match entry.effect {
            Effect::Deny => {
                for row in &entry.rows {
                    merge_options(&mut options, &row.options);
                }
            }
            Effect::Allow => {
                let mut granted = false;
                for row in &entry.rows {
                    if evaluate_condition_at(&row.condition, lookup, resolver, now) {
                        granted = true;
                        merge_options(&mut options, &row.options);
                    }
                }
                if !granted {
                    trace!(permission, "allow withheld by role condition");
                    continue;
                }
            }
        }

        statements.push(PermissionStatement {
            permission: permission.to_string(),
            effect: entry.effect,
            options,
        });
    }

    debug!(
        lookup = %lookup,
        rows = rows.len(),
        statements = statements.len(),
        "resolved permission statements"
    );

    statements
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Condition;

    fn lookup() -> Lookup {
        Lookup::new("ws", "alice")
    }

    #[test]
    fn test_empty_rows_yield_nothing() {
        assert!(resolve_permissions(&[], &lookup(), None).is_empty());
    }

    #[test]
    fn test_single_allow() {
        let statements = resolve_permissions(&[CandidateRow::allow("docs.read")], &lookup(), None);
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].permission, "docs.read");
        assert!(statements[0].is_allow());
    }

    #[test]
    fn test_deny_wins_in_either_order() {
        let allow = CandidateRow::allow("docs.read");
        let deny = CandidateRow::deny("docs.read");

        for rows in [vec![allow.clone(), deny.clone()], vec![deny, allow]] {
            let statements = resolve_permissions(&rows, &lookup(), None);
            assert_eq!(statements.len(), 1);
            assert_eq!(statements[0].effect, Effect::Deny);
        }
    }

    #[test]
    fn test_condition_never_gates_deny() {
        let impossible = Condition::new().require_mfa();
        let rows = vec![CandidateRow::deny("docs.read").with_condition(impossible)];

        let statements = resolve_permissions(&rows, &lookup(), None);
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].effect, Effect::Deny);
    }

    #[test]
    fn test_failed_condition_omits_allow() {
        let rows = vec![CandidateRow::allow("docs.read").with_condition(Condition::new().require_mfa())];
        assert!(resolve_permissions(&rows, &lookup(), None).is_empty());
    }

    #[test]
    fn test_any_passing_role_grants() {
        let rows = vec![
            CandidateRow::allow("docs.read")
                .with_condition(Condition::new().require_mfa())
                .with_option("folders", ["secret"]),
            CandidateRow::allow("docs.read").with_option("folders", ["public"]),
        ];

        let statements = resolve_permissions(&rows, &lookup(), None);
        assert_eq!(statements.len(), 1);
        assert!(statements[0].is_allow());
        // Only the passing role contributes options
        assert_eq!(statements[0].options["folders"], vec!["public"]);
    }

    #[test]
    fn test_allow_options_are_merged() {
        let rows = vec![
            CandidateRow::allow("docs.read").with_option("folders", ["a"]),
            CandidateRow::allow("docs.read").with_option("folders", ["a", "b"]),
        ];

        let statements = resolve_permissions(&rows, &lookup(), None);
        assert_eq!(statements[0].options["folders"], vec!["a", "a", "b"]);
    }

    #[test]
    fn test_resource_scoped_rows_ignored() {
        let mut scoped = CandidateRow::deny("docs.read");
        scoped.resource = "doc-1".to_string();

        let statements = resolve_permissions(&[scoped, CandidateRow::allow("docs.read")], &lookup(), None);
        assert_eq!(statements.len(), 1);
        assert!(statements[0].is_allow());
    }

    #[test]
    fn test_statements_sorted_by_key() {
        let rows = vec![CandidateRow::allow("b"), CandidateRow::deny("a"), CandidateRow::allow("c")];
        let keys: Vec<_> = resolve_permissions(&rows, &lookup(), None)
            .into_iter()
            .map(|s| s.permission)
            .collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }
}
