//! Condition evaluation against a request context

use super::matcher::ip_matches_any;
use super::resolver::{collect_group_entries, GroupResolver};
use super::types::Condition;
use chrono::{DateTime, Utc};
use rubix_core::Lookup;
use tracing::trace;

/// Evaluate `condition` against `lookup` at the current wall-clock time.
///
/// Total: unmet or missing prerequisites fail the predicate, nothing errors.
/// Clauses are checked in order and evaluation stops at the first failure.
pub fn evaluate_condition(
    condition: &Condition,
    lookup: &Lookup,
    resolver: Option<&dyn GroupResolver>,
) -> bool {
    evaluate_condition_at(condition, lookup, resolver, Utc::now())
}

/// Evaluate `condition` with session age measured at `now`.
pub fn evaluate_condition_at(
    condition: &Condition,
    lookup: &Lookup,
    resolver: Option<&dyn GroupResolver>,
    now: DateTime<Utc>,
) -> bool {
    if condition.require_mfa && !lookup.mfa {
        trace!(lookup = %lookup, "condition failed: mfa required");
        return false;
    }

    if condition.require_verified_account && !lookup.verified_account {
        trace!(lookup = %lookup, "condition failed: verified account required");
        return false;
    }

    if condition.max_session_age_seconds > 0 {
        let max_age = i64::try_from(condition.max_session_age_seconds).unwrap_or(i64::MAX);
        // An unknown issuance time is treated as infinitely old.
        let too_old = match lookup.session_age_seconds(now) {
            Some(age) => age > max_age,
            None => true,
        };
        if too_old {
            trace!(lookup = %lookup, max_age, "condition failed: session too old");
            return false;
        }
    }

    if !condition.allowed_locations.is_empty()
        && !condition.allowed_locations.contains(&lookup.geo_location)
    {
        trace!(location = %lookup.geo_location, "condition failed: location not allowed");
        return false;
    }

    if condition.blocked_locations.contains(&lookup.geo_location) {
        trace!(location = %lookup.geo_location, "condition failed: location blocked");
        return false;
    }

    let allowed_entries = collect_group_entries(&condition.allowed_ip_groups, resolver);
    if !allowed_entries.is_empty() {
        let Some(ip) = lookup.ip_address else {
            trace!(lookup = %lookup, "condition failed: no address for allow-list");
            return false;
        };
        if !ip_matches_any(ip, &allowed_entries) {
            trace!(%ip, "condition failed: address not in allowed groups");
            return false;
        }
    }

    let blocked_entries = collect_group_entries(&condition.blocked_ip_groups, resolver);
    if let Some(ip) = lookup.ip_address {
        if ip_matches_any(ip, &blocked_entries) {
            trace!(%ip, "condition failed: address in blocked groups");
            return false;
        }
    }

    true
}
