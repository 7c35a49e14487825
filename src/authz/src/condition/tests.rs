//! Clause-by-clause evaluation tests

use super::*;
use chrono::{Duration, Utc};
use rubix_core::Lookup;
use std::collections::HashMap;
use std::net::IpAddr;

fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}

fn groups() -> HashMap<String, Vec<String>> {
    let mut groups = HashMap::new();
    groups.insert("office".to_string(), vec!["10.0.0.0/8".to_string(), "1.1.1.1".to_string()]);
    groups.insert("blocked".to_string(), vec!["10.66.0.0/16".to_string()]);
    groups.insert("empty".to_string(), vec![]);
    groups
}

// ============================================================================
// Identity clauses
// ============================================================================

#[test]
fn test_vacuous_condition_passes() {
    let condition = Condition::default();
    assert!(evaluate_condition(&condition, &Lookup::default(), None));
    assert!(evaluate_condition(&condition, &Lookup::new("ws", "u").with_ip(ip("8.8.8.8")), Some(&groups())));
}

#[test]
fn test_require_mfa() {
    let condition = Condition::new().require_mfa();
    assert!(!evaluate_condition(&condition, &Lookup::new("ws", "u"), None));
    assert!(evaluate_condition(&condition, &Lookup::new("ws", "u").with_mfa(true), None));
}

#[test]
fn test_require_verified_account() {
    let condition = Condition::new().require_verified_account();
    assert!(!evaluate_condition(&condition, &Lookup::new("ws", "u"), None));
    assert!(evaluate_condition(&condition, &Lookup::new("ws", "u").with_verified_account(true), None));
}

#[test]
fn test_max_session_age() {
    let now = Utc::now();
    let lookup = Lookup::new("ws", "u").with_session_issued(now - Duration::seconds(500));

    let valid = Condition::new().with_max_session_age(1000);
    assert!(evaluate_condition_at(&valid, &lookup, None, now));

    let expired = Condition::new().with_max_session_age(400);
    assert!(!evaluate_condition_at(&expired, &lookup, None, now));

    // Exactly at the limit is still within it
    let boundary = Condition::new().with_max_session_age(500);
    assert!(evaluate_condition_at(&boundary, &lookup, None, now));
}

#[test]
fn test_max_session_age_without_issue_time_fails() {
    let condition = Condition::new().with_max_session_age(60);
    assert!(!evaluate_condition(&condition, &Lookup::new("ws", "u"), None));
}

// ============================================================================
// Location clauses
// ============================================================================

#[test]
fn test_allowed_locations() {
    let condition = Condition::new().allow_locations(["FR", "UK"]);
    assert!(evaluate_condition(&condition, &Lookup::new("ws", "u").with_location("UK"), None));
    assert!(!evaluate_condition(&condition, &Lookup::new("ws", "u").with_location("PL"), None));
    assert!(!evaluate_condition(&condition, &Lookup::default(), None));
}

#[test]
fn test_blocked_locations() {
    let condition = Condition::new().block_locations(["PL", "FR"]);
    assert!(!evaluate_condition(&condition, &Lookup::new("ws", "u").with_location("FR"), None));
    assert!(evaluate_condition(&condition, &Lookup::new("ws", "u").with_location("GB"), None));
}

// ============================================================================
// IP group clauses
// ============================================================================

#[test]
fn test_allowed_group_cidr_and_literal() {
    let condition = Condition::new().allow_ip_groups(["office"]);
    let groups = groups();

    assert!(evaluate_condition(&condition, &Lookup::default().with_ip(ip("10.5.3.1")), Some(&groups)));
    assert!(evaluate_condition(&condition, &Lookup::default().with_ip(ip("1.1.1.1")), Some(&groups)));
    assert!(!evaluate_condition(&condition, &Lookup::default().with_ip(ip("11.0.0.1")), Some(&groups)));
}

#[test]
fn test_allowed_group_requires_address() {
    let condition = Condition::new().allow_ip_groups(["office"]);
    assert!(!evaluate_condition(&condition, &Lookup::default(), Some(&groups())));
}

#[test]
fn test_allowed_groups_without_resolver_do_not_constrain() {
    let condition = Condition::new().allow_ip_groups(["office"]);
    assert!(evaluate_condition(&condition, &Lookup::default(), None));
    assert!(evaluate_condition(&condition, &Lookup::default().with_ip(ip("11.0.0.1")), None));
}

#[test]
fn test_unknown_or_empty_allowed_groups_do_not_constrain() {
    let condition = Condition::new().allow_ip_groups(["missing", "empty"]);
    assert!(evaluate_condition(&condition, &Lookup::default(), Some(&groups())));
}

#[test]
fn test_blocked_groups() {
    let condition = Condition::new().block_ip_groups(["blocked"]);
    let groups = groups();

    assert!(!evaluate_condition(&condition, &Lookup::default().with_ip(ip("10.66.1.1")), Some(&groups)));
    assert!(evaluate_condition(&condition, &Lookup::default().with_ip(ip("10.67.1.1")), Some(&groups)));
    assert!(evaluate_condition(&condition, &Lookup::default(), Some(&groups)));
}

#[test]
fn test_allow_and_block_combined() {
    let condition = Condition::new()
        .allow_ip_groups(["office"])
        .block_ip_groups(["blocked"]);
    let groups = groups();

    assert!(evaluate_condition(&condition, &Lookup::default().with_ip(ip("10.1.1.1")), Some(&groups)));
    assert!(!evaluate_condition(&condition, &Lookup::default().with_ip(ip("10.66.1.1")), Some(&groups)));
}

#[test]
fn test_closure_resolver() {
    let resolver = |id: &str| match id {
        "home" => Some(vec!["192.168.1.0/24".to_string()]),
        _ => None,
    };
    let condition = Condition::new().allow_ip_groups(["home"]);

    assert!(evaluate_condition(&condition, &Lookup::default().with_ip(ip("192.168.1.20")), Some(&resolver)));
    assert!(!evaluate_condition(&condition, &Lookup::default().with_ip(ip("192.168.2.20")), Some(&resolver)));
}

#[test]
fn test_first_failing_clause_wins() {
    let condition = Condition::new()
        .require_mfa()
        .allow_locations(["GB"])
        .allow_ip_groups(["office"]);
    let lookup = Lookup::new("ws", "u")
        .with_location("GB")
        .with_ip(ip("10.0.0.1"));

    assert!(!evaluate_condition(&condition, &lookup, Some(&groups())));
    assert!(evaluate_condition(&condition, &lookup.with_mfa(true), Some(&groups())));
}
