//! Network address matching against IP group entries

use ipnetwork::IpNetwork;
use std::net::{IpAddr, Ipv6Addr};

/// Canonical 16-byte form, so an IPv4 address and its IPv4-mapped IPv6 form compare equal
fn canonical(ip: IpAddr) -> Ipv6Addr {
    match ip {
        IpAddr::V4(v4) => v4.to_ipv6_mapped(),
        IpAddr::V6(v6) => v6,
    }
}

/// Check whether `ip` matches a single entry.
///
/// Entries containing `/` are CIDR ranges matched by containment, anything
/// else is a literal address matched by equality. Malformed entries never match.
pub fn ip_matches_entry(ip: IpAddr, entry: &str) -> bool {
    if entry.contains('/') {
        let Ok(network) = entry.parse::<IpNetwork>() else {
            return false;
        };
        return match (network, ip.to_canonical()) {
            (IpNetwork::V4(net), IpAddr::V4(addr)) => net.contains(addr),
            (IpNetwork::V6(net), IpAddr::V6(addr)) => net.contains(addr),
            (IpNetwork::V6(net), IpAddr::V4(addr)) => net.contains(addr.to_ipv6_mapped()),
            (IpNetwork::V4(_), IpAddr::V6(_)) => false,
        };
    }

    match entry.parse::<IpAddr>() {
        Ok(parsed) => canonical(parsed) == canonical(ip),
        Err(_) => false,
    }
}

/// True when `ip` matches at least one entry
pub fn ip_matches_any<S: AsRef<str>>(ip: IpAddr, entries: &[S]) -> bool {
    entries.iter().any(|entry| ip_matches_entry(ip, entry.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_literal_match() {
        assert!(ip_matches_entry(ip("1.1.1.1"), "1.1.1.1"));
        assert!(!ip_matches_entry(ip("1.1.1.2"), "1.1.1.1"));
        assert!(ip_matches_entry(ip("2001:db8::1"), "2001:db8::1"));
    }

    #[test]
    fn test_mapped_addresses_compare_equal() {
        assert!(ip_matches_entry(ip("::ffff:10.1.2.3"), "10.1.2.3"));
        assert!(ip_matches_entry(ip("10.1.2.3"), "::ffff:10.1.2.3"));
    }

    #[test]
    fn test_cidr_containment() {
        assert!(ip_matches_entry(ip("10.5.3.1"), "10.0.0.0/8"));
        assert!(!ip_matches_entry(ip("11.0.0.1"), "10.0.0.0/8"));
        assert!(ip_matches_entry(ip("::ffff:10.5.3.1"), "10.0.0.0/8"));
        assert!(ip_matches_entry(ip("2001:db8::42"), "2001:db8::/32"));
        assert!(!ip_matches_entry(ip("10.5.3.1"), "2001:db8::/32"));
    }

    #[test]
    fn test_malformed_entries_never_match() {
        assert!(!ip_matches_entry(ip("10.0.0.1"), "10.0.0.0/99"));
        assert!(!ip_matches_entry(ip("10.0.0.1"), "not-an-ip"));
        assert!(!ip_matches_entry(ip("10.0.0.1"), ""));
    }

    #[test]
    fn test_matches_any() {
        let entries = vec!["192.168.0.0/16".to_string(), "8.8.8.8".to_string()];
        assert!(ip_matches_any(ip("8.8.8.8"), &entries));
        assert!(ip_matches_any(ip("192.168.44.1"), &entries));
        assert!(!ip_matches_any(ip("8.8.4.4"), &entries));
        assert!(!ip_matches_any::<String>(ip("8.8.4.4"), &[]));
    }
}
