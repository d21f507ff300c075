// SPDX-License-Identifier: Apache-2.0

use super::{current_state, new_state};
use crate::{ErrorKind, MergedNetworkState};

#[test]
fn test_dns_server_replaced_search_kept() {
    let desired = new_state(
        r#"
        dns-resolver:
          config:
            server:
            - 2001:db8:0::1
            - 192.0.2.53
        "#,
    );
    let merged = MergedNetworkState::new(desired, current_state()).unwrap();
    assert!(merged.dns.is_changed());
    let config = merged.dns.merged.config.as_ref().unwrap();
    assert_eq!(
        config.server.as_deref(),
        Some(["2001:db8::1".to_string(), "192.0.2.53".to_string()].as_slice())
    );
    assert_eq!(
        config.search.as_deref(),
        Some(["example.org".to_string()].as_slice())
    );
}

#[test]
fn test_dns_unchanged() {
    let desired = new_state(
        r#"
        dns-resolver:
          config:
            server:
            - 192.168.122.1
        "#,
    );
    let merged = MergedNetworkState::new(desired, current_state()).unwrap();
    assert!(!merged.dns.is_changed());
}

#[test]
fn test_dns_purge() {
    let desired = new_state(
        r#"
        dns-resolver:
          config:
            server: []
            search: []
        "#,
    );
    let merged = MergedNetworkState::new(desired, current_state()).unwrap();
    assert!(merged.dns.is_changed());
    let config = merged.dns.merged.config.as_ref().unwrap();
    assert_eq!(config.server, Some(Vec::new()));
    assert_eq!(config.search, Some(Vec::new()));
}

#[test]
fn test_dns_invalid_server() {
    let desired = new_state(
        r#"
        dns-resolver:
          config:
            server:
            - 192.0.2.300
        "#,
    );
    let result = MergedNetworkState::new(desired, current_state());
    assert!(result.is_err());
    if let Err(e) = result {
        assert_eq!(e.kind(), ErrorKind::ValidationError);
        assert!(e.msg().starts_with("dns-resolver.config.server[0]:"));
    }
}
