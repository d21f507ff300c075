// SPDX-License-Identifier: Apache-2.0

use super::{current_state, new_state};
use crate::{ErrorKind, MergedNetworkState, RouteEntry};

#[test]
fn test_route_destination_sanitized() {
    let desired = new_state(
        r#"
        routes:
          config:
          - destination: 198.51.100.7/24
            next-hop-interface: eth1
            next-hop-address: 192.168.122.1
          - destination: 2001:db8:1::f/64
            next-hop-interface: eth1
        "#,
    );
    let merged = MergedNetworkState::new(desired, current_state()).unwrap();
    let added = merged.routes.added_routes();
    let dsts: Vec<&str> = added
        .iter()
        .filter_map(|r| r.destination.as_deref())
        .collect();
    assert_eq!(dsts, vec!["2001:db8:1::/64", "198.51.100.0/24"]);
}

#[test]
fn test_route_missing_next_hop_interface() {
    let desired = new_state(
        r#"
        routes:
          config:
          - destination: 198.51.100.0/24
        "#,
    );
    let result = MergedNetworkState::new(desired, current_state());
    assert!(result.is_err());
    if let Err(e) = result {
        assert_eq!(e.kind(), ErrorKind::ValidationError);
        assert_eq!(
            e.msg(),
            "routes.config[0].next-hop-interface: mandatory for route to add"
        );
    }
}

#[test]
fn test_route_next_hop_family_mismatch() {
    let desired = new_state(
        r#"
        routes:
          config:
          - destination: 198.51.100.0/24
            next-hop-interface: eth1
            next-hop-address: 2001:db8::1
        "#,
    );
    let result = MergedNetworkState::new(desired, current_state());
    assert!(result.is_err());
    if let Err(e) = result {
        assert_eq!(e.kind(), ErrorKind::ValidationError);
        assert!(e.msg().starts_with("routes.config[0].next-hop-address:"));
    }
}

#[test]
fn test_route_via_interface_ip_disabled() {
    let desired = new_state(
        r#"
        routes:
          config:
          - destination: 198.51.100.0/24
            next-hop-interface: eth2
        "#,
    );
    let result = MergedNetworkState::new(desired, current_state());
    assert!(result.is_err());
    if let Err(e) = result {
        assert_eq!(e.kind(), ErrorKind::ValidationError);
        assert!(e
            .msg()
            .starts_with("routes.config[0].next-hop-interface: The next hop"));
        assert!(e.msg().ends_with("has IPv4 disabled"));
    }
}

#[test]
fn test_route_via_absent_interface() {
    let desired = new_state(
        r#"
        interfaces:
        - name: eth1
          state: absent
        routes:
          config:
          - destination: 198.51.100.0/24
            next-hop-interface: eth1
        "#,
    );
    let result = MergedNetworkState::new(desired, current_state());
    assert!(result.is_err());
    if let Err(e) = result {
        assert_eq!(e.kind(), ErrorKind::ValidationError);
        assert!(e.msg().starts_with("routes.config[0].next-hop-interface:"));
    }
}

#[test]
fn test_absent_route_wildcard() {
    let desired = new_state(
        r#"
        routes:
          config:
          - next-hop-interface: eth1
            state: absent
        "#,
    );
    let merged = MergedNetworkState::new(desired, current_state()).unwrap();
    assert!(merged.routes.merged.is_empty());
    assert_eq!(merged.routes.removed_routes().len(), 1);
}

#[test]
fn test_absent_route_not_matching() {
    let desired = new_state(
        r#"
        routes:
          config:
          - destination: 0.0.0.0/0
            next-hop-interface: eth1
            metric: 200
            state: absent
        "#,
    );
    let merged = MergedNetworkState::new(desired, current_state()).unwrap();
    assert_eq!(merged.routes.merged.len(), 1);
    assert!(merged.routes.removed_routes().is_empty());
}

#[test]
fn test_route_table_id_default_main() {
    let route: RouteEntry = serde_yaml::from_str(
        r#"
        destination: 0.0.0.0/0
        next-hop-interface: eth1
        table-id: "254"
        state: absent
        "#,
    )
    .unwrap();
    let cur_route: RouteEntry = serde_yaml::from_str(
        r#"
        destination: 0.0.0.0/0
        next-hop-interface: eth1
        "#,
    )
    .unwrap();
    assert_eq!(route.table_id, Some(254));
    assert!(route.is_match(&cur_route));
}

#[test]
fn test_route_via_deleted_interface_dropped() {
    let mut current = current_state();
    current.ifaces.push(
        serde_yaml::from_str(
            r#"
            name: dummy0
            type: dummy
            state: up
            ipv4:
              enabled: true
              address:
              - ip: 192.0.2.1
                prefix-length: 24
            "#,
        )
        .unwrap(),
    );
    current.routes.config.as_mut().unwrap().push(
        serde_yaml::from_str(
            r#"
            destination: 198.51.100.0/24
            next-hop-interface: dummy0
            "#,
        )
        .unwrap(),
    );
    let desired = new_state(
        r#"
        interfaces:
        - name: dummy0
          state: absent
        "#,
    );
    let merged = MergedNetworkState::new(desired, current).unwrap();
    let target = merged.target();
    assert_eq!(target.routes.get_iface_routes("dummy0").len(), 0);
    assert_eq!(target.routes.get_iface_routes("eth1").len(), 1);
}

#[test]
fn test_route_invalid_entry_holds_path() {
    let result = crate::NetworkState::new_from_yaml(
        r#"
        routes:
          config:
          - destination: 198.51.100.0/24
            next-hop-interface: eth1
            metric: high
        "#,
    );
    assert!(result.is_err());
    if let Err(e) = result {
        assert_eq!(e.kind(), ErrorKind::ValidationError);
        assert!(e.msg().contains("routes.config[0]"));
    }
}
