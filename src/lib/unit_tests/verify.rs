// SPDX-License-Identifier: Apache-2.0

use super::{current_state, new_state};
use crate::{ErrorKind, MergedNetworkState, NetrecInterface, NetworkState};

fn merge(desired_yaml: &str, current: NetworkState) -> MergedNetworkState {
    MergedNetworkState::new(new_state(desired_yaml), current).unwrap()
}

#[test]
fn test_verify_target_state() {
    let merged = merge(
        r#"
        interfaces:
        - name: eth2
          mtu: 9000
          ipv4:
            address:
            - ip: 192.168.100.2
              prefix-length: 24
        routes:
          config:
          - destination: 198.51.100.0/24
            next-hop-interface: eth2
        dns-resolver:
          config:
            server:
            - 192.0.2.53
        "#,
        current_state(),
    );
    merged.verify(&merged.target()).unwrap();
}

#[test]
fn test_verify_collect_all_mismatches() {
    let merged = merge(
        r#"
        interfaces:
        - name: eth1
          mtu: 9000
        - name: eth2
          mtu: 9000
        "#,
        current_state(),
    );
    let result = merged.verify(&current_state());
    assert!(result.is_err());
    if let Err(e) = result {
        assert_eq!(e.kind(), ErrorKind::VerificationError);
        assert_eq!(
            e.msg(),
            "2 properties not converged, first one interfaces[eth1].mtu: \
             desired 9000, current 1500"
        );
        assert_eq!(e.mismatches().len(), 2);
        assert_eq!(e.mismatches()[1].path, "interfaces[eth2].mtu");
        assert_eq!(e.mismatches()[1].desired, serde_json::json!(9000));
        assert_eq!(e.mismatches()[1].current, serde_json::json!(1500));
    }
}

#[test]
fn test_verify_ignore_address_order() {
    let desired_yaml = r#"
        interfaces:
        - name: eth2
          ipv4:
            address:
            - ip: 192.168.100.2
              prefix-length: 24
            - ip: 192.168.100.1
              prefix-length: 24
        "#;
    let merged = merge(desired_yaml, current_state());
    let mut current = merged.target();
    if let Some(addrs) = current
        .ifaces
        .get_mut("eth2")
        .and_then(|i| i.base_iface_mut().ipv4.as_mut())
        .and_then(|i| i.addresses.as_mut())
    {
        addrs.reverse();
    }
    merged.verify(&current).unwrap();
}

#[test]
fn test_verify_ignore_dynamic_address() {
    let merged = merge(
        r#"
        interfaces:
        - name: eth2
          ipv4:
            dhcp: true
        "#,
        current_state(),
    );
    let mut current = merged.target();
    let ipv4: crate::InterfaceIpv4 = serde_yaml::from_str(
        r#"
        enabled: true
        dhcp: true
        address:
        - ip: 192.168.122.99
          prefix-length: 24
        "#,
    )
    .unwrap();
    if let Some(iface) = current.ifaces.get_mut("eth2") {
        iface.base_iface_mut().ipv4 = Some(ipv4);
    }
    merged.verify(&current).unwrap();
}

#[test]
fn test_verify_missing_address() {
    let merged = merge(
        r#"
        interfaces:
        - name: eth1
          ipv4:
            address:
            - ip: 192.168.122.250
              prefix-length: 24
        "#,
        current_state(),
    );
    let result = merged.verify(&current_state());
    assert!(result.is_err());
    if let Err(e) = result {
        assert_eq!(e.kind(), ErrorKind::VerificationError);
        assert_eq!(
            e.mismatches()[0].path,
            "interfaces[eth1].ipv4.address[0].ip"
        );
    }
}

#[test]
fn test_verify_absent_virtual_interface_still_exists() {
    let mut current = current_state();
    current.ifaces.push(
        serde_yaml::from_str(
            r#"
            name: dummy0
            type: dummy
            state: up
            "#,
        )
        .unwrap(),
    );
    let merged = merge(
        r#"
        interfaces:
        - name: dummy0
          state: absent
        "#,
        current.clone(),
    );
    let result = merged.verify(&current);
    assert!(result.is_err());
    if let Err(e) = result {
        assert_eq!(e.kind(), ErrorKind::VerificationError);
        assert_eq!(e.mismatches()[0].path, "interfaces[dummy0]");
    }
    merged.verify(&merged.target()).unwrap();
}

#[test]
fn test_verify_absent_physical_interface_skipped() {
    let merged = merge(
        r#"
        interfaces:
        - name: eth2
          state: absent
        "#,
        current_state(),
    );
    merged.verify(&current_state()).unwrap();
}

#[test]
fn test_verify_absent_route_still_exists() {
    let merged = merge(
        r#"
        routes:
          config:
          - next-hop-interface: eth1
            state: absent
        "#,
        current_state(),
    );
    let result = merged.verify(&current_state());
    assert!(result.is_err());
    if let Err(e) = result {
        assert_eq!(e.kind(), ErrorKind::VerificationError);
        assert_eq!(e.mismatches()[0].path, "routes.config[0]");
    }
    merged.verify(&merged.target()).unwrap();
}

#[test]
fn test_verify_description_removed() {
    let mut current = current_state();
    if let Some(iface) = current.ifaces.get_mut("eth2") {
        iface.base_iface_mut().description = Some("old".to_string());
    }
    let merged = merge(
        r#"
        interfaces:
        - name: eth2
          description: ""
        "#,
        current.clone(),
    );
    assert!(merged.verify(&current).is_err());
    merged.verify(&merged.target()).unwrap();
}

#[test]
fn test_verify_mac_address_case_insensitive() {
    let merged = merge(
        r#"
        interfaces:
        - name: eth1
          mac-address: 00:23:45:67:89:1a
        "#,
        current_state(),
    );
    let mut current = current_state();
    if let Some(iface) = current.ifaces.get_mut("eth1") {
        iface.base_iface_mut().mac_address =
            Some("00:23:45:67:89:1a".to_string());
    }
    merged.verify(&current).unwrap();
}
