// SPDX-License-Identifier: Apache-2.0

use super::{current_state, new_state};
use crate::{
    ErrorKind, InterfaceState, InterfaceType, MergedNetworkState,
    NetrecInterface, NetworkState,
};

fn merge_err(desired_yaml: &str) -> crate::NetrecError {
    let result =
        MergedNetworkState::new(new_state(desired_yaml), current_state());
    assert!(result.is_err());
    result.unwrap_err()
}

#[test]
fn test_partial_merge_keep_other_properties() {
    let desired = new_state(
        r#"
        interfaces:
        - name: eth1
          ipv4:
            address:
            - ip: 192.168.122.250
              prefix-length: 24
        "#,
    );
    let current = current_state();
    let merged = MergedNetworkState::new(desired, current.clone()).unwrap();
    let target = merged.target();

    let cur_eth1 = current.ifaces.get("eth1").unwrap();
    let new_eth1 = target.ifaces.get("eth1").unwrap();
    assert_eq!(new_eth1.iface_type(), &InterfaceType::Ethernet);
    assert_eq!(new_eth1.base_iface().mtu, Some(1500));
    assert_eq!(
        new_eth1.base_iface().mac_address.as_deref(),
        Some("00:23:45:67:89:1A")
    );
    assert_eq!(
        new_eth1.base_iface().ipv6.as_ref().map(|i| i.autoconf),
        cur_eth1.base_iface().ipv6.as_ref().map(|i| i.autoconf)
    );
    assert_eq!(
        target.ifaces.get("eth2").unwrap().base_iface().ipv4,
        current.ifaces.get("eth2").unwrap().base_iface().ipv4
    );
    assert_eq!(target.routes, current.routes);
}

#[test]
fn test_empty_desired_state_changes_nothing() {
    let merged =
        MergedNetworkState::new(NetworkState::new(), current_state()).unwrap();
    assert!(merged.ifaces.iter().all(|i| !i.is_changed()));
    assert!(!merged.dns.is_changed());
}

#[test]
fn test_description_removal() {
    let mut current = current_state();
    current
        .ifaces
        .get_mut("eth2")
        .unwrap()
        .base_iface_mut()
        .description = Some("storage network".to_string());
    let desired = new_state(
        r#"
        interfaces:
        - name: eth2
          description: ""
        "#,
    );
    let merged = MergedNetworkState::new(desired, current).unwrap();
    let iface = merged.ifaces.get("eth2").unwrap();
    assert_eq!(iface.merged.base_iface().description, None);
    assert!(iface.is_changed());
}

#[test]
fn test_mac_address_upper_case() {
    let desired = new_state(
        r#"
        interfaces:
        - name: eth2
          mac-address: 00:23:45:67:89:aa
        "#,
    );
    let merged = MergedNetworkState::new(desired, current_state()).unwrap();
    let iface = merged.ifaces.get("eth2").unwrap();
    assert_eq!(
        iface.merged.base_iface().mac_address.as_deref(),
        Some("00:23:45:67:89:AA")
    );
}

#[test]
fn test_invalid_mac_address() {
    let e = merge_err(
        r#"
        interfaces:
        - name: eth2
          mac-address: 00:23:45:67:89
        "#,
    );
    assert_eq!(e.kind(), ErrorKind::ValidationError);
    assert!(e.msg().starts_with("interfaces[eth2].mac-address:"));
}

#[test]
fn test_unknown_key_rejected_for_typed_interface() {
    let result = NetworkState::new_from_yaml(
        r#"
        interfaces:
        - name: eth2
          type: ethernet
          speed: 1000
        "#,
    );
    assert!(result.is_err());
    if let Err(e) = result {
        assert_eq!(e.kind(), ErrorKind::ValidationError);
        assert!(e.msg().contains("interfaces[eth2]"));
        assert!(e.msg().contains("speed"));
    }
}

#[test]
fn test_unknown_key_rejected_for_typeless_interface() {
    let e = merge_err(
        r#"
        interfaces:
        - name: eth2
          speed: 1000
        "#,
    );
    assert_eq!(e.kind(), ErrorKind::ValidationError);
    assert!(e.msg().contains("interfaces[eth2]"));
    assert!(e.msg().contains("speed"));
}

#[test]
fn test_unknown_top_level_key_rejected() {
    let result = NetworkState::new_from_yaml("interface: []");
    assert!(result.is_err());
    if let Err(e) = result {
        assert_eq!(e.kind(), ErrorKind::ValidationError);
    }
}

#[test]
fn test_type_mandatory_for_new_interface() {
    let e = merge_err(
        r#"
        interfaces:
        - name: dummy0
          state: up
        "#,
    );
    assert_eq!(e.kind(), ErrorKind::ValidationError);
    assert_eq!(
        e.msg(),
        "interfaces[dummy0].type: mandatory for new interface dummy0"
    );
}

#[test]
fn test_type_change_rejected() {
    let e = merge_err(
        r#"
        interfaces:
        - name: eth2
          type: dummy
        "#,
    );
    assert_eq!(e.kind(), ErrorKind::ValidationError);
    assert!(e.msg().starts_with("interfaces[eth2].type:"));
}

#[test]
fn test_physical_interface_not_found() {
    let e = merge_err(
        r#"
        interfaces:
        - name: eth9
          type: ethernet
          state: up
        "#,
    );
    assert_eq!(e.kind(), ErrorKind::ValidationError);
    assert!(e.msg().starts_with("interfaces[eth9]:"));
}

#[test]
fn test_duplicate_interface_name() {
    let e = merge_err(
        r#"
        interfaces:
        - name: eth2
          state: up
        - name: eth2
          state: down
        "#,
    );
    assert_eq!(e.kind(), ErrorKind::ValidationError);
}

#[test]
fn test_absent_physical_interface_brought_down() {
    let desired = new_state(
        r#"
        interfaces:
        - name: eth1
          state: absent
        "#,
    );
    let merged = MergedNetworkState::new(desired, current_state()).unwrap();
    let iface = merged.ifaces.get("eth1").unwrap();
    assert!(!iface.is_deleted());
    assert_eq!(iface.merged.base_iface().state, Some(InterfaceState::Down));
    let base_iface = iface.merged.base_iface();
    assert_eq!(base_iface.ipv4.as_ref().map(|i| i.is_enabled()), Some(false));
    assert_eq!(base_iface.ipv6.as_ref().map(|i| i.is_enabled()), Some(false));
    // Routes next hop to interface without IP are removed.
    assert!(merged.routes.merged.is_empty());
}

#[test]
fn test_absent_interface_not_exist_ignored() {
    let desired = new_state(
        r#"
        interfaces:
        - name: dummy9
          state: absent
        "#,
    );
    let merged = MergedNetworkState::new(desired, current_state()).unwrap();
    assert!(merged.ifaces.get("dummy9").is_none());
}

#[test]
fn test_absent_ignores_other_properties() {
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
    let desired = new_state(
        r#"
        interfaces:
        - name: dummy0
          type: dummy
          state: absent
          mtu: 9000
          ipv4:
            address:
            - ip: 192.0.2.1
              prefix-length: 33
        "#,
    );
    let merged = MergedNetworkState::new(desired, current).unwrap();
    assert!(merged.ifaces.get("dummy0").unwrap().is_deleted());
    assert!(merged.target().ifaces.get("dummy0").is_none());
}

#[test]
fn test_port_gets_ip_disabled() {
    let desired = new_state(
        r#"
        interfaces:
        - name: bond0
          type: bond
          state: up
          link-aggregation:
            mode: active-backup
            port:
            - eth2
            - eth3
        "#,
    );
    let merged = MergedNetworkState::new(desired, current_state()).unwrap();
    for port in ["eth2", "eth3"] {
        let iface = merged.ifaces.get(port).unwrap();
        assert_eq!(
            iface.merged.base_iface().controller.as_deref(),
            Some("bond0")
        );
        assert_eq!(
            iface.merged.base_iface().ipv4.as_ref().map(|i| i.is_enabled()),
            Some(false)
        );
    }
    assert_eq!(merged.ifaces.rank("bond0"), 0);
    assert_eq!(merged.ifaces.rank("eth2"), 1);
}

#[test]
fn test_port_with_ip_enabled_rejected() {
    let e = merge_err(
        r#"
        interfaces:
        - name: eth2
          ipv4:
            enabled: true
            dhcp: true
        - name: bond0
          type: bond
          link-aggregation:
            mode: active-backup
            port:
            - eth2
        "#,
    );
    assert_eq!(e.kind(), ErrorKind::ValidationError);
    assert!(e.msg().starts_with("interfaces[eth2]:"));
}

#[test]
fn test_port_of_two_controllers_rejected() {
    let e = merge_err(
        r#"
        interfaces:
        - name: bond0
          type: bond
          link-aggregation:
            mode: active-backup
            port:
            - eth2
        - name: br0
          type: linux-bridge
          bridge:
            port:
            - name: eth2
        "#,
    );
    assert_eq!(e.kind(), ErrorKind::ValidationError);
    assert!(e.msg().contains("cannot be port of both"));
}

#[test]
fn test_missing_port_rejected() {
    let e = merge_err(
        r#"
        interfaces:
        - name: bond0
          type: bond
          link-aggregation:
            mode: active-backup
            port:
            - eth9
        "#,
    );
    assert_eq!(e.kind(), ErrorKind::ValidationError);
    assert!(e.msg().starts_with("interfaces[bond0]:"));
}

#[test]
fn test_controller_property_is_query_only() {
    let desired = new_state(
        r#"
        interfaces:
        - name: eth2
          controller: bond9
        "#,
    );
    let merged = MergedNetworkState::new(desired, current_state()).unwrap();
    let iface = merged.ifaces.get("eth2").unwrap();
    assert_eq!(iface.merged.base_iface().controller, None);
}

#[test]
fn test_vlan_parent_missing() {
    let e = merge_err(
        r#"
        interfaces:
        - name: eth9.101
          type: vlan
          vlan:
            base-iface: eth9
            id: 101
        "#,
    );
    assert_eq!(e.kind(), ErrorKind::ValidationError);
    assert!(e.msg().starts_with("interfaces[eth9.101]:"));
}

#[test]
fn test_vlan_parent_absent() {
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
    let desired = new_state(
        r#"
        interfaces:
        - name: dummy0
          state: absent
        - name: dummy0.101
          type: vlan
          vlan:
            base-iface: dummy0
            id: 101
        "#,
    );
    let result = MergedNetworkState::new(desired, current);
    assert!(result.is_err());
    if let Err(e) = result {
        assert_eq!(e.kind(), ErrorKind::ValidationError);
        assert!(e.msg().contains("does not exist or is marked as absent"));
    }
}

#[test]
fn test_vlan_id_out_of_range() {
    let e = merge_err(
        r#"
        interfaces:
        - name: eth1.5000
          type: vlan
          vlan:
            base-iface: eth1
            id: 5000
        "#,
    );
    assert_eq!(e.kind(), ErrorKind::ValidationError);
}

#[test]
fn test_dependency_loop() {
    let e = merge_err(
        r#"
        interfaces:
        - name: vlan-a
          type: vlan
          vlan:
            base-iface: vlan-b
            id: 101
        - name: vlan-b
          type: vlan
          vlan:
            base-iface: vlan-a
            id: 102
        "#,
    );
    assert_eq!(e.kind(), ErrorKind::ValidationError);
    assert!(e.msg().contains("Dependency loop detected"));
}

#[test]
fn test_mtu_bigger_than_max() {
    let e = merge_err(
        r#"
        interfaces:
        - name: eth2
          mtu: 9001
        "#,
    );
    assert_eq!(e.kind(), ErrorKind::ValidationError);
    assert!(e.msg().starts_with("interfaces[eth2].mtu:"));
}

#[test]
fn test_loopback_cannot_be_down() {
    let e = merge_err(
        r#"
        interfaces:
        - name: lo
          state: down
        "#,
    );
    assert_eq!(e.kind(), ErrorKind::ValidationError);
    assert!(e.msg().starts_with("interfaces[lo].state:"));
}
