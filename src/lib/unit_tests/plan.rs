// SPDX-License-Identifier: Apache-2.0

use super::{current_state, new_state};
use crate::{
    plan::gen_operations, Interface, MergedNetworkState, NetrecInterface,
    NetworkState, Operation,
};

fn plan(desired_yaml: &str, current: NetworkState) -> Vec<String> {
    let merged =
        MergedNetworkState::new(new_state(desired_yaml), current).unwrap();
    gen_operations(&merged)
        .unwrap()
        .iter()
        .map(Operation::describe)
        .collect()
}

fn add_ifaces(current: &mut NetworkState, ifaces_yaml: &str) {
    let ifaces: Vec<Interface> = serde_yaml::from_str(ifaces_yaml).unwrap();
    for iface in ifaces {
        current.ifaces.push(iface);
    }
}

#[test]
fn test_plan_no_change() {
    let current = current_state();
    let merged = MergedNetworkState::new(current.clone(), current).unwrap();
    assert!(gen_operations(&merged).unwrap().is_empty());
}

#[test]
fn test_plan_create_parent_before_child() {
    let ops = plan(
        r#"
        interfaces:
        - name: bond0.100
          type: vlan
          vlan:
            base-iface: bond0
            id: 100
          ipv4:
            address:
            - ip: 192.0.2.1
              prefix-length: 24
        - name: bond0
          type: bond
          link-aggregation:
            mode: active-backup
            port:
            - eth3
            - eth2
        "#,
        current_state(),
    );
    assert_eq!(
        ops,
        vec![
            "create-interface bond bond0",
            "create-interface vlan bond0.100",
            "modify-interface ethernet eth2",
            "modify-interface ethernet eth3",
            "set-addresses bond0.100 ipv4",
        ]
    );
}

#[test]
fn test_plan_delete_child_before_parent() {
    let mut current = current_state();
    add_ifaces(
        &mut current,
        r#"
        - name: dummy0
          type: dummy
          state: up
        - name: dummy0.10
          type: vlan
          state: up
          vlan:
            base-iface: dummy0
            id: 10
        "#,
    );
    let ops = plan(
        r#"
        interfaces:
        - name: dummy0
          state: absent
        - name: dummy0.10
          state: absent
        "#,
        current,
    );
    assert_eq!(
        ops,
        vec![
            "delete-interface vlan dummy0.10",
            "delete-interface dummy dummy0",
        ]
    );
}

#[test]
fn test_plan_recreate_on_vxlan_id_change() {
    let mut current = current_state();
    add_ifaces(
        &mut current,
        r#"
        - name: vxlan0
          type: vxlan
          state: up
          vxlan:
            base-iface: eth1
            id: 10
            remote: 192.0.2.250
            destination-port: 4789
        "#,
    );
    let ops = plan(
        r#"
        interfaces:
        - name: vxlan0
          vxlan:
            id: 20
        "#,
        current,
    );
    assert_eq!(
        ops,
        vec![
            "delete-interface vxlan vxlan0",
            "create-interface vxlan vxlan0",
        ]
    );
}

#[test]
fn test_plan_deactivate_before_changes() {
    let ops = plan(
        r#"
        interfaces:
        - name: eth1
          state: down
        - name: eth2
          mtu: 9000
        "#,
        current_state(),
    );
    assert_eq!(
        ops,
        vec![
            "delete-route 0.0.0.0/0 via eth1",
            "modify-interface ethernet eth1",
            "modify-interface ethernet eth2",
        ]
    );
}

#[test]
fn test_plan_detach_port_first() {
    let mut current = current_state();
    add_ifaces(
        &mut current,
        r#"
        - name: bond0
          type: bond
          state: up
          link-aggregation:
            mode: active-backup
            port:
            - eth2
        "#,
    );
    current
        .ifaces
        .get_mut("eth2")
        .unwrap()
        .base_iface_mut()
        .controller = Some("bond0".to_string());
    let ops = plan(
        r#"
        interfaces:
        - name: bond0
          link-aggregation:
            port: []
        "#,
        current,
    );
    assert_eq!(
        ops,
        vec![
            "modify-interface ethernet eth2",
            "modify-interface bond bond0",
        ]
    );
}

#[test]
fn test_plan_address_and_route_and_dns() {
    let ops = plan(
        r#"
        interfaces:
        - name: eth2
          ipv4:
            address:
            - ip: 192.168.100.2
              prefix-length: 24
        routes:
          config:
          - destination: 198.51.100.0/24
            next-hop-interface: eth2
            next-hop-address: 192.168.100.1
        dns-resolver:
          config:
            search:
            - example.com
        "#,
        current_state(),
    );
    assert_eq!(
        ops,
        vec![
            "set-addresses eth2 ipv4",
            "add-route 198.51.100.0/24 via eth2",
            "set-dns server [\"192.168.122.1\"] search [\"example.com\"]",
        ]
    );
}

#[test]
fn test_plan_operation_serialize() {
    let merged = MergedNetworkState::new(
        new_state(
            r#"
            interfaces:
            - name: dummy1
              type: dummy
            "#,
        ),
        current_state(),
    )
    .unwrap();
    let ops = gen_operations(&merged).unwrap();
    let expected: Vec<Operation> = serde_yaml::from_str(
        r#"
        - kind: create-interface
          iface:
            name: dummy1
            type: dummy
            state: up
          rank: 0
        "#,
    )
    .unwrap();
    assert_eq!(ops, expected);
}
