// SPDX-License-Identifier: Apache-2.0

use super::{current_state, new_state};
use crate::{
    state::ip::sanitize_ip_network, ErrorKind, InterfaceIpv4,
    MergedNetworkState, NetrecInterface, NetworkState,
};

#[test]
fn test_sanitize_ip_network_empty_str() {
    let result = sanitize_ip_network("");
    assert!(result.is_err());
    if let Err(e) = result {
        assert_eq!(e.kind(), ErrorKind::ValidationError);
    }
}

#[test]
fn test_sanitize_ip_network_invalid_ipv4_prefix_length() {
    let result = sanitize_ip_network("192.0.2.1/33");
    assert!(result.is_err());
    if let Err(e) = result {
        assert_eq!(e.kind(), ErrorKind::ValidationError);
    }
}

#[test]
fn test_sanitize_ip_network_invalid_ipv6_prefix_length() {
    let result = sanitize_ip_network("::1/129");
    assert!(result.is_err());
    if let Err(e) = result {
        assert_eq!(e.kind(), ErrorKind::ValidationError);
    }
}

#[test]
fn test_sanitize_ip_network_ipv4_gateway() {
    assert_eq!(sanitize_ip_network("0.0.0.1/0").unwrap(), "0.0.0.0/0");
}

#[test]
fn test_sanitize_ip_network_ipv6_host_only() {
    assert_eq!(
        sanitize_ip_network("2001:db8:1::0").unwrap(),
        "2001:db8:1::/128"
    );
}

#[test]
fn test_sanitize_ip_network_ipv4_net() {
    assert_eq!(sanitize_ip_network("192.0.3.1/23").unwrap(), "192.0.2.0/23");
}

#[test]
fn test_sanitize_ip_network_ipv6_net() {
    assert_eq!(
        sanitize_ip_network("2001:db8:1::f/64").unwrap(),
        "2001:db8:1::/64"
    );
}

#[test]
fn test_ipv4_prefix_length_out_of_range() {
    let desired = new_state(
        r#"
        interfaces:
        - name: eth1
          ipv4:
            address:
            - ip: 192.168.122.250
              prefix-length: 33
        "#,
    );
    let result = MergedNetworkState::new(desired, current_state());
    assert!(result.is_err());
    if let Err(e) = result {
        assert_eq!(e.kind(), ErrorKind::ValidationError);
        assert_eq!(
            e.msg(),
            "interfaces[eth1].ipv4.address[0].prefix-length: Invalid IPv4 \
             network prefix length '33', should be in the range of 0 to 32"
        );
    }
}

#[test]
fn test_ipv6_address_in_ipv4_section() {
    let desired = new_state(
        r#"
        interfaces:
        - name: eth1
          type: ethernet
          ipv4:
            address:
            - ip: 2001:db8::1
              prefix-length: 64
        "#,
    );
    let result = MergedNetworkState::new(desired, current_state());
    assert!(result.is_err());
    if let Err(e) = result {
        assert_eq!(e.kind(), ErrorKind::ValidationError);
        assert!(e.msg().starts_with("interfaces[eth1].ipv4.address[0].ip:"));
    }
}

#[test]
fn test_invalid_ip_address_holds_path() {
    let result = NetworkState::new_from_yaml(
        r#"
        interfaces:
        - name: eth1
          type: ethernet
          ipv4:
            address:
            - ip: 192.168.122.256
              prefix-length: 24
        "#,
    );
    assert!(result.is_err());
    if let Err(e) = result {
        assert_eq!(e.kind(), ErrorKind::ValidationError);
        assert!(e.msg().contains("address[0]"));
    }
}

#[test]
fn test_ip_integer_and_bool_as_string() {
    let desired = new_state(
        r#"
        interfaces:
        - name: eth1
          type: ethernet
          ipv4:
            enabled: "true"
            dhcp: "false"
            address:
            - ip: 192.168.122.250
              prefix-length: "24"
        "#,
    );
    let iface = desired.ifaces.get("eth1").unwrap();
    let ipv4 = iface.base_iface().ipv4.as_ref().unwrap();
    assert_eq!(ipv4.enabled, Some(true));
    assert_eq!(ipv4.dhcp, Some(false));
    assert_eq!(
        ipv4.addresses.as_ref().unwrap()[0].to_string(),
        "192.168.122.250/24"
    );
}

#[test]
fn test_ipv4_address_implies_enabled() {
    let desired = new_state(
        r#"
        interfaces:
        - name: eth2
          ipv4:
            address:
            - ip: 192.168.122.251
              prefix-length: 24
        "#,
    );
    let merged = MergedNetworkState::new(desired, current_state()).unwrap();
    let iface = merged.ifaces.get("eth2").unwrap();

    let expected: InterfaceIpv4 = serde_yaml::from_str(
        r#"
        enabled: true
        dhcp: false
        address:
        - ip: 192.168.122.251
          prefix-length: 24
        "#,
    )
    .unwrap();
    assert_eq!(iface.merged.base_iface().ipv4.as_ref(), Some(&expected));
}

#[test]
fn test_ipv4_disable_purges_addresses() {
    let desired = new_state(
        r#"
        interfaces:
        - name: eth1
          ipv4:
            enabled: false
        "#,
    );
    let merged = MergedNetworkState::new(desired, current_state()).unwrap();
    let iface = merged.ifaces.get("eth1").unwrap();
    assert_eq!(
        iface.merged.base_iface().ipv4.as_ref(),
        Some(&InterfaceIpv4::new())
    );
}

#[test]
fn test_ipv6_link_local_address_ignored() {
    let merged =
        MergedNetworkState::new(NetworkState::new(), current_state()).unwrap();
    let iface = merged.ifaces.get("eth1").unwrap();
    assert_eq!(
        iface
            .merged
            .base_iface()
            .ipv6
            .as_ref()
            .and_then(|i| i.addresses.as_ref()),
        Some(&Vec::new())
    );
}
