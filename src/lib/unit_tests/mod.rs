// SPDX-License-Identifier: Apache-2.0

mod config;
mod dns;
mod ip;
mod memory;
mod merge;
mod plan;
mod route;
mod verify;

use crate::NetworkState;

pub(crate) const CURRENT_STATE_YAML: &str = r#"
interfaces:
- name: lo
  type: loopback
  state: up
  mtu: 65536
  ipv4:
    enabled: true
    dhcp: false
    address:
    - ip: 127.0.0.1
      prefix-length: 8
  ipv6:
    enabled: true
    dhcp: false
    autoconf: false
    address:
    - ip: ::1
      prefix-length: 128
- name: eth1
  type: ethernet
  state: up
  mac-address: 00:23:45:67:89:1A
  mtu: 1500
  min-mtu: 68
  max-mtu: 9000
  ipv4:
    enabled: true
    dhcp: false
    address:
    - ip: 192.168.122.10
      prefix-length: 24
  ipv6:
    enabled: true
    dhcp: false
    autoconf: true
    address:
    - ip: fe80::223:45ff:fe67:891a
      prefix-length: 64
- name: eth2
  type: ethernet
  state: up
  mac-address: 00:23:45:67:89:1B
  mtu: 1500
  min-mtu: 68
  max-mtu: 9000
  ipv4:
    enabled: false
  ipv6:
    enabled: false
- name: eth3
  type: ethernet
  state: up
  mac-address: 00:23:45:67:89:1C
  mtu: 1500
  ipv4:
    enabled: false
  ipv6:
    enabled: false
routes:
  config:
  - destination: 0.0.0.0/0
    next-hop-interface: eth1
    next-hop-address: 192.168.122.1
    metric: 100
dns-resolver:
  config:
    server:
    - 192.168.122.1
    search:
    - example.org
"#;

pub(crate) fn current_state() -> NetworkState {
    NetworkState::new_from_yaml(CURRENT_STATE_YAML).unwrap()
}

pub(crate) fn new_state(yaml: &str) -> NetworkState {
    NetworkState::new_from_yaml(yaml).unwrap()
}
