// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Deserializer, Serialize};

use super::deserializer::from_value_at;
use crate::{
    DnsState, Interfaces, JsonDisplay, NetrecError, NetrecInterface, Routes,
};

/// Network state
///
/// [NetworkState] is idempotent meaning it could be applied multiple times and
/// generate the same final network state.
///
/// Example yaml(many lines omitted) serialized NetworkState would be:
///
/// ```yaml
/// description: Lab host
/// dns-resolver:
///   config:
///     server:
///     - 2001:db8:1::
///     - 192.0.2.1
///     search: []
/// routes:
///   config:
///   - destination: 2001:db8:a::/64
///     next-hop-interface: eth1
///     next-hop-address: 2001:db8:1::2
///     metric: 108
///     table-id: 200
///   - destination: 192.168.2.0/24
///     next-hop-interface: eth1
///     next-hop-address: 192.168.1.3
///     metric: 108
///     table-id: 200
/// interfaces:
/// - name: eth1
///   type: ethernet
///   state: up
///   mac-address: 0E:F9:2B:28:42:D9
///   mtu: 1500
///   ipv4:
///     enabled: true
///     dhcp: false
///     address:
///     - ip: 192.168.1.3
///       prefix-length: 24
///   ipv6:
///     enabled: true
///     dhcp: false
///     autoconf: false
///     address:
///     - ip: 2001:db8:1::1
///       prefix-length: 64
/// ```
#[derive(
    Clone,
    Debug,
    Deserialize,
    Serialize,
    Default,
    PartialEq,
    Eq,
    JsonDisplay,
)]
#[serde(deny_unknown_fields)]
#[non_exhaustive]
pub struct NetworkState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Description for the whole desire state.
    pub description: Option<String>,
    /// DNS resolver
    #[serde(
        rename = "dns-resolver",
        default,
        skip_serializing_if = "DnsState::is_empty",
        deserialize_with = "dns_at"
    )]
    pub dns: DnsState,
    /// Routes
    #[serde(
        default,
        skip_serializing_if = "Routes::is_empty",
        deserialize_with = "routes_at"
    )]
    pub routes: Routes,
    /// Network interfaces
    #[serde(default, rename = "interfaces")]
    pub ifaces: Interfaces,
}

impl NetworkState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.ifaces.is_empty() && self.routes.is_empty() && self.dns.is_empty()
    }

    /// Parse YAML document. Malformed content or invalid property is reported
    /// as [crate::ErrorKind::ValidationError] holding the property path.
    pub fn new_from_yaml(net_state_yaml: &str) -> Result<Self, NetrecError> {
        let value: serde_json::Value = serde_yaml::from_str(net_state_yaml)?;
        Self::new_from_value(value)
    }

    /// Parse JSON document.
    pub fn new_from_json(net_state_json: &str) -> Result<Self, NetrecError> {
        let value: serde_json::Value =
            serde_json::from_str(net_state_json).map_err(|e| {
                NetrecError::new(
                    crate::ErrorKind::ValidationError,
                    format!("Invalid JSON string: {e}"),
                )
            })?;
        Self::new_from_value(value)
    }

    fn new_from_value(value: serde_json::Value) -> Result<Self, NetrecError> {
        if value.is_null() {
            return Ok(Self::new());
        }
        serde_json::from_value(value).map_err(|e| {
            NetrecError::new(crate::ErrorKind::ValidationError, e.to_string())
        })
    }

    /// Serialize to YAML document.
    pub fn to_yaml(&self) -> Result<String, NetrecError> {
        serde_yaml::to_string(self).map_err(|e| {
            NetrecError::new(
                crate::ErrorKind::Bug,
                format!("Failed to serialize NetworkState to YAML: {e}"),
            )
        })
    }

    /// Keep only specified interfaces and the routes next hop to them.
    pub(crate) fn filter_ifaces(&self, iface_names: &[&str]) -> Self {
        let mut ret = Self::new();
        for iface in self.ifaces.iter() {
            if iface_names.contains(&iface.name()) {
                ret.ifaces.push(iface.clone());
            }
        }
        if let Some(rts) = self.routes.config.as_ref() {
            let rts: Vec<_> = rts
                .iter()
                .filter(|rt| {
                    rt.next_hop_iface
                        .as_deref()
                        .map(|n| iface_names.contains(&n))
                        .unwrap_or_default()
                })
                .cloned()
                .collect();
            if !rts.is_empty() {
                ret.routes.config = Some(rts);
            }
        }
        ret
    }
}

fn routes_at<'de, D>(deserializer: D) -> Result<Routes, D::Error>
where
    D: Deserializer<'de>,
{
    from_value_at::<_, D::Error>(
        "routes",
        serde_json::Value::deserialize(deserializer)?,
    )
}

fn dns_at<'de, D>(deserializer: D) -> Result<DnsState, D::Error>
where
    D: Deserializer<'de>,
{
    from_value_at::<_, D::Error>(
        "dns-resolver",
        serde_json::Value::deserialize(deserializer)?,
    )
}
