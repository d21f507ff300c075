// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

use crate::{
    DnsClientState, Interface, InterfaceIpv4, InterfaceIpv6, NetrecInterface,
    RouteEntry,
};

/// Single atomic change to be executed by [crate::NetrecBackend].
///
/// Serialize into JSON/YAML holding `kind` property:
/// ```yaml
/// - kind: create-interface
///   iface:
///     name: eth1.101
///     type: vlan
///     state: up
///     vlan:
///       base-iface: eth1
///       id: 101
///   rank: 1
/// - kind: set-addresses
///   iface-name: eth1.101
///   ipv4:
///     enabled: true
///     dhcp: false
///     address:
///     - ip: 192.0.2.1
///       prefix-length: 24
///   rank: 1
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
#[non_exhaustive]
pub enum Operation {
    /// Create virtual interface holding link level configuration only.
    CreateInterface(InterfaceOperation),
    /// Change link level configuration of existing interface, including
    /// link state and controller.
    ModifyInterface(InterfaceOperation),
    /// Remove virtual interface.
    DeleteInterface(InterfaceOperation),
    /// Replace IPv4 and/or IPv6 configuration.
    SetAddresses(AddressOperation),
    AddRoute(RouteOperation),
    DeleteRoute(RouteOperation),
    /// Replace DNS resolver configuration.
    SetDns(DnsOperation),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
#[non_exhaustive]
pub struct InterfaceOperation {
    /// Link level view of target interface without IP configuration.
    /// For deletion, this is the current interface.
    pub iface: Interface,
    /// Depth in parent/controller dependency graph.
    pub rank: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
#[non_exhaustive]
pub struct AddressOperation {
    pub iface_name: String,
    /// `None` means IPv4 is unchanged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv4: Option<InterfaceIpv4>,
    /// `None` means IPv6 is unchanged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv6: Option<InterfaceIpv6>,
    pub rank: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
#[non_exhaustive]
pub struct RouteOperation {
    pub route: RouteEntry,
    /// Rank of the next hop interface.
    pub rank: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
#[non_exhaustive]
pub struct DnsOperation {
    pub config: DnsClientState,
    pub rank: u32,
}

impl Operation {
    pub fn rank(&self) -> u32 {
        match self {
            Self::CreateInterface(op)
            | Self::ModifyInterface(op)
            | Self::DeleteInterface(op) => op.rank,
            Self::SetAddresses(op) => op.rank,
            Self::AddRoute(op) | Self::DeleteRoute(op) => op.rank,
            Self::SetDns(op) => op.rank,
        }
    }

    /// Kebab-case name of operation kind, e.g. `create-interface`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CreateInterface(_) => "create-interface",
            Self::ModifyInterface(_) => "modify-interface",
            Self::DeleteInterface(_) => "delete-interface",
            Self::SetAddresses(_) => "set-addresses",
            Self::AddRoute(_) => "add-route",
            Self::DeleteRoute(_) => "delete-route",
            Self::SetDns(_) => "set-dns",
        }
    }

    /// Name of interface this operation is acting on.
    pub fn iface_name(&self) -> Option<&str> {
        match self {
            Self::CreateInterface(op)
            | Self::ModifyInterface(op)
            | Self::DeleteInterface(op) => Some(op.iface.name()),
            Self::SetAddresses(op) => Some(op.iface_name.as_str()),
            Self::AddRoute(op) | Self::DeleteRoute(op) => {
                op.route.next_hop_iface.as_deref()
            }
            Self::SetDns(_) => None,
        }
    }

    /// One line human readable summary.
    pub fn describe(&self) -> String {
        match self {
            Self::CreateInterface(op)
            | Self::ModifyInterface(op)
            | Self::DeleteInterface(op) => format!(
                "{} {} {}",
                self.kind(),
                op.iface.iface_type(),
                op.iface.name()
            ),
            Self::SetAddresses(op) => {
                let mut changed = Vec::new();
                if op.ipv4.is_some() {
                    changed.push("ipv4");
                }
                if op.ipv6.is_some() {
                    changed.push("ipv6");
                }
                format!(
                    "{} {} {}",
                    self.kind(),
                    op.iface_name,
                    changed.join(",")
                )
            }
            Self::AddRoute(op) | Self::DeleteRoute(op) => format!(
                "{} {} via {}",
                self.kind(),
                op.route.destination.as_deref().unwrap_or("*"),
                op.route.next_hop_iface.as_deref().unwrap_or("*"),
            ),
            Self::SetDns(op) => format!(
                "{} server {:?} search {:?}",
                self.kind(),
                op.config.server.as_deref().unwrap_or_default(),
                op.config.search.as_deref().unwrap_or_default(),
            ),
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.describe())
    }
}
