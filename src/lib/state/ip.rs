// SPDX-License-Identifier: Apache-2.0

// This file is based on the work of nmstate project(https://nmstate.io/) which
// is under license of Apache 2.0, authors of original file are:
//  * Gris Ge <fge@redhat.com>
//  * Fernando Fernandez Mancera <ffmancera@riseup.net>
//  * Wen Liang <liangwen12year@gmail.com>
//  * Íñigo Huguet <ihuguet@redhat.com>
//  * Quique Llorente <ellorent@redhat.com>

use std::{
    net::{IpAddr, Ipv4Addr, Ipv6Addr},
    str::FromStr,
};

use serde::{Deserialize, Deserializer, Serialize};

use super::deserializer::from_value_at;
use crate::{ErrorKind, JsonDisplay, NetrecError};

const IPV4_ADDR_LEN: usize = 32;
const IPV6_ADDR_LEN: usize = 128;

/// IPv4 configuration of interface.
/// Example YAML output of interface holding static IPv4:
/// ```yaml
/// ---
/// interfaces:
/// - name: eth1
///   state: up
///   ipv4:
///     address:
///     - ip: 192.0.2.252
///       prefix-length: 24
///     - ip: 192.0.2.251
///       prefix-length: 24
///     dhcp: false
///     enabled: true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonDisplay)]
#[non_exhaustive]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct InterfaceIpv4 {
    /// Whether IPv4 stack is enabled. When set to false, all IPv4 address will
    /// be removed from this interface.
    /// When applying with undefined, current setting is preserved unless
    /// addresses or DHCP is desired which implies `enabled: true`.
    #[serde(
        skip_serializing_if = "Option::is_none",
        default,
        deserialize_with = "crate::state::deserializer::option_bool_or_string"
    )]
    pub enabled: Option<bool>,
    /// Whether DHCPv4 is enabled.
    #[serde(
        skip_serializing_if = "Option::is_none",
        default,
        deserialize_with = "crate::state::deserializer::option_bool_or_string"
    )]
    pub dhcp: Option<bool>,
    /// IPv4 addresses.
    /// When applying with `None`, current IP address will be preserved.
    /// When applying with `Some(Vec::new())`, all IP address will be removed.
    /// The IP addresses will apply to kernel with the same order specified
    /// which result the IP addresses after first one holding the `secondary`
    /// flag.
    #[serde(
        skip_serializing_if = "Option::is_none",
        rename = "address",
        default,
        deserialize_with = "option_ip_addrs"
    )]
    pub addresses: Option<Vec<InterfaceIpAddr>>,
}

impl Default for InterfaceIpv4 {
    /// Create [InterfaceIpv4] with IP disabled.
    fn default() -> Self {
        Self {
            enabled: Some(false),
            dhcp: None,
            addresses: None,
        }
    }
}

impl InterfaceIpv4 {
    /// Create [InterfaceIpv4] with IP disabled.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled != Some(false)
    }

    pub fn is_auto(&self) -> bool {
        self.is_enabled() && self.dhcp == Some(true)
    }

    pub(crate) fn validate(&self, path: &str) -> Result<(), NetrecError> {
        for (index, addr) in
            self.addresses.as_deref().unwrap_or_default().iter().enumerate()
        {
            if addr.ip.is_ipv6() {
                return Err(NetrecError::new(
                    ErrorKind::ValidationError,
                    format!(
                        "{path}.address[{index}].ip: Got IPv6 address {addr} \
                         in ipv4 config section"
                    ),
                ));
            }
            if addr.prefix_length as usize > IPV4_ADDR_LEN {
                return Err(NetrecError::new(
                    ErrorKind::ValidationError,
                    format!(
                        "{path}.address[{index}].prefix-length: Invalid IPv4 \
                         network prefix length '{}', should be in the range \
                         of 0 to {IPV4_ADDR_LEN}",
                        addr.prefix_length
                    ),
                ));
            }
        }
        Ok(())
    }

    /// Property level merge: undefined properties of `desired` are taken
    /// from `self`.
    pub(crate) fn merge(&self, desired: &Self) -> Self {
        let mut ret = self.clone();
        if desired.enabled.is_some() {
            ret.enabled = desired.enabled;
        } else if desired.dhcp == Some(true)
            || !desired.addresses.as_deref().unwrap_or_default().is_empty()
        {
            ret.enabled = Some(true);
        }
        if desired.dhcp.is_some() {
            ret.dhcp = desired.dhcp;
        }
        if desired.addresses.is_some() {
            ret.addresses.clone_from(&desired.addresses);
        }
        ret.normalize();
        ret
    }

    /// Convert into the fully defined form used for comparison:
    ///  * Disabled stack holds no DHCP or address.
    ///  * Enabled stack has DHCP and address list defined.
    ///  * Duplicate addresses removed.
    pub(crate) fn normalize(&mut self) {
        if self.is_enabled() {
            self.enabled = Some(true);
            self.dhcp = Some(self.dhcp.unwrap_or_default());
            let mut addrs = self.addresses.take().unwrap_or_default();
            dedup_addresses(&mut addrs);
            self.addresses = Some(addrs);
        } else {
            *self = Self::default();
        }
    }

    /// * Addresses are not verified when DHCP enabled.
    /// * Ignore address order.
    /// * Set current DHCP none to false.
    /// * Set current address none to empty array.
    pub(crate) fn sanitize_before_verify(&mut self, current: &mut Self) {
        if self.is_auto() {
            self.addresses = None;
        }
        if let Some(addrs) = self.addresses.as_mut() {
            addrs.sort_unstable();
        }
        if let Some(addrs) = current.addresses.as_mut() {
            addrs.sort_unstable();
        }
        if current.dhcp.is_none() {
            current.dhcp = Some(false);
        }
        if current.addresses.is_none() {
            current.addresses = Some(Vec::new());
        }
    }
}

/// IPv6 configurations of interface.
/// Example output of interface holding automatic IPv6 settings:
/// ```yaml
/// ---
/// interfaces:
/// - name: eth1
///   state: up
///   ipv4:
///     enabled: false
///   ipv6:
///     address:
///       - ip: 2001:db8:2::1
///         prefix-length: 64
///     autoconf: true
///     dhcp: true
///     enabled: true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonDisplay)]
#[non_exhaustive]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct InterfaceIpv6 {
    /// Whether IPv6 stack is enable. When set to false, the IPv6 stack is
    /// disabled with IPv6 link-local address purged also.
    #[serde(
        skip_serializing_if = "Option::is_none",
        default,
        deserialize_with = "crate::state::deserializer::option_bool_or_string"
    )]
    pub enabled: Option<bool>,
    /// Whether DHCPv6 enabled.
    #[serde(
        skip_serializing_if = "Option::is_none",
        default,
        deserialize_with = "crate::state::deserializer::option_bool_or_string"
    )]
    pub dhcp: Option<bool>,
    /// Whether autoconf via IPv6 router announcement enabled.
    #[serde(
        skip_serializing_if = "Option::is_none",
        default,
        deserialize_with = "crate::state::deserializer::option_bool_or_string"
    )]
    pub autoconf: Option<bool>,
    /// IPv6 addresses. Will not be verified when DHCPv6 or autoconf is
    /// enabled.
    /// When applying with `None`, current IP address will be preserved.
    /// When applying with `Some(Vec::new())`, all IP address will be removed.
    #[serde(
        skip_serializing_if = "Option::is_none",
        rename = "address",
        default,
        deserialize_with = "option_ip_addrs"
    )]
    pub addresses: Option<Vec<InterfaceIpAddr>>,
}

impl Default for InterfaceIpv6 {
    /// Create [InterfaceIpv6] with IP disabled.
    fn default() -> Self {
        Self {
            enabled: Some(false),
            dhcp: None,
            autoconf: None,
            addresses: None,
        }
    }
}

impl InterfaceIpv6 {
    /// New [InterfaceIpv6] with IP disabled.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled != Some(false)
    }

    pub fn is_auto(&self) -> bool {
        self.is_enabled()
            && (self.dhcp == Some(true) || self.autoconf == Some(true))
    }

    pub(crate) fn validate(&self, path: &str) -> Result<(), NetrecError> {
        for (index, addr) in
            self.addresses.as_deref().unwrap_or_default().iter().enumerate()
        {
            if addr.ip.is_ipv4() {
                return Err(NetrecError::new(
                    ErrorKind::ValidationError,
                    format!(
                        "{path}.address[{index}].ip: Got IPv4 address {addr} \
                         in ipv6 config section"
                    ),
                ));
            }
            if addr.prefix_length as usize > IPV6_ADDR_LEN {
                return Err(NetrecError::new(
                    ErrorKind::ValidationError,
                    format!(
                        "{path}.address[{index}].prefix-length: Invalid IPv6 \
                         network prefix length '{}', should be in the range \
                         of 0 to {IPV6_ADDR_LEN}",
                        addr.prefix_length
                    ),
                ));
            }
        }
        Ok(())
    }

    pub(crate) fn merge(&self, desired: &Self) -> Self {
        let mut ret = self.clone();
        if desired.enabled.is_some() {
            ret.enabled = desired.enabled;
        } else if desired.dhcp == Some(true)
            || desired.autoconf == Some(true)
            || !desired.addresses.as_deref().unwrap_or_default().is_empty()
        {
            ret.enabled = Some(true);
        }
        if desired.dhcp.is_some() {
            ret.dhcp = desired.dhcp;
        }
        if desired.autoconf.is_some() {
            ret.autoconf = desired.autoconf;
        }
        if desired.addresses.is_some() {
            ret.addresses.clone_from(&desired.addresses);
        }
        ret.normalize();
        ret
    }

    /// Same as [InterfaceIpv4::normalize()] plus link local addresses
    /// removed as kernel generates them.
    pub(crate) fn normalize(&mut self) {
        if self.is_enabled() {
            self.enabled = Some(true);
            self.dhcp = Some(self.dhcp.unwrap_or_default());
            self.autoconf = Some(self.autoconf.unwrap_or_default());
            let mut addrs = self.addresses.take().unwrap_or_default();
            addrs.retain(|addr| {
                if is_ipv6_unicast_link_local(&addr.ip) {
                    log::info!("Ignoring IPv6 link local address {addr}");
                    false
                } else {
                    true
                }
            });
            dedup_addresses(&mut addrs);
            self.addresses = Some(addrs);
        } else {
            *self = Self::default();
        }
    }

    pub(crate) fn sanitize_before_verify(&mut self, current: &mut Self) {
        if self.is_auto() {
            self.addresses = None;
        }
        if let Some(addrs) = self.addresses.as_mut() {
            addrs.retain(|a| !is_ipv6_unicast_link_local(&a.ip));
            addrs.sort_unstable();
        }
        if let Some(addrs) = current.addresses.as_mut() {
            addrs.retain(|a| !is_ipv6_unicast_link_local(&a.ip));
            addrs.sort_unstable();
        }
        if current.dhcp.is_none() {
            current.dhcp = Some(false);
        }
        if current.autoconf.is_none() {
            current.autoconf = Some(false);
        }
        if current.addresses.is_none() {
            current.addresses = Some(Vec::new());
        }
    }
}

/// IP Address
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
#[non_exhaustive]
pub struct InterfaceIpAddr {
    /// IP address.
    #[serde(deserialize_with = "crate::state::deserializer::ip_addr")]
    pub ip: IpAddr,
    /// Prefix length.
    /// Serialize and deserialize to/from `prefix-length`.
    #[serde(deserialize_with = "crate::state::deserializer::u8_or_string")]
    pub prefix_length: u8,
}

impl InterfaceIpAddr {
    pub fn new(ip: IpAddr, prefix_length: u8) -> Self {
        Self { ip, prefix_length }
    }
}

impl std::fmt::Display for InterfaceIpAddr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.ip, self.prefix_length)
    }
}

impl std::convert::TryFrom<&str> for InterfaceIpAddr {
    type Error = NetrecError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let (ip_str, prefix_str) = value.split_once('/').unwrap_or((value, ""));
        let ip = IpAddr::from_str(ip_str).map_err(|e| {
            NetrecError::new(
                ErrorKind::ValidationError,
                format!("Invalid IP address {ip_str}: {e}"),
            )
        })?;

        let prefix_length = if prefix_str.is_empty() {
            if ip.is_ipv6() {
                IPV6_ADDR_LEN as u8
            } else {
                IPV4_ADDR_LEN as u8
            }
        } else {
            prefix_str.parse::<u8>().map_err(|parse_error| {
                NetrecError::new(
                    ErrorKind::ValidationError,
                    format!("Invalid IP address {value}: {parse_error}"),
                )
            })?
        };
        Ok(Self { ip, prefix_length })
    }
}

fn option_ip_addrs<'de, D>(
    deserializer: D,
) -> Result<Option<Vec<InterfaceIpAddr>>, D::Error>
where
    D: Deserializer<'de>,
{
    let values: Option<Vec<serde_json::Value>> =
        Option::deserialize(deserializer)?;
    match values {
        Some(values) => {
            let mut addrs = Vec::new();
            for (index, value) in values.into_iter().enumerate() {
                addrs.push(from_value_at::<_, D::Error>(
                    &format!("address[{index}]"),
                    value,
                )?);
            }
            Ok(Some(addrs))
        }
        None => Ok(None),
    }
}

fn dedup_addresses(addrs: &mut Vec<InterfaceIpAddr>) {
    let mut seen = Vec::with_capacity(addrs.len());
    addrs.retain(|addr| {
        if seen.contains(addr) {
            log::warn!("Ignoring duplicate IP address {addr}");
            false
        } else {
            seen.push(addr.clone());
            true
        }
    });
}

fn is_ipv6_unicast_link_local(ip: &IpAddr) -> bool {
    if let IpAddr::V6(ip) = ip {
        (ip.segments()[0] & 0xffc0) == 0xfe80
    } else {
        false
    }
}

/// Canonicalize `ip_net` into `<network address>/<prefix length>` format.
pub(crate) fn sanitize_ip_network(ip_net: &str) -> Result<String, NetrecError> {
    let (ip_str, prefix_str) = match ip_net.split_once('/') {
        Some((ip, prefix)) => (ip, Some(prefix)),
        None => (ip_net, None),
    };
    let ip = IpAddr::from_str(ip_str).map_err(|e| {
        NetrecError::new(
            ErrorKind::ValidationError,
            format!("Invalid IP network '{ip_net}': {e}"),
        )
    })?;
    let max_prefix_len = if ip.is_ipv6() {
        IPV6_ADDR_LEN
    } else {
        IPV4_ADDR_LEN
    };
    let prefix_len = match prefix_str {
        Some(prefix_str) => prefix_str.parse::<usize>().map_err(|e| {
            NetrecError::new(
                ErrorKind::ValidationError,
                format!(
                    "Invalid IP network prefix length '{prefix_str}' in \
                     '{ip_net}': {e}"
                ),
            )
        })?,
        None => max_prefix_len,
    };
    if prefix_len > max_prefix_len {
        return Err(NetrecError::new(
            ErrorKind::ValidationError,
            format!(
                "Invalid IP network prefix length '{prefix_len}' in \
                 '{ip_net}', should be in the range of 0 to {max_prefix_len}"
            ),
        ));
    }
    Ok(format!("{}/{prefix_len}", apply_ip_prefix_len(ip, prefix_len)))
}

pub(crate) fn is_ipv6_addr(addr: &str) -> bool {
    addr.contains(':')
}

fn apply_ip_prefix_len(ip: IpAddr, prefix_length: usize) -> IpAddr {
    if prefix_length == 0 {
        return if ip.is_ipv6() {
            IpAddr::V6(0.into())
        } else {
            IpAddr::V4(0.into())
        };
    }

    if (ip.is_ipv6() && prefix_length >= IPV6_ADDR_LEN)
        || (ip.is_ipv4() && prefix_length >= IPV4_ADDR_LEN)
    {
        return ip;
    }

    match ip {
        IpAddr::V6(i) => Ipv6Addr::from(
            u128::from(i) & (u128::MAX << (IPV6_ADDR_LEN - prefix_length)),
        )
        .into(),
        IpAddr::V4(i) => Ipv4Addr::from(
            u32::from(i) & (u32::MAX << (IPV4_ADDR_LEN - prefix_length)),
        )
        .into(),
    }
}
