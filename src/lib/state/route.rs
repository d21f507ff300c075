// SPDX-License-Identifier: Apache-2.0

// This file is based on the work of nmstate project(https://nmstate.io/) which
// is under license of Apache 2.0, authors of original file are:
//  * Gris Ge <fge@redhat.com>
//  * Wen Liang <liangwen12year@gmail.com>
//  * Jan Vaclav <jvaclav@redhat.com>
//  * Íñigo Huguet <ihuguet@redhat.com>
//  * Fernando Fernandez Mancera <ffmancera@riseup.net>

use std::{
    hash::{Hash, Hasher},
    net::IpAddr,
    str::FromStr,
};

use serde::{Deserialize, Deserializer, Serialize};

use super::{
    deserializer::from_value_at,
    ip::{is_ipv6_addr, sanitize_ip_network},
};
use crate::{ErrorKind, JsonDisplay, NetrecError};

const DEFAULT_TABLE_ID: u32 = 254; // main route table ID
const LOOPBACK_IFACE_NAME: &str = "lo";

#[derive(
    Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonDisplay,
)]
#[non_exhaustive]
#[serde(deny_unknown_fields)]
/// IP routing status
pub struct Routes {
    #[serde(
        skip_serializing_if = "Option::is_none",
        default,
        deserialize_with = "option_route_entries"
    )]
    /// Static routes.
    ///
    /// When applying, `None` means preserve current routes.
    /// This property is not overriding but adding specified routes to
    /// existing routes. To delete a route entry, please set
    /// [RouteEntry.state] as [RouteState::Absent]. Any property of absent
    /// [RouteEntry] set to `None` means wildcard. For example, this
    /// [crate::NetworkState] could remove all routes next hop to interface
    /// eth1(showing in yaml):
    /// ```yaml
    /// routes:
    ///   config:
    ///   - next-hop-interface: eth1
    ///     state: absent
    /// ```
    ///
    /// To change a route entry, you need to delete old one and add new one(can
    /// be in single transaction).
    pub config: Option<Vec<RouteEntry>>,
}

impl Routes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether configured routes is empty or undefined.
    pub fn is_empty(&self) -> bool {
        self.config.as_deref().unwrap_or_default().is_empty()
    }

    /// Validate and canonicalize desired routes.
    pub(crate) fn sanitize(&mut self) -> Result<(), NetrecError> {
        if let Some(rts) = self.config.as_mut() {
            for (index, rt) in rts.iter_mut().enumerate() {
                rt.sanitize(&format!("routes.config[{index}]"))?;
            }
        }
        Ok(())
    }

    /// Routes next hop to specified interface.
    pub fn get_iface_routes(&self, iface_name: &str) -> Vec<&RouteEntry> {
        self.config
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter(|r| r.next_hop_iface.as_deref() == Some(iface_name))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum RouteState {
    /// Mark a route entry as absent to remove it.
    Absent,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonDisplay)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
#[non_exhaustive]
/// Route entry
pub struct RouteEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Only used for delete route when applying.
    pub state: Option<RouteState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Route destination address or network
    /// Mandatory for every non-absent routes.
    pub destination: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        rename = "next-hop-interface"
    )]
    /// Route next hop interface name.
    /// Serialize and deserialize to/from `next-hop-interface`.
    /// Mandatory for every non-absent routes.
    pub next_hop_iface: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        rename = "next-hop-address"
    )]
    /// Route next hop IP address.
    /// Serialize and deserialize to/from `next-hop-address`.
    pub next_hop_addr: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        default,
        deserialize_with = "crate::state::deserializer::option_u32_or_string"
    )]
    /// Route metric. `None` means kernel default.
    pub metric: Option<u32>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        default,
        deserialize_with = "crate::state::deserializer::option_u32_or_string"
    )]
    /// Route table id. `None` means main route table(254).
    pub table_id: Option<u32>,
}

impl RouteEntry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn is_absent(&self) -> bool {
        matches!(self.state, Some(RouteState::Absent))
    }

    /// Whether `other` is matched by this route entry. Properties set to
    /// `None` are wildcards.
    pub(crate) fn is_match(&self, other: &Self) -> bool {
        if self.destination.as_ref().is_some()
            && self.destination.as_deref() != Some("")
            && self.destination != other.destination
        {
            return false;
        }
        if self.next_hop_iface.as_ref().is_some()
            && self.next_hop_iface != other.next_hop_iface
        {
            return false;
        }
        if self.next_hop_addr.as_ref().is_some()
            && self.next_hop_addr != other.next_hop_addr
        {
            return false;
        }
        if self.table_id.is_some()
            && self.table_id.unwrap_or(DEFAULT_TABLE_ID)
                != other.table_id.unwrap_or(DEFAULT_TABLE_ID)
        {
            return false;
        }
        if self.metric.is_some() && self.metric != other.metric {
            return false;
        }
        true
    }

    // Return tuple of (no_absent, is_ipv4, next_hop_iface, destination,
    // next_hop_addr, table_id, metric)
    // Absent route will be ignored
    fn sort_key(&self) -> (bool, bool, &str, &str, &str, u32, u32) {
        (
            !self.is_absent(),
            !self.is_ipv6(),
            self.next_hop_iface
                .as_deref()
                .unwrap_or(LOOPBACK_IFACE_NAME),
            self.destination.as_deref().unwrap_or(""),
            self.next_hop_addr.as_deref().unwrap_or(""),
            self.table_id.unwrap_or(DEFAULT_TABLE_ID),
            self.metric.unwrap_or_default(),
        )
    }

    /// Validate and canonicalize the route, `path` is used in error message.
    pub(crate) fn sanitize(&mut self, path: &str) -> Result<(), NetrecError> {
        if let Some(dst) = self.destination.as_deref() {
            let new_dst = sanitize_ip_network(dst).map_err(|e| {
                NetrecError::new(
                    e.kind(),
                    format!("{path}.destination: {}", e.msg()),
                )
            })?;
            if dst != new_dst {
                log::warn!(
                    "Route destination {dst} sanitized to {new_dst}"
                );
            }
            self.destination = Some(new_dst);
        } else if !self.is_absent() {
            return Err(NetrecError::new(
                ErrorKind::ValidationError,
                format!("{path}.destination: mandatory for route to add"),
            ));
        }
        if self.next_hop_iface.is_none() && !self.is_absent() {
            return Err(NetrecError::new(
                ErrorKind::ValidationError,
                format!(
                    "{path}.next-hop-interface: mandatory for route to add"
                ),
            ));
        }
        if let Some(via) = self.next_hop_addr.as_deref() {
            let ip = IpAddr::from_str(via).map_err(|e| {
                NetrecError::new(
                    ErrorKind::ValidationError,
                    format!(
                        "{path}.next-hop-address: Invalid IP address \
                         '{via}': {e}"
                    ),
                )
            })?;
            if let Some(dst) = self.destination.as_deref() {
                if ip.is_ipv6() != is_ipv6_addr(dst) {
                    return Err(NetrecError::new(
                        ErrorKind::ValidationError,
                        format!(
                            "{path}.next-hop-address: Next hop {via} is not \
                             the same IP family as destination {dst}"
                        ),
                    ));
                }
            }
            self.next_hop_addr = Some(ip.to_string());
        }
        Ok(())
    }

    pub(crate) fn is_ipv6(&self) -> bool {
        self.destination.as_deref().map(is_ipv6_addr) == Some(true)
    }
}

// For Vec::dedup()
impl PartialEq for RouteEntry {
    fn eq(&self, other: &Self) -> bool {
        self.sort_key() == other.sort_key()
    }
}

impl Eq for RouteEntry {}

// For Vec::sort_unstable()
impl Ord for RouteEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

// For ord
impl PartialOrd for RouteEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

// For HashSet
impl Hash for RouteEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.sort_key().hash(state);
    }
}

fn option_route_entries<'de, D>(
    deserializer: D,
) -> Result<Option<Vec<RouteEntry>>, D::Error>
where
    D: Deserializer<'de>,
{
    let values: Option<Vec<serde_json::Value>> =
        Option::deserialize(deserializer)?;
    match values {
        Some(values) => {
            let mut routes = Vec::with_capacity(values.len());
            for (index, value) in values.into_iter().enumerate() {
                routes.push(from_value_at::<_, D::Error>(
                    &format!("config[{index}]"),
                    value,
                )?);
            }
            Ok(Some(routes))
        }
        None => Ok(None),
    }
}
