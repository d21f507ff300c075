// SPDX-License-Identifier: Apache-2.0

// This file is based on the work of nmstate project(https://nmstate.io/) which
// is under license of Apache 2.0, authors of original file are:
//  * Gris Ge <fge@redhat.com>
//  * Fernando Fernandez Mancera <ffmancera@riseup.net>
//  * Mat Kowalski <mko@redhat.com>

use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    state::deserializer::from_value_at, ErrorKind, InterfaceIpv4,
    InterfaceIpv6, InterfaceState, InterfaceType, JsonDisplay, NetrecError,
};

#[derive(
    Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonDisplay,
)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
#[non_exhaustive]
/// Information shared among all interface types
pub struct BaseInterface {
    pub name: String,
    #[serde(
        default,
        rename = "type",
        skip_serializing_if = "InterfaceType::is_unknown"
    )]
    pub iface_type: InterfaceType,
    /// When applying with `None`, current state is preserved. New interface
    /// defaults to [InterfaceState::Up].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<InterfaceState>,
    /// Controller interface name. Query only, port is attached by listing it
    /// in the port list of controller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller: Option<String>,
    /// MAC address in the format: upper case hex string separated by `:` on
    /// every two characters. Case insensitive when applying.
    /// Serialize and deserialize to/from `mac-address`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<String>,
    /// Whether to accept all MAC addresses (promiscuous mode).
    #[serde(
        skip_serializing_if = "Option::is_none",
        default,
        deserialize_with = "crate::state::deserializer::option_bool_or_string"
    )]
    pub accept_all_mac_addresses: Option<bool>,
    /// Maximum transmission unit.
    #[serde(
        skip_serializing_if = "Option::is_none",
        default,
        deserialize_with = "crate::state::deserializer::option_u64_or_string"
    )]
    pub mtu: Option<u64>,
    /// Minimum MTU allowed. Ignored during apply.
    #[serde(
        skip_serializing_if = "Option::is_none",
        default,
        deserialize_with = "crate::state::deserializer::option_u64_or_string"
    )]
    pub min_mtu: Option<u64>,
    /// Maximum MTU allowed. Ignored during apply.
    #[serde(
        skip_serializing_if = "Option::is_none",
        default,
        deserialize_with = "crate::state::deserializer::option_u64_or_string"
    )]
    pub max_mtu: Option<u64>,
    /// Free text description. Empty string means removal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// IPv4 information.
    /// Hided if interface is not allowed to hold IP information(e.g. port of
    /// bond is not allowed to hold IP information).
    #[serde(
        skip_serializing_if = "Option::is_none",
        default,
        deserialize_with = "option_ipv4"
    )]
    pub ipv4: Option<InterfaceIpv4>,
    /// IPv6 information.
    #[serde(
        skip_serializing_if = "Option::is_none",
        default,
        deserialize_with = "option_ipv6"
    )]
    pub ipv6: Option<InterfaceIpv6>,
}

impl BaseInterface {
    pub fn new(name: String, iface_type: InterfaceType) -> Self {
        Self {
            name,
            iface_type,
            state: Some(InterfaceState::Up),
            ..Default::default()
        }
    }

    pub fn state(&self) -> InterfaceState {
        self.state.unwrap_or_default()
    }

    /// Validate user input, `path` is the property path of this interface
    /// used in error message.
    pub(crate) fn validate(
        &self,
        path: &str,
        current: Option<&Self>,
    ) -> Result<(), NetrecError> {
        if let Some(ipv4) = self.ipv4.as_ref() {
            ipv4.validate(&format!("{path}.ipv4"))?;
        }
        if let Some(ipv6) = self.ipv6.as_ref() {
            ipv6.validate(&format!("{path}.ipv6"))?;
        }
        if let Some(mac) = self.mac_address.as_deref() {
            validate_mac_address(path, mac)?;
        }
        self.validate_mtu(path, current)
    }

    fn validate_mtu(
        &self,
        path: &str,
        current: Option<&Self>,
    ) -> Result<(), NetrecError> {
        if let (Some(desire_mtu), Some(current)) = (self.mtu, current) {
            if let Some(max_mtu) = current.max_mtu {
                if desire_mtu > max_mtu {
                    return Err(NetrecError::new(
                        ErrorKind::ValidationError,
                        format!(
                            "{path}.mtu: Desired MTU {desire_mtu} for \
                             interface {} is bigger than maximum allowed MTU \
                             {max_mtu}",
                            self.name
                        ),
                    ));
                }
            }
            if let Some(min_mtu) = current.min_mtu {
                if desire_mtu < min_mtu {
                    return Err(NetrecError::new(
                        ErrorKind::ValidationError,
                        format!(
                            "{path}.mtu: Desired MTU {desire_mtu} for \
                             interface {} is smaller than minimum allowed \
                             MTU {min_mtu}",
                            self.name
                        ),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Clean up query only properties and unify the format of user input.
    pub(crate) fn sanitize(&mut self) {
        if let Some(mac) = self.mac_address.as_mut() {
            mac.make_ascii_uppercase();
        }
        if self.controller.is_some() {
            log::warn!(
                "Ignoring query only property controller of interface {}, \
                 please define port list in controller instead",
                self.name
            );
            self.controller = None;
        }
        self.min_mtu = None;
        self.max_mtu = None;
    }

    /// Unify current state into the form generated by [Self::merge()].
    pub(crate) fn normalize(&mut self) {
        if self.state.is_none() {
            self.state = Some(InterfaceState::Up);
        }
        if self.description.as_deref() == Some("") {
            self.description = None;
        }
        if let Some(mac) = self.mac_address.as_mut() {
            mac.make_ascii_uppercase();
        }
        if let Some(ipv4) = self.ipv4.as_mut() {
            ipv4.normalize();
        }
        if let Some(ipv6) = self.ipv6.as_mut() {
            ipv6.normalize();
        }
    }

    /// Property level merge: properties defined in `desired` override the
    /// ones of `self`.
    pub(crate) fn merge(&self, desired: &Self) -> Self {
        let mut ret = self.clone();
        if desired.state.is_some() {
            ret.state = desired.state;
        }
        if desired.mac_address.is_some() {
            ret.mac_address.clone_from(&desired.mac_address);
        }
        if desired.mtu.is_some() {
            ret.mtu = desired.mtu;
        }
        if desired.accept_all_mac_addresses.is_some() {
            ret.accept_all_mac_addresses = desired.accept_all_mac_addresses;
        }
        if let Some(des) = desired.description.as_deref() {
            ret.description = if des.is_empty() {
                None
            } else {
                Some(des.to_string())
            };
        }
        if let Some(des_ipv4) = desired.ipv4.as_ref() {
            ret.ipv4 = Some(
                self.ipv4.as_ref().cloned().unwrap_or_default().merge(des_ipv4),
            );
        }
        if let Some(des_ipv6) = desired.ipv6.as_ref() {
            ret.ipv6 = Some(
                self.ipv6.as_ref().cloned().unwrap_or_default().merge(des_ipv6),
            );
        }
        ret.normalize();
        ret
    }

    pub(crate) fn sanitize_before_verify(&mut self, current: &mut Self) {
        self.controller = None;
        current.controller = None;
        if self.description.as_deref() == Some("")
            && current.description.is_none()
        {
            current.description = Some(String::new());
        }
        if let Some(mac) = current.mac_address.as_mut() {
            mac.make_ascii_uppercase();
        }
        if let (Some(des_ipv4), Some(cur_ipv4)) =
            (self.ipv4.as_mut(), current.ipv4.as_mut())
        {
            des_ipv4.sanitize_before_verify(cur_ipv4);
        }
        if let (Some(des_ipv6), Some(cur_ipv6)) =
            (self.ipv6.as_mut(), current.ipv6.as_mut())
        {
            des_ipv6.sanitize_before_verify(cur_ipv6);
        }
    }

    /// Remove IP and query only properties leaving the link layer
    /// configuration.
    pub(crate) fn clone_link_only(&self) -> Self {
        let mut ret = self.clone();
        ret.ipv4 = None;
        ret.ipv6 = None;
        ret.min_mtu = None;
        ret.max_mtu = None;
        ret
    }

    /// Remove all IP configuration with IPv4 and IPv6 stack disabled.
    pub(crate) fn disable_ip(&mut self) {
        self.ipv4 = Some(InterfaceIpv4::default());
        self.ipv6 = Some(InterfaceIpv6::default());
    }
}

fn validate_mac_address(path: &str, mac: &str) -> Result<(), NetrecError> {
    let octets: Vec<&str> = mac.split(':').collect();
    if octets.len() != 6
        || octets
            .iter()
            .any(|o| o.len() != 2 || !o.chars().all(|c| c.is_ascii_hexdigit()))
    {
        return Err(NetrecError::new(
            ErrorKind::ValidationError,
            format!(
                "{path}.mac-address: Invalid MAC address '{mac}', expecting \
                 format like 00:11:22:AA:BB:CC"
            ),
        ));
    }
    Ok(())
}

fn option_ipv4<'de, D>(
    deserializer: D,
) -> Result<Option<InterfaceIpv4>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(v) => Ok(Some(from_value_at::<_, D::Error>("ipv4", v)?)),
        None => Ok(None),
    }
}

fn option_ipv6<'de, D>(
    deserializer: D,
) -> Result<Option<InterfaceIpv6>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(v) => Ok(Some(from_value_at::<_, D::Error>("ipv6", v)?)),
        None => Ok(None),
    }
}
