// SPDX-License-Identifier: Apache-2.0

use std::net::IpAddr;

use serde::{Deserialize, Serialize};

use crate::{
    BaseInterface, ErrorKind, InterfaceType, JsonDisplay, NetrecError,
    NetrecInterface,
};

const VXLAN_ID_MAX: u32 = (1 << 24) - 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonDisplay)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
#[non_exhaustive]
/// VxLAN interface.
/// ```yml
/// interfaces:
/// - name: eth1.102
///   type: vxlan
///   state: up
///   vxlan:
///     base-iface: eth1
///     id: 102
///     remote: 192.0.2.1
///     destination-port: 4789
/// ```
pub struct VxlanInterface {
    #[serde(flatten)]
    pub base: BaseInterface,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vxlan: Option<VxlanConfig>,
}

impl Default for VxlanInterface {
    fn default() -> Self {
        Self {
            base: BaseInterface {
                iface_type: InterfaceType::Vxlan,
                ..Default::default()
            },
            vxlan: None,
        }
    }
}

impl VxlanInterface {
    pub fn new(name: String, vxlan: VxlanConfig) -> Self {
        Self {
            base: BaseInterface::new(name, InterfaceType::Vxlan),
            vxlan: Some(vxlan),
        }
    }
}

impl NetrecInterface for VxlanInterface {
    fn base_iface(&self) -> &BaseInterface {
        &self.base
    }

    fn base_iface_mut(&mut self) -> &mut BaseInterface {
        &mut self.base
    }

    fn is_virtual(&self) -> bool {
        true
    }

    fn parent(&self) -> Option<&str> {
        self.vxlan.as_ref().and_then(|v| v.base_iface.as_deref())
    }

    fn validate_iface_specific(
        &self,
        path: &str,
        current: Option<&Self>,
    ) -> Result<(), NetrecError> {
        let conf = self.vxlan.as_ref();
        if current.is_none() && !self.is_absent() {
            if conf.and_then(|v| v.id).is_none() {
                return Err(NetrecError::new(
                    ErrorKind::ValidationError,
                    format!(
                        "{path}.vxlan.id: mandatory for creating new VxLAN {}",
                        self.name()
                    ),
                ));
            }
            if conf.and_then(|v| v.base_iface.as_ref()).is_none() {
                return Err(NetrecError::new(
                    ErrorKind::ValidationError,
                    format!(
                        "{path}.vxlan.base-iface: mandatory for creating new \
                         VxLAN {}",
                        self.name()
                    ),
                ));
            }
        }
        if let Some(id) = conf.and_then(|v| v.id) {
            if id > VXLAN_ID_MAX {
                return Err(NetrecError::new(
                    ErrorKind::ValidationError,
                    format!(
                        "{path}.vxlan.id: Invalid VxLAN ID {id}, should be in \
                         the range of 0 to {VXLAN_ID_MAX}"
                    ),
                ));
            }
        }
        Ok(())
    }

    fn merge_iface_specific(&mut self, desired: &Self) {
        if let Some(des_conf) = desired.vxlan.as_ref() {
            let mut conf = self.vxlan.take().unwrap_or_default();
            if des_conf.base_iface.is_some() {
                conf.base_iface.clone_from(&des_conf.base_iface);
            }
            if des_conf.id.is_some() {
                conf.id = des_conf.id;
            }
            if des_conf.remote.is_some() {
                conf.remote = des_conf.remote;
            }
            if des_conf.dst_port.is_some() {
                conf.dst_port = des_conf.dst_port;
            }
            self.vxlan = Some(conf);
        }
    }

    /// VxLAN ID and parent are only configurable on creation.
    fn need_delete_before_change(&self, current: &Self) -> bool {
        let des = self.vxlan.as_ref();
        let cur = current.vxlan.as_ref();
        des.and_then(|c| c.id) != cur.and_then(|c| c.id)
            || des.and_then(|c| c.base_iface.as_deref())
                != cur.and_then(|c| c.base_iface.as_deref())
    }
}

#[derive(
    Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonDisplay,
)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
#[non_exhaustive]
pub struct VxlanConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_iface: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        default,
        deserialize_with = "crate::state::deserializer::option_u32_or_string"
    )]
    pub id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<IpAddr>,
    /// Serialize and deserialize to/from `destination-port`.
    #[serde(
        rename = "destination-port",
        skip_serializing_if = "Option::is_none",
        default,
        deserialize_with = "crate::state::deserializer::option_u16_or_string"
    )]
    pub dst_port: Option<u16>,
}

impl VxlanConfig {
    pub fn new(base_iface: String, id: u32) -> Self {
        Self {
            base_iface: Some(base_iface),
            id: Some(id),
            ..Default::default()
        }
    }
}
