// SPDX-License-Identifier: Apache-2.0

// This file is based on the work of nmstate project(https://nmstate.io/) which
// is under license of Apache 2.0, authors of original file are:
//  * Gris Ge <fge@redhat.com>
//  * Ales Musil <amusil@redhat.com>
//  * Enrique Llorente <ellorent@redhat.com>
//  * Íñigo Huguet <ihuguet@redhat.com>

use serde::{Deserialize, Serialize};

use crate::{
    BaseInterface, ErrorKind, InterfaceType, JsonDisplay, NetrecError,
    NetrecInterface,
};

const VLAN_ID_MAX: u16 = 4094;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonDisplay)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
#[non_exhaustive]
/// VLAN interface on top of parent interface defined by
/// `vlan.base-iface`.
/// ```yml
/// interfaces:
/// - name: eth1.101
///   type: vlan
///   state: up
///   vlan:
///     base-iface: eth1
///     id: 101
/// ```
pub struct VlanInterface {
    #[serde(flatten)]
    pub base: BaseInterface,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vlan: Option<VlanConfig>,
}

impl Default for VlanInterface {
    fn default() -> Self {
        Self {
            base: BaseInterface {
                iface_type: InterfaceType::Vlan,
                ..Default::default()
            },
            vlan: None,
        }
    }
}

impl VlanInterface {
    pub fn new(name: String, vlan: VlanConfig) -> Self {
        Self {
            base: BaseInterface::new(name, InterfaceType::Vlan),
            vlan: Some(vlan),
        }
    }
}

impl NetrecInterface for VlanInterface {
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
        self.vlan.as_ref().and_then(|v| v.base_iface.as_deref())
    }

    /// VLAN base-iface and id are mandatory for new VLAN
    fn validate_iface_specific(
        &self,
        path: &str,
        current: Option<&Self>,
    ) -> Result<(), NetrecError> {
        let vlan_conf = self.vlan.as_ref();
        if current.is_none() && !self.is_absent() {
            if vlan_conf.and_then(|v| v.base_iface.as_ref()).is_none() {
                return Err(NetrecError::new(
                    ErrorKind::ValidationError,
                    format!(
                        "{path}.vlan.base-iface: mandatory for creating new \
                         VLAN {}",
                        self.name()
                    ),
                ));
            }
            if vlan_conf.and_then(|v| v.id).is_none() {
                return Err(NetrecError::new(
                    ErrorKind::ValidationError,
                    format!(
                        "{path}.vlan.id: mandatory for creating new VLAN {}",
                        self.name()
                    ),
                ));
            }
        }
        if let Some(id) = vlan_conf.and_then(|v| v.id) {
            if id > VLAN_ID_MAX {
                return Err(NetrecError::new(
                    ErrorKind::ValidationError,
                    format!(
                        "{path}.vlan.id: Invalid VLAN ID {id}, should be in \
                         the range of 0 to {VLAN_ID_MAX}"
                    ),
                ));
            }
        }
        if vlan_conf.and_then(|v| v.base_iface.as_deref()) == Some(self.name())
        {
            return Err(NetrecError::new(
                ErrorKind::ValidationError,
                format!(
                    "{path}.vlan.base-iface: VLAN {} cannot use itself as \
                     parent",
                    self.name()
                ),
            ));
        }
        Ok(())
    }

    fn merge_iface_specific(&mut self, desired: &Self) {
        if let Some(des_conf) = desired.vlan.as_ref() {
            let mut conf = self.vlan.take().unwrap_or_default();
            if des_conf.base_iface.is_some() {
                conf.base_iface.clone_from(&des_conf.base_iface);
            }
            if des_conf.id.is_some() {
                conf.id = des_conf.id;
            }
            self.vlan = Some(conf);
        }
    }

    /// Kernel does not support changing VLAN ID or parent of existing VLAN.
    fn need_delete_before_change(&self, current: &Self) -> bool {
        self.vlan != current.vlan
    }
}

#[derive(
    Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonDisplay,
)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
#[non_exhaustive]
pub struct VlanConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_iface: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        default,
        deserialize_with = "crate::state::deserializer::option_u16_or_string"
    )]
    pub id: Option<u16>,
}

impl VlanConfig {
    pub fn new(base_iface: String, id: u16) -> Self {
        Self {
            base_iface: Some(base_iface),
            id: Some(id),
        }
    }
}
