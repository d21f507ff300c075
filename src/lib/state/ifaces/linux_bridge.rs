// SPDX-License-Identifier: Apache-2.0

// This file is based on the work of nmstate project(https://nmstate.io/) which
// is under license of Apache 2.0, authors of original file are:
//  * Gris Ge <fge@redhat.com>
//  * Fernando Fernandez Mancera <ffmancera@riseup.net>
//  * Quique Llorente <ellorent@redhat.com>

use serde::{Deserialize, Serialize};

use super::bond::validate_ports;
use crate::{
    BaseInterface, InterfaceType, JsonDisplay, NetrecError, NetrecInterface,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonDisplay)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
#[non_exhaustive]
/// Bridge interface provided by linux kernel.
/// ```yml
/// interfaces:
/// - name: br0
///   type: linux-bridge
///   state: up
///   bridge:
///     port:
///     - name: eth1
/// ```
pub struct LinuxBridgeInterface {
    #[serde(flatten)]
    pub base: BaseInterface,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bridge: Option<LinuxBridgeConfig>,
}

impl Default for LinuxBridgeInterface {
    fn default() -> Self {
        Self {
            base: BaseInterface {
                iface_type: InterfaceType::LinuxBridge,
                ..Default::default()
            },
            bridge: None,
        }
    }
}

impl LinuxBridgeInterface {
    pub fn new(name: String, ports: Vec<String>) -> Self {
        Self {
            base: BaseInterface::new(name, InterfaceType::LinuxBridge),
            bridge: Some(LinuxBridgeConfig {
                port: Some(
                    ports
                        .into_iter()
                        .map(|name| LinuxBridgePortConfig { name })
                        .collect(),
                ),
            }),
        }
    }
}

impl NetrecInterface for LinuxBridgeInterface {
    fn base_iface(&self) -> &BaseInterface {
        &self.base
    }

    fn base_iface_mut(&mut self) -> &mut BaseInterface {
        &mut self.base
    }

    fn is_virtual(&self) -> bool {
        true
    }

    fn ports(&self) -> Option<Vec<&str>> {
        self.bridge
            .as_ref()
            .and_then(|b| b.port.as_ref())
            .map(|ports| ports.iter().map(|p| p.name.as_str()).collect())
    }

    fn validate_iface_specific(
        &self,
        path: &str,
        _current: Option<&Self>,
    ) -> Result<(), NetrecError> {
        validate_ports(path, "bridge", self.name(), self.ports())
    }

    fn normalize_iface_specific(&mut self) {
        if let Some(ports) =
            self.bridge.as_mut().and_then(|b| b.port.as_mut())
        {
            ports.sort_unstable_by(|a, b| a.name.cmp(&b.name));
            ports.dedup();
        }
    }

    fn merge_iface_specific(&mut self, desired: &Self) {
        if let Some(des_ports) =
            desired.bridge.as_ref().and_then(|b| b.port.as_ref())
        {
            let mut conf = self.bridge.take().unwrap_or_default();
            conf.port = Some(des_ports.clone());
            self.bridge = Some(conf);
        } else if self.bridge.is_none() && desired.bridge.is_some() {
            self.bridge.clone_from(&desired.bridge);
        }
        self.normalize_iface_specific();
    }

    fn sanitize_before_verify_iface_specific(&mut self, current: &mut Self) {
        self.normalize_iface_specific();
        current.normalize_iface_specific();
    }
}

#[derive(
    Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonDisplay,
)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
#[non_exhaustive]
pub struct LinuxBridgeConfig {
    /// When applying with `None`, current ports are preserved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<Vec<LinuxBridgePortConfig>>,
}

#[derive(
    Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonDisplay,
)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
#[non_exhaustive]
pub struct LinuxBridgePortConfig {
    pub name: String,
}

impl LinuxBridgePortConfig {
    pub fn new(name: String) -> Self {
        Self { name }
    }
}
