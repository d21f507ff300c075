// SPDX-License-Identifier: Apache-2.0

// This file is based on the work of nmstate project(https://nmstate.io/) which
// is under license of Apache 2.0, authors of original file are:
//  * Gris Ge <fge@redhat.com>
//  * Fernando Fernandez Mancera <ffmancera@riseup.net>
//  * Rahul Rajesh <rajeshrah22@gmail.com>
//  * Jan Vaclav <jvaclav@redhat.com>
//  * Enrique Llorente <ellorent@redhat.com>
//  * Wen Liang <liangwen12year@gmail.com>
//

use serde::{Deserialize, Serialize};

use crate::{
    BaseInterface, ErrorKind, InterfaceType, JsonDisplay, NetrecError,
    NetrecInterface,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonDisplay)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
#[non_exhaustive]
/// Bond interface.
///
/// Example yaml output of [crate::NetworkState] with a bond interface:
/// ```yml
/// interfaces:
/// - name: bond99
///   type: bond
///   state: up
///   link-aggregation:
///     mode: balance-rr
///     port:
///     - eth1
///     - eth2
/// ```
pub struct BondInterface {
    #[serde(flatten)]
    pub base: BaseInterface,
    #[serde(
        skip_serializing_if = "Option::is_none",
        rename = "link-aggregation"
    )]
    pub bond: Option<BondConfig>,
}

impl Default for BondInterface {
    fn default() -> Self {
        Self {
            base: BaseInterface {
                iface_type: InterfaceType::Bond,
                ..Default::default()
            },
            bond: None,
        }
    }
}

impl BondInterface {
    pub fn new(name: String, bond: BondConfig) -> Self {
        Self {
            base: BaseInterface::new(name, InterfaceType::Bond),
            bond: Some(bond),
        }
    }
}

impl NetrecInterface for BondInterface {
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
        self.bond
            .as_ref()
            .and_then(|b| b.port.as_ref())
            .map(|ports| ports.iter().map(|p| p.as_str()).collect())
    }

    fn validate_iface_specific(
        &self,
        path: &str,
        current: Option<&Self>,
    ) -> Result<(), NetrecError> {
        if current.is_none()
            && !self.is_absent()
            && self.bond.as_ref().and_then(|b| b.mode).is_none()
        {
            return Err(NetrecError::new(
                ErrorKind::ValidationError,
                format!(
                    "{path}.link-aggregation.mode: mandatory for creating \
                     new bond {}",
                    self.name()
                ),
            ));
        }
        validate_ports(path, "link-aggregation", self.name(), self.ports())
    }

    fn normalize_iface_specific(&mut self) {
        if let Some(ports) = self.bond.as_mut().and_then(|b| b.port.as_mut()) {
            ports.sort_unstable();
            ports.dedup();
        }
    }

    fn merge_iface_specific(&mut self, desired: &Self) {
        if let Some(des_conf) = desired.bond.as_ref() {
            let mut conf = self.bond.take().unwrap_or_default();
            if des_conf.mode.is_some() {
                conf.mode = des_conf.mode;
            }
            if des_conf.port.is_some() {
                conf.port.clone_from(&des_conf.port);
            }
            self.bond = Some(conf);
        }
        self.normalize_iface_specific();
    }

    fn sanitize_before_verify_iface_specific(&mut self, current: &mut Self) {
        self.normalize_iface_specific();
        current.normalize_iface_specific();
    }
}

pub(crate) fn validate_ports(
    path: &str,
    section: &str,
    iface_name: &str,
    ports: Option<Vec<&str>>,
) -> Result<(), NetrecError> {
    for (index, port) in ports.unwrap_or_default().iter().enumerate() {
        if *port == iface_name {
            return Err(NetrecError::new(
                ErrorKind::ValidationError,
                format!(
                    "{path}.{section}.port[{index}]: Interface {iface_name} \
                     cannot be port of itself"
                ),
            ));
        }
    }
    Ok(())
}

#[derive(
    Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonDisplay,
)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
#[non_exhaustive]
pub struct BondConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<BondMode>,
    /// Port interface names. When applying with `None`, current ports are
    /// preserved. With `Some(Vec::new())`, all ports are detached.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<Vec<String>>,
}

impl BondConfig {
    pub fn new(mode: BondMode, ports: Vec<String>) -> Self {
        Self {
            mode: Some(mode),
            port: Some(ports),
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    JsonDisplay,
)]
#[non_exhaustive]
/// Bond mode
pub enum BondMode {
    #[serde(rename = "balance-rr", alias = "0")]
    /// Deserialize and serialize from/to `balance-rr`.
    /// You can use integer 0 for deserializing to this mode.
    RoundRobin,
    #[serde(rename = "active-backup", alias = "1")]
    /// Deserialize and serialize from/to `active-backup`.
    /// You can use integer 1 for deserializing to this mode.
    ActiveBackup,
    #[serde(rename = "balance-xor", alias = "2")]
    /// Deserialize and serialize from/to `balance-xor`.
    /// You can use integer 2 for deserializing to this mode.
    XOR,
    #[serde(rename = "broadcast", alias = "3")]
    /// Deserialize and serialize from/to `broadcast`.
    /// You can use integer 3 for deserializing to this mode.
    Broadcast,
    #[serde(rename = "802.3ad", alias = "4")]
    /// Deserialize and serialize from/to `802.3ad`.
    /// You can use integer 4 for deserializing to this mode.
    LACP,
    #[serde(rename = "balance-tlb", alias = "5")]
    /// Deserialize and serialize from/to `balance-tlb`.
    /// You can use integer 5 for deserializing to this mode.
    TLB,
    /// Deserialize and serialize from/to `balance-alb`.
    /// You can use integer 6 for deserializing to this mode.
    #[serde(rename = "balance-alb", alias = "6")]
    ALB,
}
