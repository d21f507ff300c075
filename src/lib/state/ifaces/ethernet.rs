// SPDX-License-Identifier: Apache-2.0

// This file is based on the work of nmstate project(https://nmstate.io/) which
// is under license of Apache 2.0, authors of original file are:
//  * Gris Ge <fge@redhat.com>
//  * Marcelo Guerrero <marguerr@redhat.com>

use serde::{Deserialize, Serialize};

use crate::{BaseInterface, InterfaceType, JsonDisplay, NetrecInterface};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonDisplay)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
#[non_exhaustive]
/// Ethernet(IEEE 802.3) interface.
/// The example yaml output of [crate::NetworkState] with an ethernet
/// interface would be:
/// ```yml
/// interfaces:
/// - name: eth1
///   type: ethernet
///   state: up
///   mac-address: 00:23:45:67:89:1A
///   mtu: 1500
///   min-mtu: 68
///   max-mtu: 9600
///   ipv4:
///     enabled: false
///   ipv6:
///     enabled: false
/// ```
pub struct EthernetInterface {
    #[serde(flatten)]
    pub base: BaseInterface,
}

impl Default for EthernetInterface {
    fn default() -> Self {
        Self {
            base: BaseInterface {
                iface_type: InterfaceType::Ethernet,
                ..Default::default()
            },
        }
    }
}

impl EthernetInterface {
    pub fn new(name: String) -> Self {
        Self {
            base: BaseInterface::new(name, InterfaceType::Ethernet),
        }
    }
}

impl NetrecInterface for EthernetInterface {
    fn base_iface(&self) -> &BaseInterface {
        &self.base
    }

    fn base_iface_mut(&mut self) -> &mut BaseInterface {
        &mut self.base
    }

    fn is_virtual(&self) -> bool {
        false
    }
}
