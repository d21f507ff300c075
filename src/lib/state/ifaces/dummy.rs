// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

use crate::{BaseInterface, InterfaceType, JsonDisplay, NetrecInterface};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonDisplay)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
#[non_exhaustive]
/// Dummy interface. Only contain information of [BaseInterface].
/// Example yaml outpuf of `[crate::NetworkState]` with dummy interface:
/// ```yml
/// interfaces:
/// - name: dummy1
///   type: dummy
///   state: up
///   mac-address: BE:25:F0:6D:55:64
///   mtu: 1500
///   ipv4:
///     enabled: false
///   ipv6:
///     enabled: false
/// ```
pub struct DummyInterface {
    #[serde(flatten)]
    pub base: BaseInterface,
}

impl Default for DummyInterface {
    fn default() -> Self {
        Self {
            base: BaseInterface {
                iface_type: InterfaceType::Dummy,
                ..Default::default()
            },
        }
    }
}

impl DummyInterface {
    pub fn new(name: String) -> Self {
        Self {
            base: BaseInterface::new(name, InterfaceType::Dummy),
        }
    }
}

impl NetrecInterface for DummyInterface {
    fn base_iface(&self) -> &BaseInterface {
        &self.base
    }

    fn base_iface_mut(&mut self) -> &mut BaseInterface {
        &mut self.base
    }

    fn is_virtual(&self) -> bool {
        true
    }
}
