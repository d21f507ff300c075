// SPDX-License-Identifier: Apache-2.0

// This file is based on the work of nmstate project(https://nmstate.io/) which
// is under license of Apache 2.0, author of original file is:
//  * Gris Ge <fge@redhat.com>

use serde::{Deserialize, Serialize};

use crate::{
    BaseInterface, ErrorKind, InterfaceType, JsonDisplay, NetrecError,
    NetrecInterface,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonDisplay)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
#[non_exhaustive]
/// Loopback interface. Cannot be removed, the `127.0.0.1/8` and `::1/128`
/// addresses are always kept by kernel.
pub struct LoopbackInterface {
    #[serde(flatten)]
    pub base: BaseInterface,
}

impl Default for LoopbackInterface {
    fn default() -> Self {
        Self {
            base: BaseInterface {
                iface_type: InterfaceType::Loopback,
                ..Default::default()
            },
        }
    }
}

impl LoopbackInterface {
    pub fn new() -> Self {
        Self {
            base: BaseInterface::new("lo".to_string(), InterfaceType::Loopback),
        }
    }
}

impl NetrecInterface for LoopbackInterface {
    fn base_iface(&self) -> &BaseInterface {
        &self.base
    }

    fn base_iface_mut(&mut self) -> &mut BaseInterface {
        &mut self.base
    }

    fn is_virtual(&self) -> bool {
        false
    }

    fn validate_iface_specific(
        &self,
        path: &str,
        _current: Option<&Self>,
    ) -> Result<(), NetrecError> {
        if self.is_absent() || self.is_down() {
            return Err(NetrecError::new(
                ErrorKind::ValidationError,
                format!(
                    "{path}.state: Loopback interface {} cannot be marked \
                     as {}",
                    self.name(),
                    self.iface_state()
                ),
            ));
        }
        if self.base.ipv4.as_ref().map(|i| i.is_enabled()) == Some(false)
            || self.base.ipv6.as_ref().map(|i| i.is_enabled()) == Some(false)
        {
            return Err(NetrecError::new(
                ErrorKind::ValidationError,
                format!(
                    "{path}: Loopback interface {} cannot have IP stack \
                     disabled",
                    self.name()
                ),
            ));
        }
        Ok(())
    }
}
