// SPDX-License-Identifier: Apache-2.0

// This file is based on the work of nmstate project(https://nmstate.io/) which
// is under license of Apache 2.0, authors of original file are:
//  * Gris Ge <fge@redhat.com>
//  * Fernando Fernandez Mancera <ffmancera@riseup.net>
//  * Ales Musil <amusil@redhat.com>
//  * Quique Llorente <ellorent@redhat.com>
//  * Wen Liang <liangwen12year@gmail.com>
//  * Íñigo Huguet <ihuguet@redhat.com>

use serde::{Deserialize, Serialize};

use crate::JsonDisplay;

#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    JsonDisplay,
)]
#[non_exhaustive]
#[serde(rename_all = "kebab-case")]
/// Interface type
pub enum InterfaceType {
    /// Bond interface.
    /// Deserialize and serialize from/to 'bond'
    Bond,
    /// Bridge provided by Linux kernel.
    /// Deserialize and serialize from/to 'linux-bridge'.
    LinuxBridge,
    /// Dummy interface.
    /// Deserialize and serialize from/to 'dummy'.
    Dummy,
    /// Ethernet interface.
    /// Deserialize and serialize from/to 'ethernet'.
    Ethernet,
    /// Loopback interface.
    /// Deserialize and serialize from/to 'loopback'.
    Loopback,
    /// VLAN interface.
    /// Deserialize and serialize from/to 'vlan'.
    Vlan,
    /// VxLAN interface.
    /// Deserialize and serialize from/to 'vxlan'.
    Vxlan,
    /// Interface type not defined in desired state, will be resolved from
    /// current state.
    #[default]
    Unknown,
}

impl InterfaceType {
    pub fn is_unknown(&self) -> bool {
        matches!(self, InterfaceType::Unknown)
    }

    /// Whether interface is created at runtime instead of backed by hardware.
    pub fn is_virtual(&self) -> bool {
        matches!(
            self,
            InterfaceType::Bond
                | InterfaceType::LinuxBridge
                | InterfaceType::Dummy
                | InterfaceType::Vlan
                | InterfaceType::Vxlan
        )
    }

    pub fn is_controller(&self) -> bool {
        matches!(self, InterfaceType::Bond | InterfaceType::LinuxBridge)
    }
}
