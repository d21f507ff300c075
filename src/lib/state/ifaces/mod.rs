// SPDX-License-Identifier: Apache-2.0

mod base;
mod bond;
mod dummy;
mod ethernet;
mod inter_ifaces;
mod linux_bridge;
mod loopback;
mod unknown;
mod vlan;
mod vxlan;

pub use self::base::BaseInterface;
pub use self::bond::{BondConfig, BondInterface, BondMode};
pub use self::dummy::DummyInterface;
pub use self::ethernet::EthernetInterface;
pub use self::inter_ifaces::Interfaces;
pub use self::linux_bridge::{
    LinuxBridgeConfig, LinuxBridgeInterface, LinuxBridgePortConfig,
};
pub use self::loopback::LoopbackInterface;
pub use self::unknown::UnknownInterface;
pub use self::vlan::{VlanConfig, VlanInterface};
pub use self::vxlan::{VxlanConfig, VxlanInterface};
