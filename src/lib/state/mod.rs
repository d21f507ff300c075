// SPDX-License-Identifier: Apache-2.0

mod dns;
mod iface;
mod iface_state;
mod iface_trait;
mod iface_type;
mod ifaces;
pub(crate) mod ip;
mod merged;
mod net_state;
mod route;

pub(crate) mod deserializer;
pub(crate) mod value;

pub use self::dns::{DnsClientState, DnsState};
pub use self::iface::Interface;
pub use self::iface_state::InterfaceState;
pub use self::iface_trait::NetrecInterface;
pub use self::iface_type::InterfaceType;
pub use self::ifaces::{
    BaseInterface, BondConfig, BondInterface, BondMode, DummyInterface,
    EthernetInterface, Interfaces, LinuxBridgeConfig, LinuxBridgeInterface,
    LinuxBridgePortConfig, LoopbackInterface, UnknownInterface, VlanConfig,
    VlanInterface, VxlanConfig, VxlanInterface,
};
pub use self::ip::{InterfaceIpAddr, InterfaceIpv4, InterfaceIpv6};
pub use self::merged::{
    MergedDnsState, MergedInterface, MergedInterfaces, MergedNetworkState,
    MergedRoutes,
};
pub use self::net_state::NetworkState;
pub use self::route::{RouteEntry, RouteState, Routes};
