// SPDX-License-Identifier: Apache-2.0

//! Declarative network state reconciliation.
//!
//! Caller provides partial desired [NetworkState], [NetrecEngine] merges it
//! with current state queried from [NetrecBackend], generates ordered
//! [Operation]s, applies them under a checkpoint, verifies the outcome and
//! rolls back on any failure.

mod backend;
mod checkpoint;
mod config;
mod engine;
mod error;
mod logging;
mod memory;
mod plan;
mod state;
mod verify;

pub use self::backend::{dispatch_operation, NetrecBackend};
pub use self::config::{NetrecApplyOption, NetrecVerifyRetry};
pub use self::engine::{ApplyPhase, NetrecEngine};
pub use self::error::{ErrorKind, NetrecError, VerificationMismatch};
pub use self::logging::NetrecLogLevel;
pub use self::memory::NetrecMemoryBackend;
pub use self::plan::{
    AddressOperation, DnsOperation, InterfaceOperation, Operation,
    RouteOperation,
};
pub use self::state::{
    BaseInterface, BondConfig, BondInterface, BondMode, DnsClientState,
    DnsState, DummyInterface, EthernetInterface, Interface, InterfaceIpAddr,
    InterfaceIpv4, InterfaceIpv6, InterfaceState, InterfaceType, Interfaces,
    LinuxBridgeConfig, LinuxBridgeInterface, LinuxBridgePortConfig,
    LoopbackInterface, MergedDnsState, MergedInterface, MergedInterfaces,
    MergedNetworkState, MergedRoutes, NetrecInterface, NetworkState,
    RouteEntry, RouteState, Routes, UnknownInterface, VlanConfig,
    VlanInterface, VxlanConfig, VxlanInterface,
};

pub(crate) use netrec_derive::JsonDisplay;

#[cfg(test)]
mod unit_tests;
