// SPDX-License-Identifier: Apache-2.0

// This file is based on the work of nmstate project(https://nmstate.io/) which
// is under license of Apache 2.0, authors of original file is:
//  * Gris Ge <fge@redhat.com>
//  * Fernando Fernandez Mancera <ffmancera@riseup.net>
//  * Ales Musil <amusil@redhat.com>
//  * Quique Llorente <ellorent@redhat.com>
//  * Wen Liang <liangwen12year@gmail.com>
//  * Íñigo Huguet <ihuguet@redhat.com>

use serde::{Deserialize, Deserializer, Serialize};

use super::deserializer::prefix_error_path;
use crate::{
    BaseInterface, BondInterface, DummyInterface, ErrorKind,
    EthernetInterface, InterfaceState, InterfaceType, JsonDisplay,
    LinuxBridgeInterface, LoopbackInterface, NetrecError, NetrecInterface,
    UnknownInterface, VlanInterface, VxlanInterface,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonDisplay)]
#[serde(rename_all = "kebab-case", untagged)]
#[non_exhaustive]
/// Represent a kernel network interface.
pub enum Interface {
    /// Ethernet interface.
    Ethernet(Box<EthernetInterface>),
    /// Dummy interface.
    Dummy(Box<DummyInterface>),
    /// Loopback interface.
    Loopback(Box<LoopbackInterface>),
    /// VLAN interface.
    Vlan(Box<VlanInterface>),
    /// VxLAN interface.
    Vxlan(Box<VxlanInterface>),
    /// Bond interface.
    Bond(Box<BondInterface>),
    /// Linux bridge interface.
    LinuxBridge(Box<LinuxBridgeInterface>),
    /// Interface with type undefined.
    Unknown(Box<UnknownInterface>),
}

impl Default for Interface {
    fn default() -> Self {
        Self::Unknown(Box::default())
    }
}

impl<'de> Deserialize<'de> for Interface {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut v = serde_json::Value::deserialize(deserializer)?;

        // It is safe to do `v["state"]` here as serde_json will
        // return `json!(null)` for undefined property
        let state: Option<InterfaceState> = Option::deserialize(&v["state"])
            .map_err(|e| {
                serde::de::Error::custom(prefix_error_path("state", &e))
            })?;
        if state == Some(InterfaceState::Absent) {
            // Ignore all properties except name, type and state if absent
            let mut new_value = serde_json::map::Map::new();
            for key in ["name", "type", "state"] {
                if let Some(value) = v.get(key) {
                    new_value.insert(key.to_string(), value.clone());
                }
            }
            v = serde_json::value::Value::Object(new_value);
        }

        let iface_type: Option<InterfaceType> =
            Option::deserialize(&v["type"]).map_err(|e| {
                serde::de::Error::custom(prefix_error_path("type", &e))
            })?;

        Ok(match iface_type {
            Some(InterfaceType::Ethernet) => Interface::Ethernet(Box::new(
                EthernetInterface::deserialize(v)
                    .map_err(serde::de::Error::custom)?,
            )),
            Some(InterfaceType::Dummy) => Interface::Dummy(Box::new(
                DummyInterface::deserialize(v)
                    .map_err(serde::de::Error::custom)?,
            )),
            Some(InterfaceType::Loopback) => Interface::Loopback(Box::new(
                LoopbackInterface::deserialize(v)
                    .map_err(serde::de::Error::custom)?,
            )),
            Some(InterfaceType::Vlan) => Interface::Vlan(Box::new(
                VlanInterface::deserialize(v)
                    .map_err(serde::de::Error::custom)?,
            )),
            Some(InterfaceType::Vxlan) => Interface::Vxlan(Box::new(
                VxlanInterface::deserialize(v)
                    .map_err(serde::de::Error::custom)?,
            )),
            Some(InterfaceType::Bond) => Interface::Bond(Box::new(
                BondInterface::deserialize(v)
                    .map_err(serde::de::Error::custom)?,
            )),
            Some(InterfaceType::LinuxBridge) => {
                Interface::LinuxBridge(Box::new(
                    LinuxBridgeInterface::deserialize(v)
                        .map_err(serde::de::Error::custom)?,
                ))
            }
            Some(InterfaceType::Unknown) | None => {
                Interface::Unknown(Box::new(
                    UnknownInterface::deserialize(v)
                        .map_err(serde::de::Error::custom)?,
                ))
            }
        })
    }
}

macro_rules! gen_iface_no_arg {
    ( $self:ident, $func:ident, $($variant:path,)+ ) => {
        match $self {
            $(
                $variant(i) => i.$func(),
            )+
        }
    };
}

macro_rules! gen_iface_trait_impl {
    ( $(($func:ident, $return:ty),)+ ) => {
        $(
            fn $func(&self) -> $return {
                gen_iface_no_arg!(
                    self,
                    $func,
                    Self::Ethernet,
                    Self::Dummy,
                    Self::Loopback,
                    Self::Vlan,
                    Self::Vxlan,
                    Self::Bond,
                    Self::LinuxBridge,
                    Self::Unknown,
                )
            }
        )+
    }
}

macro_rules! gen_iface_trait_impl_mut {
    ( $(($func:ident, $return:ty),)+ ) => {
        $(
            fn $func(&mut self) -> $return {
                gen_iface_no_arg!(
                    self,
                    $func,
                    Self::Ethernet,
                    Self::Dummy,
                    Self::Loopback,
                    Self::Vlan,
                    Self::Vxlan,
                    Self::Bond,
                    Self::LinuxBridge,
                    Self::Unknown,
                )
            }
        )+
    }
}

macro_rules! gen_merge_iface {
    ( $current:ident, $desired:ident, $($variant:path,)+ ) => {
        match ($current, $desired) {
            $(
                ($variant(c), $variant(d)) => $variant(Box::new(c.merge(d))),
            )+
            (current, desired) => {
                log::error!(
                    "BUG: Interface::merge() got different interface type \
                     current {current:?} desired {desired:?}"
                );
                current.clone()
            }
        }
    };
}

macro_rules! gen_validate_iface {
    ( $desired:ident, $path:ident, $current:ident, $($variant:path,)+ ) => {
        match ($desired, $current) {
            $(
                ($variant(d), Some($variant(c))) => d.validate($path, Some(c)),
                ($variant(d), None) => d.validate($path, None),
            )+
            (desired, Some(current)) => Err(NetrecError::new(
                ErrorKind::Bug,
                format!(
                    "Interface::validate() got different interface type \
                     desired {} current {}",
                    desired.iface_type(),
                    current.iface_type()
                ),
            )),
        }
    };
}

macro_rules! gen_sanitize_before_verify_iface {
    ( $desired:ident, $current:ident, $($variant:path,)+ ) => {
        match ($desired, $current) {
            $(
                ($variant(d), $variant(c)) => d.sanitize_before_verify(c),
            )+
            _ => (),
        }
    };
}

macro_rules! gen_need_delete_before_change {
    ( $desired:ident, $current:ident, $($variant:path,)+ ) => {
        match ($desired, $current) {
            $(
                ($variant(d), $variant(c)) => d.need_delete_before_change(c),
            )+
            _ => true,
        }
    };
}

impl NetrecInterface for Interface {
    gen_iface_trait_impl!(
        (is_virtual, bool),
        (base_iface, &BaseInterface),
        (is_controller, bool),
        (ports, Option<Vec<&str>>),
        (parent, Option<&str>),
    );

    gen_iface_trait_impl_mut!(
        (base_iface_mut, &mut BaseInterface),
        (sanitize, ()),
        (normalize, ()),
    );

    fn merge(&self, desired: &Self) -> Self {
        gen_merge_iface!(
            self,
            desired,
            Interface::Ethernet,
            Interface::Dummy,
            Interface::Loopback,
            Interface::Vlan,
            Interface::Vxlan,
            Interface::Bond,
            Interface::LinuxBridge,
            Interface::Unknown,
        )
    }

    fn validate(
        &self,
        path: &str,
        current: Option<&Self>,
    ) -> Result<(), NetrecError> {
        gen_validate_iface!(
            self,
            path,
            current,
            Interface::Ethernet,
            Interface::Dummy,
            Interface::Loopback,
            Interface::Vlan,
            Interface::Vxlan,
            Interface::Bond,
            Interface::LinuxBridge,
            Interface::Unknown,
        )
    }

    fn sanitize_before_verify(&mut self, current: &mut Self) {
        gen_sanitize_before_verify_iface!(
            self,
            current,
            Interface::Ethernet,
            Interface::Dummy,
            Interface::Loopback,
            Interface::Vlan,
            Interface::Vxlan,
            Interface::Bond,
            Interface::LinuxBridge,
            Interface::Unknown,
        )
    }

    fn need_delete_before_change(&self, current: &Self) -> bool {
        gen_need_delete_before_change!(
            self,
            current,
            Interface::Ethernet,
            Interface::Dummy,
            Interface::Loopback,
            Interface::Vlan,
            Interface::Vxlan,
            Interface::Bond,
            Interface::LinuxBridge,
            Interface::Unknown,
        )
    }
}

impl From<BaseInterface> for Interface {
    fn from(base_iface: BaseInterface) -> Self {
        match &base_iface.iface_type {
            InterfaceType::Ethernet => {
                Interface::Ethernet(Box::new(EthernetInterface::from_base(
                    base_iface,
                )))
            }
            InterfaceType::Dummy => Interface::Dummy(Box::new(
                DummyInterface::from_base(base_iface),
            )),
            InterfaceType::Loopback => Interface::Loopback(Box::new(
                LoopbackInterface::from_base(base_iface),
            )),
            InterfaceType::Vlan => {
                Interface::Vlan(Box::new(VlanInterface::from_base(base_iface)))
            }
            InterfaceType::Vxlan => Interface::Vxlan(Box::new(
                VxlanInterface::from_base(base_iface),
            )),
            InterfaceType::Bond => {
                Interface::Bond(Box::new(BondInterface::from_base(base_iface)))
            }
            InterfaceType::LinuxBridge => Interface::LinuxBridge(Box::new(
                LinuxBridgeInterface::from_base(base_iface),
            )),
            InterfaceType::Unknown => {
                Interface::Unknown(Box::new(UnknownInterface::new(base_iface)))
            }
        }
    }
}

impl Interface {
    /// Remove IP configuration, leaving link layer and type specific
    /// configuration.
    pub(crate) fn clone_link_only(&self) -> Self {
        let mut ret = self.clone();
        *ret.base_iface_mut() = self.base_iface().clone_link_only();
        ret
    }

    /// Convert interface with undefined type into specified type.
    /// Properties stored for unknown interface are validated here.
    pub(crate) fn resolve_type(
        &self,
        iface_type: &InterfaceType,
    ) -> Result<Self, NetrecError> {
        let Interface::Unknown(unknown) = self else {
            return Ok(self.clone());
        };
        let mut value = unknown.other.clone();
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                "name".to_string(),
                serde_json::Value::String(unknown.base.name.clone()),
            );
            if let Some(state) = unknown.base.state {
                obj.insert("state".to_string(), serde_json::to_value(state)?);
            }
            obj.insert("type".to_string(), serde_json::to_value(iface_type)?);
        }
        serde_json::from_value(value).map_err(|e| {
            NetrecError::new(ErrorKind::ValidationError, e.to_string())
        })
    }
}
