// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;

use serde::Serialize;

use crate::{
    state::deserializer::prefix_error_path, ErrorKind, Interface,
    InterfaceState, Interfaces, JsonDisplay, MergedInterface, NetrecError,
    NetrecInterface, VerificationMismatch,
};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, JsonDisplay)]
#[non_exhaustive]
pub struct MergedInterfaces {
    /// Current interfaces in their original order followed by new
    /// interfaces in the order of desired state.
    pub ifaces: Vec<MergedInterface>,
    /// Depth of each interface in the parent/controller dependency graph.
    pub ranks: HashMap<String, u32>,
}

impl MergedInterfaces {
    pub(crate) fn new(
        desired: Interfaces,
        current: Interfaces,
    ) -> Result<Self, NetrecError> {
        desired.validate_unique_names()?;

        let mut current = current;
        for iface in current.iter_mut() {
            iface.normalize();
        }

        let mut desired_ifaces: HashMap<String, Interface> = HashMap::new();
        let mut new_iface_names: Vec<String> = Vec::new();
        for des_iface in desired.iter() {
            let path = format!("interfaces[{}]", des_iface.name());
            let cur_iface = current.get(des_iface.name());
            let Some(des_iface) =
                resolve_desired_iface(&path, des_iface, cur_iface)?
            else {
                continue;
            };
            if cur_iface.is_none() {
                new_iface_names.push(des_iface.name().to_string());
            }
            desired_ifaces.insert(des_iface.name().to_string(), des_iface);
        }

        let mut ifaces = Vec::new();
        for cur_iface in current.iter() {
            ifaces.push(MergedInterface::new(
                desired_ifaces.remove(cur_iface.name()),
                Some(cur_iface.clone()),
            )?);
        }
        for iface_name in new_iface_names {
            if let Some(des_iface) = desired_ifaces.remove(&iface_name) {
                ifaces.push(MergedInterface::new(Some(des_iface), None)?);
            }
        }

        let mut ret = Self {
            ifaces,
            ranks: HashMap::new(),
        };
        ret.resolve_controller_and_ports()?;
        ret.validate_parents()?;
        ret.ranks = crate::plan::gen_dependency_ranks(&ret)?;
        Ok(ret)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MergedInterface> {
        self.ifaces.iter()
    }

    pub fn get(&self, iface_name: &str) -> Option<&MergedInterface> {
        self.ifaces.iter().find(|i| i.name() == iface_name)
    }

    pub fn rank(&self, iface_name: &str) -> u32 {
        self.ranks.get(iface_name).copied().unwrap_or_default()
    }

    /// Target interfaces, excluding the ones been deleted.
    pub fn target(&self) -> Interfaces {
        let mut ret = Interfaces::new();
        for iface in self.ifaces.iter().filter(|i| !i.is_deleted()) {
            ret.push(iface.merged.clone());
        }
        ret
    }

    /// Whether interface exists in target state.
    pub(crate) fn is_available(&self, iface_name: &str) -> bool {
        self.get(iface_name).map(|i| !i.is_deleted()) == Some(true)
    }

    /// Port lists of controllers decide the `controller` property of every
    /// interface. Ports cannot hold IP configuration.
    fn resolve_controller_and_ports(&mut self) -> Result<(), NetrecError> {
        let mut port_to_ctrl: HashMap<String, String> = HashMap::new();
        for ctrl in self.ifaces.iter().filter(|i| !i.is_deleted()) {
            for port in ctrl.merged.ports().unwrap_or_default() {
                let path = format!("interfaces[{}]", ctrl.name());
                if !self.is_available(port) {
                    return Err(NetrecError::new(
                        ErrorKind::ValidationError,
                        format!(
                            "{path}: Port {port} of interface {} does not \
                             exist or is marked as absent",
                            ctrl.name()
                        ),
                    ));
                }
                if let Some(other_ctrl) =
                    port_to_ctrl
                        .insert(port.to_string(), ctrl.name().to_string())
                {
                    return Err(NetrecError::new(
                        ErrorKind::ValidationError,
                        format!(
                            "{path}: Interface {port} cannot be port of both \
                             {other_ctrl} and {}",
                            ctrl.name()
                        ),
                    ));
                }
            }
        }

        for iface in self.ifaces.iter_mut().filter(|i| !i.is_deleted()) {
            let new_ctrl = port_to_ctrl.remove(iface.name());
            if let Some(ctrl_name) = new_ctrl.as_deref() {
                let des_ip_enabled = iface
                    .desired
                    .as_ref()
                    .map(|d| {
                        let base = d.base_iface();
                        base.ipv4.as_ref().map(|i| i.is_enabled())
                            == Some(true)
                            || base.ipv6.as_ref().map(|i| i.is_enabled())
                                == Some(true)
                    })
                    .unwrap_or_default();
                if des_ip_enabled {
                    return Err(NetrecError::new(
                        ErrorKind::ValidationError,
                        format!(
                            "interfaces[{}]: Interface {} is port of {}, \
                             cannot hold IP configuration",
                            iface.name(),
                            iface.name(),
                            ctrl_name
                        ),
                    ));
                }
                iface.merged.base_iface_mut().disable_ip();
            }
            let merged_base = iface.merged.base_iface_mut();
            if merged_base.controller != new_ctrl {
                match (merged_base.controller.as_deref(), new_ctrl.as_deref())
                {
                    (Some(old), Some(new)) => log::info!(
                        "Moving interface {} from controller {old} to {new}",
                        merged_base.name
                    ),
                    (Some(old), None) => log::info!(
                        "Detaching interface {} from controller {old}",
                        merged_base.name
                    ),
                    (None, Some(new)) => log::info!(
                        "Attaching interface {} to controller {new}",
                        merged_base.name
                    ),
                    (None, None) => (),
                }
                merged_base.controller = new_ctrl;
            }
        }
        Ok(())
    }

    fn validate_parents(&self) -> Result<(), NetrecError> {
        for iface in self.ifaces.iter().filter(|i| !i.is_deleted()) {
            if let Some(parent) = iface.merged.parent() {
                if !self.is_available(parent) {
                    return Err(NetrecError::new(
                        ErrorKind::ValidationError,
                        format!(
                            "interfaces[{}]: Parent interface {parent} of {} \
                             does not exist or is marked as absent",
                            iface.name(),
                            iface.name()
                        ),
                    ));
                }
            }
        }
        Ok(())
    }

    pub(crate) fn verify(
        &self,
        current: &Interfaces,
        mismatches: &mut Vec<VerificationMismatch>,
    ) -> Result<(), NetrecError> {
        for iface in self.ifaces.iter().filter(|i| i.is_desired()) {
            iface.verify(current.get(iface.name()), mismatches)?;
        }
        Ok(())
    }
}

/// Sanitize, resolve type and validate desired interface.
/// Returns `None` if desired interface should be ignored.
fn resolve_desired_iface(
    path: &str,
    des_iface: &Interface,
    cur_iface: Option<&Interface>,
) -> Result<Option<Interface>, NetrecError> {
    let mut des_iface = if des_iface.iface_type().is_unknown() {
        match cur_iface {
            Some(cur_iface) => des_iface
                .resolve_type(cur_iface.iface_type())
                .map_err(|e| {
                    NetrecError::new(
                        e.kind(),
                        prefix_error_path(path, &e.msg()),
                    )
                })?,
            None if des_iface.is_absent() => {
                log::info!(
                    "Interface {} marked as absent does not exist, ignoring",
                    des_iface.name()
                );
                return Ok(None);
            }
            None => {
                return Err(NetrecError::new(
                    ErrorKind::ValidationError,
                    format!(
                        "{path}.type: mandatory for new interface {}",
                        des_iface.name()
                    ),
                ));
            }
        }
    } else {
        des_iface.clone()
    };

    match cur_iface {
        Some(cur_iface) => {
            if cur_iface.iface_type() != des_iface.iface_type() {
                return Err(NetrecError::new(
                    ErrorKind::ValidationError,
                    format!(
                        "{path}.type: Changing type of interface {} from {} \
                         to {} is not supported, please remove it first",
                        des_iface.name(),
                        cur_iface.iface_type(),
                        des_iface.iface_type()
                    ),
                ));
            }
        }
        None => {
            if des_iface.is_absent() {
                log::info!(
                    "Interface {} marked as absent does not exist, ignoring",
                    des_iface.name()
                );
                return Ok(None);
            }
            if !des_iface.is_virtual() {
                return Err(NetrecError::new(
                    ErrorKind::ValidationError,
                    format!(
                        "{path}: Physical interface {} of type {} not found",
                        des_iface.name(),
                        des_iface.iface_type()
                    ),
                ));
            }
        }
    }

    des_iface.sanitize();
    des_iface.validate(path, cur_iface)?;
    if des_iface.is_absent() {
        log::debug!("Interface {} marked as absent", des_iface.name());
    } else if des_iface.base_iface().state == Some(InterfaceState::Down) {
        log::debug!("Interface {} marked as down", des_iface.name());
    }
    Ok(Some(des_iface))
}
