// SPDX-License-Identifier: Apache-2.0

// This file is based on the work of nmstate project(https://nmstate.io/) which
// is under license of Apache 2.0, authors of original file are:
//  * Gris Ge <fge@redhat.com>
//  * Fernando Fernandez Mancera <ffmancera@riseup.net>
//  * Wen Liang <liangwen12year@gmail.com>
//  * Íñigo Huguet <ihuguet@redhat.com>
//  * Quique Llorente <ellorent@redhat.com>

use serde::Serialize;

use crate::{
    ErrorKind, Interface, InterfaceState, JsonDisplay, NetrecError,
    NetrecInterface, VerificationMismatch,
};

/// Desired, current and merged(target) state of single interface.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, JsonDisplay)]
#[non_exhaustive]
pub struct MergedInterface {
    /// Sanitized desired interface with type resolved.
    pub desired: Option<Interface>,
    /// Normalized current interface.
    pub current: Option<Interface>,
    /// Target interface. Virtual interface marked as absent keeps
    /// [InterfaceState::Absent] here and is not included in target state.
    pub merged: Interface,
}

impl MergedInterface {
    pub(crate) fn new(
        desired: Option<Interface>,
        current: Option<Interface>,
    ) -> Result<Self, NetrecError> {
        let mut merged = match (desired.as_ref(), current.as_ref()) {
            (Some(des), Some(cur)) => cur.merge(des),
            (Some(des), None) => {
                let mut iface = des.clone();
                iface.normalize();
                iface
            }
            (None, Some(cur)) => cur.clone(),
            (None, None) => {
                return Err(NetrecError::new(
                    ErrorKind::Bug,
                    "MergedInterface::new() got both desired and current \
                     set to None"
                        .to_string(),
                ));
            }
        };
        if merged.is_absent() && !merged.is_virtual() {
            log::info!(
                "Physical interface {} marked as absent, bringing it down \
                 with IP disabled",
                merged.name()
            );
            merged.base_iface_mut().state = Some(InterfaceState::Down);
            merged.base_iface_mut().disable_ip();
        }
        Ok(Self {
            desired,
            current,
            merged,
        })
    }

    pub fn name(&self) -> &str {
        self.merged.name()
    }

    pub fn is_desired(&self) -> bool {
        self.desired.is_some()
    }

    /// Virtual interface to be removed.
    pub fn is_deleted(&self) -> bool {
        self.merged.is_absent()
    }

    pub fn is_new(&self) -> bool {
        self.current.is_none() && !self.is_deleted()
    }

    /// Whether target interface differs from current one.
    pub fn is_changed(&self) -> bool {
        match self.current.as_ref() {
            Some(cur) => self.is_deleted() || cur != &self.merged,
            None => !self.is_deleted(),
        }
    }

    /// Interface going from up to down or absent.
    pub(crate) fn is_deactivating(&self) -> bool {
        self.current.as_ref().map(|c| c.is_up()) == Some(true)
            && !self.merged.is_up()
    }

    /// Desired interface holding the target value of IP and MAC properties
    /// mentioned in desired state.
    fn for_verify(&self) -> Option<Interface> {
        let desired = self.desired.as_ref()?;
        let mut ret = desired.clone();
        let base = ret.base_iface_mut();
        let merged_base = self.merged.base_iface();
        if base.ipv4.is_some() {
            base.ipv4.clone_from(&merged_base.ipv4);
        }
        if base.ipv6.is_some() {
            base.ipv6.clone_from(&merged_base.ipv6);
        }
        if base.mac_address.is_some() {
            base.mac_address.clone_from(&merged_base.mac_address);
        }
        Some(ret)
    }

    pub(crate) fn verify(
        &self,
        current: Option<&Interface>,
        mismatches: &mut Vec<VerificationMismatch>,
    ) -> Result<(), NetrecError> {
        let Some(mut des_iface) = self.for_verify() else {
            return Ok(());
        };
        let path = format!("interfaces[{}]", des_iface.name());

        if des_iface.is_absent() {
            if let Some(cur_iface) = current {
                // Physical interface cannot be removed, only virtual one is
                // verified.
                if cur_iface.is_virtual() {
                    mismatches.push(VerificationMismatch::new(
                        path,
                        serde_json::to_value(InterfaceState::Absent)?,
                        serde_json::to_value(cur_iface.iface_state())?,
                    ));
                }
            }
            return Ok(());
        }

        let Some(cur_iface) = current else {
            mismatches.push(VerificationMismatch::new(
                path,
                serde_json::to_value(&des_iface)?,
                serde_json::Value::Null,
            ));
            return Ok(());
        };
        let mut cur_iface = cur_iface.clone();
        cur_iface.normalize();
        des_iface.sanitize_before_verify(&mut cur_iface);

        crate::state::value::get_json_value_difference(
            path,
            &serde_json::to_value(&des_iface)?,
            &serde_json::to_value(&cur_iface)?,
            mismatches,
        );
        Ok(())
    }
}
