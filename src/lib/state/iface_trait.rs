// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

use crate::{BaseInterface, InterfaceState, InterfaceType, NetrecError};

/// Trait implemented by all type of interfaces.
pub trait NetrecInterface:
    std::fmt::Debug + for<'a> Deserialize<'a> + Serialize + Default + Clone
{
    fn base_iface(&self) -> &BaseInterface;

    fn base_iface_mut(&mut self) -> &mut BaseInterface;

    /// Whether interface is created at runtime instead of backed by
    /// hardware.
    fn is_virtual(&self) -> bool;

    /// Whether can hold ports
    fn is_controller(&self) -> bool {
        self.iface_type().is_controller()
    }

    fn name(&self) -> &str {
        self.base_iface().name.as_str()
    }

    fn iface_type(&self) -> &InterfaceType {
        &self.base_iface().iface_type
    }

    fn iface_state(&self) -> InterfaceState {
        self.base_iface().state()
    }

    fn is_up(&self) -> bool {
        self.iface_state().is_up()
    }

    fn is_down(&self) -> bool {
        self.iface_state().is_down()
    }

    fn is_absent(&self) -> bool {
        self.iface_state().is_absent()
    }

    /// Use properties defined in `desired` to override Self.
    /// Will invoke `merge_iface_specific()` at the end.
    /// Please do not override this function but implement
    /// `merge_iface_specific()` instead.
    fn merge(&self, desired: &Self) -> Self {
        let mut ret = self.clone();
        *ret.base_iface_mut() = self.base_iface().merge(desired.base_iface());
        ret.merge_iface_specific(desired);
        ret
    }

    /// Please implemented this function if interface holds type specific
    /// configuration. Do not need to worry about the merge of
    /// [BaseInterface].
    fn merge_iface_specific(&mut self, _desired: &Self) {}

    /// Validate desired interface against current one(if exists). The `path`
    /// is the property path of this interface used in error message.
    /// Will invoke `validate_iface_specific()` at the end.
    fn validate(
        &self,
        path: &str,
        current: Option<&Self>,
    ) -> Result<(), NetrecError> {
        self.base_iface()
            .validate(path, current.map(|c| c.base_iface()))?;
        self.validate_iface_specific(path, current)
    }

    fn validate_iface_specific(
        &self,
        _path: &str,
        _current: Option<&Self>,
    ) -> Result<(), NetrecError> {
        Ok(())
    }

    /// Invoke sanitize on the [BaseInterface] and `sanitize_iface_specific()`.
    /// Sanitation process is performed on desired state before merging:
    ///  * Clean up properties which is for query only.
    ///  * Unify user input format(e.g. upper case MAC address).
    fn sanitize(&mut self) {
        self.base_iface_mut().sanitize();
        self.sanitize_iface_specific();
    }

    fn sanitize_iface_specific(&mut self) {}

    /// Unify the format of current interface so it could be compared with
    /// merged one.
    fn normalize(&mut self) {
        self.base_iface_mut().normalize();
        self.normalize_iface_specific();
    }

    fn normalize_iface_specific(&mut self) {}

    /// Invoke sanitize current for verify on the [BaseInterface] and
    /// `sanitize_before_verify_iface_specific()`
    fn sanitize_before_verify(&mut self, current: &mut Self) {
        self.base_iface_mut()
            .sanitize_before_verify(current.base_iface_mut());
        self.sanitize_before_verify_iface_specific(current);
    }

    fn sanitize_before_verify_iface_specific(&mut self, _current: &mut Self) {}

    /// Return a list of port names. None means not desired or cannot hold
    /// ports
    fn ports(&self) -> Option<Vec<&str>> {
        None
    }

    /// Return parent interface name, None means not desired or no parent
    fn parent(&self) -> Option<&str> {
        None
    }

    /// Whether desired changes need to delete the interface first.
    /// Default implementation is false
    fn need_delete_before_change(&self, _current: &Self) -> bool {
        false
    }

    fn from_base(base_iface: BaseInterface) -> Self {
        let mut new = Self::default();
        *new.base_iface_mut() = base_iface;
        new
    }
}
