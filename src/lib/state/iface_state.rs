// SPDX-License-Identifier: Apache-2.0

// This file is based on the work of nmstate project(https://nmstate.io/) which
// is under license of Apache 2.0, authors of original file is:
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
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    JsonDisplay,
)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
/// The state of interface
pub enum InterfaceState {
    /// Interface is administratively up.
    /// Deserialize and serialize from/to 'up'.
    #[default]
    Up,
    /// Interface configuration is kept but link is deactivated.
    /// Deserialize and serialize from/to 'down'.
    Down,
    /// Only for apply action. Virtual interface will be deleted, physical
    /// interface will be brought down with IP disabled. All addresses and
    /// routes of the interface are removed.
    /// Deserialize and serialize from/to 'absent'.
    Absent,
}

impl InterfaceState {
    pub fn is_up(&self) -> bool {
        *self == Self::Up
    }

    pub fn is_down(&self) -> bool {
        *self == Self::Down
    }

    pub fn is_absent(&self) -> bool {
        *self == Self::Absent
    }
}
