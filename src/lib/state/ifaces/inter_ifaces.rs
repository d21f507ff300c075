// SPDX-License-Identifier: Apache-2.0

// This file is based on the work of nmstate project(https://nmstate.io/) which
// is under license of Apache 2.0, authors of original file are:
//  * Gris Ge <fge@redhat.com>
//  * Fernando Fernandez Mancera <ffmancera@riseup.net>
//  * Ales Musil <amusil@redhat.com>
//  * Jan Vaclav <jvaclav@redhat.com>
//  * Dan Kenigsberg <danken@redhat.com>
//  * Enrique Llorente <ellorent@redhat.com>
//  * Jan Vaclav <jvaclav@redhat.com>
//  * Rahul Rajesh <rajeshrah22@gmail.com>

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{
    state::deserializer::from_value_at, ErrorKind, Interface, NetrecError,
    NetrecInterface,
};

/// Ordered list of interfaces.
///
/// When serializing, interfaces are stored in the order of insertion.
/// Interface name is expected to be unique, [Interfaces::push()] replaces
/// existing interface holding the same name while deserializing keeps
/// duplicates so the merge process could reject them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct Interfaces {
    ifaces: Vec<Interface>,
}

impl<'de> Deserialize<'de> for Interfaces {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let values = <Vec<serde_json::Value>>::deserialize(deserializer)?;
        let mut ifaces = Vec::with_capacity(values.len());
        for (index, value) in values.into_iter().enumerate() {
            let path = match value.get("name").and_then(|n| n.as_str()) {
                Some(name) => format!("interfaces[{name}]"),
                None => format!("interfaces[{index}]"),
            };
            ifaces.push(from_value_at::<Interface, D::Error>(&path, value)?);
        }
        Ok(Self { ifaces })
    }
}

impl Serialize for Interfaces {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.ifaces.serialize(serializer)
    }
}

impl Interfaces {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.ifaces.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ifaces.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Interface> {
        self.ifaces.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Interface> {
        self.ifaces.iter_mut()
    }

    pub fn to_vec(&self) -> Vec<&Interface> {
        self.ifaces.iter().collect()
    }

    /// Append specified [Interface] or replace the one holding the same
    /// name.
    pub fn push(&mut self, iface: Interface) {
        if let Some(existing) =
            self.ifaces.iter_mut().find(|i| i.name() == iface.name())
        {
            *existing = iface;
        } else {
            self.ifaces.push(iface);
        }
    }

    pub fn get(&self, iface_name: &str) -> Option<&Interface> {
        self.ifaces.iter().find(|i| i.name() == iface_name)
    }

    pub fn get_mut(&mut self, iface_name: &str) -> Option<&mut Interface> {
        self.ifaces.iter_mut().find(|i| i.name() == iface_name)
    }

    pub fn remove(&mut self, iface_name: &str) -> Option<Interface> {
        let index = self.ifaces.iter().position(|i| i.name() == iface_name)?;
        Some(self.ifaces.remove(index))
    }

    pub fn names(&self) -> Vec<&str> {
        self.ifaces.iter().map(|i| i.name()).collect()
    }

    pub(crate) fn sort_by_name(&mut self) {
        self.ifaces.sort_unstable_by(|a, b| a.name().cmp(b.name()));
    }

    pub(crate) fn validate_unique_names(&self) -> Result<(), NetrecError> {
        let mut names: Vec<&str> = Vec::with_capacity(self.ifaces.len());
        for iface in self.ifaces.iter() {
            if names.contains(&iface.name()) {
                return Err(NetrecError::new(
                    ErrorKind::ValidationError,
                    format!(
                        "interfaces[{}]: Interface {} defined more than once",
                        iface.name(),
                        iface.name()
                    ),
                ));
            }
            names.push(iface.name());
        }
        Ok(())
    }
}

impl From<Vec<Interface>> for Interfaces {
    fn from(ifaces: Vec<Interface>) -> Self {
        let mut ret = Self::new();
        for iface in ifaces {
            ret.push(iface);
        }
        ret
    }
}
