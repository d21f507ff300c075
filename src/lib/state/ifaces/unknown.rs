// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Deserializer, Serialize};

use crate::{BaseInterface, JsonDisplay, NetrecInterface};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, JsonDisplay)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
/// Holder for interface with interface type undefined in desired state.
/// During apply action, the interface type is resolved from current
/// interface holding the same name.
pub struct UnknownInterface {
    #[serde(flatten)]
    pub base: BaseInterface,
    #[serde(flatten)]
    pub(crate) other: serde_json::Value,
}

impl UnknownInterface {
    pub fn new(base: BaseInterface) -> Self {
        Self {
            base,
            other: serde_json::Value::Object(Default::default()),
        }
    }
}

impl NetrecInterface for UnknownInterface {
    fn base_iface(&self) -> &BaseInterface {
        &self.base
    }

    fn base_iface_mut(&mut self) -> &mut BaseInterface {
        &mut self.base
    }

    /// Unknown until resolved, treat as virtual so it is never assumed to
    /// exist.
    fn is_virtual(&self) -> bool {
        true
    }
}

impl<'de> Deserialize<'de> for UnknownInterface {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut v = serde_json::Map::deserialize(deserializer)?;
        let mut base_value = serde_json::map::Map::new();
        if let Some(n) = v.remove("name") {
            base_value.insert("name".to_string(), n);
        }
        if let Some(s) = v.remove("state") {
            base_value.insert("state".to_string(), s);
        }
        // The BaseInterface will only have name and state, other properties
        // are validated after interface type resolved.
        let base = BaseInterface::deserialize(serde_json::Value::Object(
            base_value,
        ))
        .map_err(serde::de::Error::custom)?;
        Ok(Self {
            base,
            other: serde_json::Value::Object(v),
        })
    }
}
