// SPDX-License-Identifier: Apache-2.0

use std::{net::IpAddr, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{ErrorKind, JsonDisplay, NetrecError};

/// DNS resolver state. Example partial YAML output of [crate::NetworkState]:
/// ```yaml
/// ---
/// dns-resolver:
///   config:
///     server:
///     - 2001:db8:1::250
///     - 192.0.2.250
///     search:
///     - example.org
///     - example.net
/// ```
#[derive(
    Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonDisplay,
)]
#[serde(deny_unknown_fields)]
#[non_exhaustive]
pub struct DnsState {
    /// When applying, `None` means preserve current DNS configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<DnsClientState>,
}

impl DnsState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.config.is_none()
    }

    pub(crate) fn sanitize(&mut self) -> Result<(), NetrecError> {
        if let Some(config) = self.config.as_mut() {
            config.sanitize()?;
        }
        Ok(())
    }

    /// Desired config replaces the current one, `None` properties of desired
    /// config are taken from current.
    pub(crate) fn merge(&self, desired: &Self) -> Self {
        match (self.config.as_ref(), desired.config.as_ref()) {
            (Some(cur), Some(des)) => Self {
                config: Some(cur.merge(des)),
            },
            (None, Some(des)) => Self {
                config: Some(des.clone().normalized()),
            },
            (_, None) => self.clone(),
        }
    }

    pub(crate) fn normalize(&mut self) {
        if let Some(config) = self.config.take() {
            self.config = Some(config.normalized());
        }
    }
}

#[derive(
    Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonDisplay,
)]
#[serde(deny_unknown_fields)]
#[non_exhaustive]
/// DNS Client state
pub struct DnsClientState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Name server IP address list.
    /// To remove all existing servers, please use `Some(Vec::new())`.
    /// If undefined(set to `None`), will preserve current config.
    pub server: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Search list for host-name lookup.
    /// To remove all existing search, please use `Some(Vec::new())`.
    /// If undefined(set to `None`), will preserve current config.
    pub search: Option<Vec<String>>,
}

impl DnsClientState {
    pub fn new() -> Self {
        Self::default()
    }

    fn sanitize(&mut self) -> Result<(), NetrecError> {
        if let Some(srvs) = self.server.as_mut() {
            for (index, srv) in srvs.iter_mut().enumerate() {
                let ip = IpAddr::from_str(srv).map_err(|e| {
                    NetrecError::new(
                        ErrorKind::ValidationError,
                        format!(
                            "dns-resolver.config.server[{index}]: Invalid DNS \
                             server IP address '{srv}': {e}"
                        ),
                    )
                })?;
                *srv = ip.to_string();
            }
        }
        if let Some(searches) = self.search.as_mut() {
            for (index, search) in searches.iter_mut().enumerate() {
                if search.is_empty() || search.contains(char::is_whitespace) {
                    return Err(NetrecError::new(
                        ErrorKind::ValidationError,
                        format!(
                            "dns-resolver.config.search[{index}]: Invalid \
                             search domain '{search}'"
                        ),
                    ));
                }
                search.make_ascii_lowercase();
            }
        }
        Ok(())
    }

    fn merge(&self, desired: &Self) -> Self {
        let mut ret = self.clone();
        if desired.server.is_some() {
            ret.server.clone_from(&desired.server);
        }
        if desired.search.is_some() {
            ret.search.clone_from(&desired.search);
        }
        ret.normalized()
    }

    fn normalized(mut self) -> Self {
        if self.server.is_none() {
            self.server = Some(Vec::new());
        }
        if self.search.is_none() {
            self.search = Some(Vec::new());
        }
        self
    }
}
