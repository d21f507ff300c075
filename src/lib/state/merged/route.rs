// SPDX-License-Identifier: Apache-2.0

// This file is based on the work of nmstate project(https://nmstate.io/) which
// is under license of Apache 2.0, authors of original file are:
//  * Gris Ge <fge@redhat.com>
//  * Wen Liang <liangwen12year@gmail.com>
//  * Jan Vaclav <jvaclav@redhat.com>
//  * Íñigo Huguet <ihuguet@redhat.com>
//  * Fernando Fernandez Mancera <ffmancera@riseup.net>

use serde::Serialize;

use crate::{
    ErrorKind, JsonDisplay, MergedInterfaces, NetrecError, NetrecInterface,
    RouteEntry, Routes, VerificationMismatch,
};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, JsonDisplay)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub struct MergedRoutes {
    /// Sanitized desired routes
    pub desired: Routes,
    pub current: Routes,
    /// Sorted target routes.
    pub merged: Vec<RouteEntry>,
}

impl MergedRoutes {
    pub(crate) fn new(
        mut desired: Routes,
        current: Routes,
        merged_ifaces: &MergedInterfaces,
    ) -> Result<Self, NetrecError> {
        desired.sanitize()?;

        let desired_routes = desired.config.as_deref().unwrap_or_default();
        for (index, rt) in
            desired_routes.iter().enumerate().filter(|(_, r)| !r.is_absent())
        {
            if let Some(via) = rt.next_hop_iface.as_deref() {
                if let Some(reason) = route_unavailable_reason(
                    merged_ifaces,
                    via,
                    rt.is_ipv6(),
                ) {
                    return Err(NetrecError::new(
                        ErrorKind::ValidationError,
                        format!(
                            "routes.config[{index}].next-hop-interface: The \
                             next hop interface of desired route {rt} {reason}"
                        ),
                    ));
                }
            }
        }

        let mut merged: Vec<RouteEntry> = Vec::new();
        for rt in current.config.as_deref().unwrap_or_default() {
            if let Some(via) = rt.next_hop_iface.as_deref() {
                if let Some(reason) =
                    route_unavailable_reason(merged_ifaces, via, rt.is_ipv6())
                {
                    log::info!("Removing route {rt} as next hop {reason}");
                    continue;
                }
            }
            if desired_routes
                .iter()
                .any(|absent_rt| {
                    absent_rt.is_absent() && absent_rt.is_match(rt)
                })
            {
                log::info!("Removing route {rt} as desired");
                continue;
            }
            merged.push(rt.clone());
        }
        for rt in desired_routes.iter().filter(|r| !r.is_absent()) {
            merged.push(rt.clone());
        }
        merged.sort_unstable();
        merged.dedup();

        Ok(Self {
            desired,
            current,
            merged,
        })
    }

    /// Current routes not found in target.
    pub(crate) fn removed_routes(&self) -> Vec<&RouteEntry> {
        self.current
            .config
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter(|rt| !self.merged.contains(rt))
            .collect()
    }

    /// Target routes not found in current.
    pub(crate) fn added_routes(&self) -> Vec<&RouteEntry> {
        let cur_rts = self.current.config.as_deref().unwrap_or_default();
        self.merged
            .iter()
            .filter(|rt| !cur_rts.contains(rt))
            .collect()
    }

    pub(crate) fn target(&self) -> Routes {
        let mut ret = Routes::new();
        if !self.merged.is_empty() {
            ret.config = Some(self.merged.clone());
        }
        ret
    }

    pub(crate) fn verify(
        &self,
        current: &Routes,
        mismatches: &mut Vec<VerificationMismatch>,
    ) -> Result<(), NetrecError> {
        let cur_rts = current.config.as_deref().unwrap_or_default();
        for (index, rt) in self
            .desired
            .config
            .as_deref()
            .unwrap_or_default()
            .iter()
            .enumerate()
        {
            let path = format!("routes.config[{index}]");
            if rt.is_absent() {
                if let Some(cur_rt) = cur_rts.iter().find(|c| rt.is_match(c)) {
                    mismatches.push(VerificationMismatch::new(
                        path,
                        serde_json::to_value(rt)?,
                        serde_json::to_value(cur_rt)?,
                    ));
                }
            } else if !cur_rts.iter().any(|c| rt.is_match(c)) {
                mismatches.push(VerificationMismatch::new(
                    path,
                    serde_json::to_value(rt)?,
                    serde_json::Value::Null,
                ));
            }
        }
        Ok(())
    }
}

/// Why routes cannot next hop to specified interface in target state.
fn route_unavailable_reason(
    merged_ifaces: &MergedInterfaces,
    iface_name: &str,
    is_ipv6: bool,
) -> Option<&'static str> {
    let Some(iface) = merged_ifaces.get(iface_name) else {
        return Some("does not exist");
    };
    if iface.is_deleted() {
        return Some("is marked as absent");
    }
    let merged = &iface.merged;
    if !merged.is_up() {
        return Some("is not up");
    }
    let base = merged.base_iface();
    if is_ipv6 {
        if base.ipv6.as_ref().map(|i| i.is_enabled()) == Some(false) {
            return Some("has IPv6 disabled");
        }
    } else if base.ipv4.as_ref().map(|i| i.is_enabled()) == Some(false) {
        return Some("has IPv4 disabled");
    }
    None
}
