// SPDX-License-Identifier: Apache-2.0

use serde::Serialize;

use crate::{
    ErrorKind, JsonDisplay, MergedDnsState, MergedInterfaces, MergedRoutes,
    NetrecError, NetworkState, VerificationMismatch,
};

/// Result of merging partial desired state into current state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, JsonDisplay)]
#[non_exhaustive]
pub struct MergedNetworkState {
    pub description: Option<String>,
    pub ifaces: MergedInterfaces,
    pub routes: MergedRoutes,
    pub dns: MergedDnsState,
}

impl MergedNetworkState {
    pub fn new(
        desired: NetworkState,
        current: NetworkState,
    ) -> Result<Self, NetrecError> {
        let ifaces = MergedInterfaces::new(desired.ifaces, current.ifaces)?;
        let routes =
            MergedRoutes::new(desired.routes, current.routes, &ifaces)?;
        let dns = MergedDnsState::new(desired.dns, current.dns)?;

        Ok(Self {
            description: desired.description,
            ifaces,
            routes,
            dns,
        })
    }

    /// The full state expected after apply.
    pub fn target(&self) -> NetworkState {
        let mut ret = NetworkState::new();
        ret.description.clone_from(&self.description);
        ret.ifaces = self.ifaces.target();
        ret.routes = self.routes.target();
        ret.dns = self.dns.merged.clone();
        ret
    }

    /// Compare `current` with properties mentioned in desired state, every
    /// mismatch is included in the returned error.
    pub fn verify(&self, current: &NetworkState) -> Result<(), NetrecError> {
        let mut mismatches: Vec<VerificationMismatch> = Vec::new();
        self.ifaces.verify(&current.ifaces, &mut mismatches)?;
        self.routes.verify(&current.routes, &mut mismatches)?;
        self.dns.verify(&current.dns, &mut mismatches)?;

        if let Some(first) = mismatches.first() {
            let msg = format!(
                "{} propert{} not converged, first one {}: desired {}, \
                 current {}",
                mismatches.len(),
                if mismatches.len() == 1 { "y" } else { "ies" },
                first.path,
                first.desired,
                first.current
            );
            Err(NetrecError::new(ErrorKind::VerificationError, msg)
                .with_mismatches(mismatches))
        } else {
            Ok(())
        }
    }
}
