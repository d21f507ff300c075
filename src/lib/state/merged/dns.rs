// SPDX-License-Identifier: Apache-2.0

use serde::Serialize;

use crate::{DnsState, JsonDisplay, NetrecError, VerificationMismatch};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, JsonDisplay)]
#[non_exhaustive]
pub struct MergedDnsState {
    pub desired: DnsState,
    pub current: DnsState,
    pub merged: DnsState,
}

impl MergedDnsState {
    pub(crate) fn new(
        mut desired: DnsState,
        mut current: DnsState,
    ) -> Result<Self, NetrecError> {
        desired.sanitize()?;
        current.normalize();
        let merged = current.merge(&desired);
        Ok(Self {
            desired,
            current,
            merged,
        })
    }

    pub fn is_changed(&self) -> bool {
        self.merged != self.current
    }

    pub(crate) fn verify(
        &self,
        current: &DnsState,
        mismatches: &mut Vec<VerificationMismatch>,
    ) -> Result<(), NetrecError> {
        if let Some(des_conf) = self.desired.config.as_ref() {
            let mut current = current.clone();
            current.normalize();
            crate::state::value::get_json_value_difference(
                "dns-resolver.config".to_string(),
                &serde_json::to_value(des_conf)?,
                &serde_json::to_value(&current.config)?,
                mismatches,
            );
        }
        Ok(())
    }
}
