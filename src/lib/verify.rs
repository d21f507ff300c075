// SPDX-License-Identifier: Apache-2.0

use crate::{
    ErrorKind, MergedNetworkState, NetrecBackend, NetrecError,
    NetrecVerifyRetry,
};

/// Query the backend and compare with `merged` until converged or all
/// attempts defined in `retry` failed.
pub(crate) async fn verify_with_retry<B: NetrecBackend>(
    backend: &B,
    merged: &MergedNetworkState,
    retry: &NetrecVerifyRetry,
) -> Result<(), NetrecError> {
    let max_attempts = retry.max_attempts.max(1);
    let mut attempt = 1u32;
    loop {
        let current = backend.query_network_state().await?;
        log::trace!("Post-apply state: {current}");
        match merged.verify(&current) {
            Ok(()) => {
                log::debug!("Verification passed on attempt {attempt}");
                return Ok(());
            }
            Err(e)
                if e.kind() == ErrorKind::VerificationError
                    && attempt < max_attempts =>
            {
                log::info!(
                    "Retrying({attempt}/{max_attempts}) on verification \
                     error: {e}"
                );
                tokio::time::sleep(retry.delay(attempt)).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
