// SPDX-License-Identifier: Apache-2.0

use std::future::Future;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;

use crate::{
    checkpoint::{CheckpointManager, NetrecCheckpoint},
    plan::gen_operations,
    verify::verify_with_retry,
    ErrorKind, JsonDisplay, MergedNetworkState, NetrecApplyOption,
    NetrecBackend, NetrecError, NetworkState, Operation,
};

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
#[repr(u8)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub enum ApplyPhase {
    #[default]
    Idle = 0,
    Normalizing = 1,
    Diffing = 2,
    CheckpointOpen = 3,
    Applying = 4,
    Verifying = 5,
    Committed = 6,
    RolledBack = 7,
}

impl From<u8> for ApplyPhase {
    fn from(d: u8) -> Self {
        match d {
            1 => Self::Normalizing,
            2 => Self::Diffing,
            3 => Self::CheckpointOpen,
            4 => Self::Applying,
            5 => Self::Verifying,
            6 => Self::Committed,
            7 => Self::RolledBack,
            _ => Self::Idle,
        }
    }
}

/// Reset phase to [ApplyPhase::Idle] when apply finished or its future
/// dropped.
struct PhaseGuard<'a>(&'a AtomicU8);

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        self.0.store(ApplyPhase::Idle as u8, Ordering::SeqCst);
    }
}

/// Reconcile network state of [NetrecBackend] with desired state.
///
/// Only one apply is allowed at a time, the second concurrent one fails
/// with [ErrorKind::Busy]. Queries through [NetrecEngine::show()] wait for
/// backend operations in flight.
pub struct NetrecEngine<B: NetrecBackend> {
    backend: Arc<B>,
    checkpoints: CheckpointManager<B>,
    apply_lock: Mutex<()>,
    gate: RwLock<()>,
    phase: AtomicU8,
}

impl<B: NetrecBackend> std::fmt::Debug for NetrecEngine<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetrecEngine")
            .field("phase", &self.phase())
            .finish()
    }
}

impl<B: NetrecBackend> NetrecEngine<B> {
    pub fn new(backend: B) -> Self {
        let backend = Arc::new(backend);
        Self {
            checkpoints: CheckpointManager::new(backend.clone()),
            backend,
            apply_lock: Mutex::new(()),
            gate: RwLock::new(()),
            phase: AtomicU8::new(ApplyPhase::Idle as u8),
        }
    }

    pub fn backend(&self) -> &B {
        self.backend.as_ref()
    }

    pub fn phase(&self) -> ApplyPhase {
        self.phase.load(Ordering::SeqCst).into()
    }

    fn set_phase(&self, phase: ApplyPhase) {
        log::debug!("Apply phase {phase}");
        self.phase.store(phase as u8, Ordering::SeqCst);
    }

    /// Full current network state.
    pub async fn show(&self) -> Result<NetworkState, NetrecError> {
        let _gate = self.gate.read().await;
        self.backend.query_network_state().await
    }

    /// Current state of specified interfaces and routes next hop to them.
    pub async fn show_only(
        &self,
        iface_names: &[&str],
    ) -> Result<NetworkState, NetrecError> {
        Ok(self.show().await?.filter_ifaces(iface_names))
    }

    /// Operations required to reach desired state, nothing changed.
    pub async fn plan(
        &self,
        desired: &NetworkState,
    ) -> Result<Vec<Operation>, NetrecError> {
        let current = self.show().await?;
        let merged = MergedNetworkState::new(desired.clone(), current)?;
        gen_operations(&merged)
    }

    /// Apply desired state, returning the operations executed.
    pub async fn apply(
        &self,
        desired: &NetworkState,
        option: &NetrecApplyOption,
    ) -> Result<Vec<Operation>, NetrecError> {
        self.apply_with_cancel(desired, option, CancellationToken::new())
            .await
    }

    /// Apply desired state. Cancelling `cancel` before commit rolls back all
    /// changes and fails with [ErrorKind::Cancelled].
    pub async fn apply_with_cancel(
        &self,
        desired: &NetworkState,
        option: &NetrecApplyOption,
        cancel: CancellationToken,
    ) -> Result<Vec<Operation>, NetrecError> {
        let _apply_guard = self.apply_lock.try_lock().map_err(|_| {
            NetrecError::new(
                ErrorKind::Busy,
                "Another apply is in progress".to_string(),
            )
        })?;
        let _phase_guard = PhaseGuard(&self.phase);
        option.validate()?;
        log::trace!("Desired state: {desired}");

        self.set_phase(ApplyPhase::Normalizing);
        let current = self.show().await?;
        log::trace!("Current state: {current}");
        let merged = MergedNetworkState::new(desired.clone(), current)?;

        self.set_phase(ApplyPhase::Diffing);
        let operations = gen_operations(&merged)?;

        if operations.is_empty() {
            log::info!("Desired state already applied, nothing to change");
            if !option.no_verify {
                self.set_phase(ApplyPhase::Verifying);
                verify_with_retry(
                    self.backend.as_ref(),
                    &merged,
                    &option.verify_retry,
                )
                .await?;
            }
            return Ok(operations);
        }
        if cancel.is_cancelled() {
            return Err(NetrecError::new(
                ErrorKind::Cancelled,
                "Apply cancelled before any change".to_string(),
            ));
        }

        let mut checkpoint = self
            .checkpoints
            .create(option.commit_timeout_duration())
            .await?;
        self.set_phase(ApplyPhase::CheckpointOpen);

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(NetrecError::new(
                ErrorKind::Cancelled,
                "Apply cancelled by caller".to_string(),
            )),
            r = run_with_timeout(
                self.apply_and_verify(&merged, &operations, option),
                option.apply_timeout_duration(),
            ) => r,
        };

        if let Err(e) = result {
            return Err(self.rollback_on_error(&mut checkpoint, e).await);
        }
        match self.checkpoints.commit(&mut checkpoint).await {
            Ok(()) => {
                self.set_phase(ApplyPhase::Committed);
                log::info!("Applied {} operations", operations.len());
                Ok(operations)
            }
            Err(e) if checkpoint.is_open() => {
                Err(self.rollback_on_error(&mut checkpoint, e).await)
            }
            Err(e) => {
                self.set_phase(ApplyPhase::RolledBack);
                log::warn!("{e}");
                Err(e)
            }
        }
    }

    async fn apply_and_verify(
        &self,
        merged: &MergedNetworkState,
        operations: &[Operation],
        option: &NetrecApplyOption,
    ) -> Result<(), NetrecError> {
        self.set_phase(ApplyPhase::Applying);
        {
            let _gate = self.gate.write().await;
            for (i, operation) in operations.iter().enumerate() {
                log::info!(
                    "Applying operation {}/{}: {operation}",
                    i + 1,
                    operations.len()
                );
                if let Err(e) = self.backend.apply_operation(operation).await
                {
                    return Err(NetrecError::new(
                        ErrorKind::ApplyError,
                        format!("Failed to {operation}: {}", e.msg()),
                    )
                    .with_operation(operation.clone()));
                }
            }
        }
        if option.no_verify {
            log::info!("Verification skipped");
            return Ok(());
        }
        self.set_phase(ApplyPhase::Verifying);
        verify_with_retry(self.backend.as_ref(), merged, &option.verify_retry)
            .await
    }

    /// Returns the error to surface: `error` itself when rolled back, or
    /// [ErrorKind::RollbackError] mentioning `error`.
    async fn rollback_on_error(
        &self,
        checkpoint: &mut NetrecCheckpoint<B>,
        error: NetrecError,
    ) -> NetrecError {
        log::warn!("Rolling back checkpoint {} due to {error}", checkpoint.id);
        let _gate = self.gate.write().await;
        match self.checkpoints.rollback(checkpoint).await {
            Ok(()) => {
                self.set_phase(ApplyPhase::RolledBack);
                error
            }
            Err(rollback_error) => {
                log::error!("{rollback_error}, original error: {error}");
                let mut ret = NetrecError::new(
                    ErrorKind::RollbackError,
                    format!(
                        "{}, original error: {error}",
                        rollback_error.msg()
                    ),
                )
                .with_mismatches(error.mismatches().to_vec());
                if let Some(operation) = error.operation() {
                    ret = ret.with_operation(operation.clone());
                }
                ret
            }
        }
    }
}

async fn run_with_timeout<F>(
    future: F,
    timeout: Option<Duration>,
) -> Result<(), NetrecError>
where
    F: Future<Output = Result<(), NetrecError>>,
{
    match timeout {
        Some(timeout) => tokio::time::timeout(timeout, future)
            .await
            .unwrap_or_else(|_| {
                Err(NetrecError::new(
                    ErrorKind::Timeout,
                    format!(
                        "Apply not finished within {}ms",
                        timeout.as_millis()
                    ),
                ))
            }),
        None => future.await,
    }
}
