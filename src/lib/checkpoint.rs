// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::{ErrorKind, NetrecBackend, NetrecError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CheckpointStatus {
    Open,
    Committed,
    RolledBack,
}

/// Handle of a backend snapshot. Dropping an open checkpoint schedules a
/// rollback on current tokio runtime.
#[derive(Debug)]
pub(crate) struct NetrecCheckpoint<B: NetrecBackend> {
    pub(crate) id: Uuid,
    pub(crate) timeout: Duration,
    status: CheckpointStatus,
    backend: Arc<B>,
}

impl<B: NetrecBackend> NetrecCheckpoint<B> {
    pub(crate) fn is_open(&self) -> bool {
        self.status == CheckpointStatus::Open
    }
}

impl<B: NetrecBackend> Drop for NetrecCheckpoint<B> {
    fn drop(&mut self) {
        if !self.is_open() {
            return;
        }
        let id = self.id;
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                log::warn!("Checkpoint {id} dropped while open, rolling back");
                let backend = self.backend.clone();
                handle.spawn(async move {
                    match backend.rollback_checkpoint(id).await {
                        Ok(()) => log::info!("Checkpoint {id} rolled back"),
                        Err(e) if e.kind() == ErrorKind::CheckpointExpired => {
                            log::info!("Checkpoint {id} already expired")
                        }
                        Err(e) => log::error!(
                            "Failed to rollback checkpoint {id}: {e}"
                        ),
                    }
                });
            }
            Err(_) => {
                log::error!(
                    "Checkpoint {id} dropped outside of tokio runtime, \
                     depending on backend to rollback in {}ms",
                    self.timeout.as_millis()
                );
            }
        }
    }
}

#[derive(Debug)]
pub(crate) struct CheckpointManager<B: NetrecBackend> {
    backend: Arc<B>,
}

impl<B: NetrecBackend> CheckpointManager<B> {
    pub(crate) fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// Snapshot current network state. The backend restores the snapshot by
    /// itself if checkpoint not committed or rolled back within `timeout`.
    pub(crate) async fn create(
        &self,
        timeout: Duration,
    ) -> Result<NetrecCheckpoint<B>, NetrecError> {
        let id = Uuid::now_v7();
        if let Err(e) = self.backend.create_checkpoint(id, timeout).await {
            return Err(if e.kind() == ErrorKind::CheckpointError {
                e
            } else {
                NetrecError::new(
                    ErrorKind::CheckpointError,
                    format!("Failed to create checkpoint: {e}"),
                )
            });
        }
        log::info!(
            "Checkpoint {id} created with timeout {}ms",
            timeout.as_millis()
        );
        Ok(NetrecCheckpoint {
            id,
            timeout,
            status: CheckpointStatus::Open,
            backend: self.backend.clone(),
        })
    }

    /// Idempotent. Checkpoint already expired is treated as rolled back.
    pub(crate) async fn rollback(
        &self,
        checkpoint: &mut NetrecCheckpoint<B>,
    ) -> Result<(), NetrecError> {
        match checkpoint.status {
            CheckpointStatus::RolledBack => return Ok(()),
            CheckpointStatus::Committed => {
                return Err(NetrecError::new(
                    ErrorKind::Bug,
                    format!(
                        "Cannot rollback committed checkpoint {}",
                        checkpoint.id
                    ),
                ));
            }
            CheckpointStatus::Open => (),
        }
        log::warn!("Rolling back checkpoint {}", checkpoint.id);
        match self.backend.rollback_checkpoint(checkpoint.id).await {
            Ok(()) => (),
            Err(e) if e.kind() == ErrorKind::CheckpointExpired => {
                log::info!(
                    "Checkpoint {} already rolled back by backend: {e}",
                    checkpoint.id
                );
            }
            Err(e) => {
                return Err(NetrecError::new(
                    ErrorKind::RollbackError,
                    format!(
                        "Failed to rollback checkpoint {}: {}",
                        checkpoint.id,
                        e.msg()
                    ),
                ));
            }
        }
        checkpoint.status = CheckpointStatus::RolledBack;
        Ok(())
    }

    /// Fails with [ErrorKind::CheckpointError] if the lease expired, in which
    /// case the checkpoint is marked as rolled back.
    pub(crate) async fn commit(
        &self,
        checkpoint: &mut NetrecCheckpoint<B>,
    ) -> Result<(), NetrecError> {
        if checkpoint.status != CheckpointStatus::Open {
            return Err(NetrecError::new(
                ErrorKind::Bug,
                format!(
                    "Cannot commit checkpoint {} in status {:?}",
                    checkpoint.id, checkpoint.status
                ),
            ));
        }
        match self.backend.commit_checkpoint(checkpoint.id).await {
            Ok(()) => {
                checkpoint.status = CheckpointStatus::Committed;
                log::info!("Checkpoint {} committed", checkpoint.id);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::CheckpointExpired => {
                checkpoint.status = CheckpointStatus::RolledBack;
                Err(NetrecError::new(
                    ErrorKind::CheckpointError,
                    format!(
                        "Checkpoint {} expired after {}ms, changes were \
                         reverted by backend",
                        checkpoint.id,
                        checkpoint.timeout.as_millis()
                    ),
                ))
            }
            Err(e) => Err(NetrecError::new(
                ErrorKind::CheckpointError,
                format!(
                    "Failed to commit checkpoint {}: {}",
                    checkpoint.id,
                    e.msg()
                ),
            )),
        }
    }
}
