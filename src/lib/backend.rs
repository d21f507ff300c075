// SPDX-License-Identifier: Apache-2.0

use std::future::Future;
use std::time::Duration;

use uuid::Uuid;

use crate::{
    DnsClientState, Interface, InterfaceIpv4, InterfaceIpv6, NetrecError,
    NetworkState, Operation, RouteEntry,
};

/// Capability of querying and changing the network stack.
///
/// Each method should either fully succeed or leave the network stack
/// unchanged. Retry on transient errors is the responsibility of the
/// implementation.
pub trait NetrecBackend: Sized + Send + Sync + 'static {
    /// Full current network state.
    fn query_network_state(
        &self,
    ) -> impl Future<Output = Result<NetworkState, NetrecError>> + Send;

    /// Snapshot current network state. When not committed or rolled back
    /// before `timeout`, the backend should restore the snapshot by itself.
    /// Should fail with [crate::ErrorKind::CheckpointError] if another
    /// checkpoint is still open.
    fn create_checkpoint(
        &self,
        id: Uuid,
        timeout: Duration,
    ) -> impl Future<Output = Result<(), NetrecError>> + Send;

    /// Restore the snapshot and discard the checkpoint.
    /// Should fail with [crate::ErrorKind::CheckpointExpired] if checkpoint
    /// already rolled back by timeout.
    fn rollback_checkpoint(
        &self,
        id: Uuid,
    ) -> impl Future<Output = Result<(), NetrecError>> + Send;

    /// Discard the snapshot, keeping current network state.
    /// Should fail with [crate::ErrorKind::CheckpointExpired] if checkpoint
    /// already rolled back by timeout.
    fn commit_checkpoint(
        &self,
        id: Uuid,
    ) -> impl Future<Output = Result<(), NetrecError>> + Send;

    fn create_interface(
        &self,
        iface: &Interface,
    ) -> impl Future<Output = Result<(), NetrecError>> + Send;

    /// Change link level properties(including state and controller) of
    /// existing interface to the ones of `iface`.
    fn modify_interface(
        &self,
        iface: &Interface,
    ) -> impl Future<Output = Result<(), NetrecError>> + Send;

    fn delete_interface(
        &self,
        iface: &Interface,
    ) -> impl Future<Output = Result<(), NetrecError>> + Send;

    /// Replace IP configuration. `None` means unchanged.
    fn set_addresses(
        &self,
        iface_name: &str,
        ipv4: Option<&InterfaceIpv4>,
        ipv6: Option<&InterfaceIpv6>,
    ) -> impl Future<Output = Result<(), NetrecError>> + Send;

    fn add_route(
        &self,
        route: &RouteEntry,
    ) -> impl Future<Output = Result<(), NetrecError>> + Send;

    fn delete_route(
        &self,
        route: &RouteEntry,
    ) -> impl Future<Output = Result<(), NetrecError>> + Send;

    fn set_dns(
        &self,
        config: &DnsClientState,
    ) -> impl Future<Output = Result<(), NetrecError>> + Send;

    /// Execute single operation by invoking the dedicated method.
    fn apply_operation(
        &self,
        operation: &Operation,
    ) -> impl Future<Output = Result<(), NetrecError>> + Send {
        dispatch_operation(self, operation)
    }
}

/// Invoke the [NetrecBackend] method dedicated to the kind of `operation`.
pub async fn dispatch_operation<B: NetrecBackend>(
    backend: &B,
    operation: &Operation,
) -> Result<(), NetrecError> {
    match operation {
        Operation::CreateInterface(op) => {
            backend.create_interface(&op.iface).await
        }
        Operation::ModifyInterface(op) => {
            backend.modify_interface(&op.iface).await
        }
        Operation::DeleteInterface(op) => {
            backend.delete_interface(&op.iface).await
        }
        Operation::SetAddresses(op) => {
            backend
                .set_addresses(
                    op.iface_name.as_str(),
                    op.ipv4.as_ref(),
                    op.ipv6.as_ref(),
                )
                .await
        }
        Operation::AddRoute(op) => backend.add_route(&op.route).await,
        Operation::DeleteRoute(op) => backend.delete_route(&op.route).await,
        Operation::SetDns(op) => backend.set_dns(&op.config).await,
    }
}
