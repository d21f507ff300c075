// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use uuid::Uuid;

use crate::{
    backend::dispatch_operation, DnsClientState, ErrorKind, Interface,
    InterfaceIpv4, InterfaceIpv6, InterfaceState, NetrecBackend, NetrecError,
    NetrecInterface, NetworkState, Operation, RouteEntry,
};

type OperationFilter = Box<dyn Fn(&Operation) -> bool + Send>;

/// [NetrecBackend] storing network state in memory.
///
/// Besides simulating a machine, it records every operation it received and
/// could be instructed to fail or ignore operations, fail checkpoint
/// actions, or report stale state after changes for testing purpose.
/// Cloned instances share the same state.
#[derive(Clone, Default)]
pub struct NetrecMemoryBackend {
    inner: Arc<Mutex<MemoryInner>>,
}

#[derive(Default)]
struct MemoryInner {
    state: NetworkState,
    checkpoint: Option<MemoryCheckpoint>,
    expired_checkpoints: Vec<Uuid>,
    operations: Vec<Operation>,
    fail_filter: Option<OperationFilter>,
    ignore_filter: Option<OperationFilter>,
    fail_rollback: bool,
    fail_checkpoint: bool,
    convergence_delay: u32,
    stale_queries: u32,
    commit_delay: Option<Duration>,
    operation_delay: Option<Duration>,
}

struct MemoryCheckpoint {
    id: Uuid,
    snapshot: NetworkState,
    watchdog: tokio::task::JoinHandle<()>,
}

impl std::fmt::Debug for NetrecMemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.inner.lock() {
            Ok(inner) => f
                .debug_struct("NetrecMemoryBackend")
                .field("state", &inner.state)
                .field("checkpoint", &inner.checkpoint.as_ref().map(|c| c.id))
                .field("operations", &inner.operations.len())
                .finish(),
            Err(_) => write!(f, "NetrecMemoryBackend {{ poisoned }}"),
        }
    }
}

impl NetrecMemoryBackend {
    pub fn new(state: NetworkState) -> Self {
        let mut inner = MemoryInner {
            state,
            ..Default::default()
        };
        inner.state.ifaces.sort_by_name();
        inner.resync_controllers();
        Self {
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    pub fn new_from_yaml(content: &str) -> Result<Self, NetrecError> {
        Ok(Self::new(NetworkState::new_from_yaml(content)?))
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryInner>, NetrecError> {
        self.inner.lock().map_err(|e| {
            NetrecError::new(
                ErrorKind::Bug,
                format!("Memory backend lock poisoned: {e}"),
            )
        })
    }

    /// Stored network state, never stale.
    pub fn state(&self) -> Result<NetworkState, NetrecError> {
        self.lock().map(|i| i.state.clone())
    }

    /// Operations received via [NetrecBackend::apply_operation()] including
    /// failed and ignored ones.
    pub fn operations(&self) -> Vec<Operation> {
        self.lock().map(|i| i.operations.clone()).unwrap_or_default()
    }

    pub fn clear_operations(&self) {
        if let Ok(mut inner) = self.lock() {
            inner.operations.clear();
        }
    }

    pub fn has_checkpoint(&self) -> bool {
        self.lock()
            .map(|i| i.checkpoint.is_some())
            .unwrap_or_default()
    }

    /// Fail operations matching `filter` with [ErrorKind::ApplyError].
    pub fn fail_when<F>(&self, filter: F)
    where
        F: Fn(&Operation) -> bool + Send + 'static,
    {
        if let Ok(mut inner) = self.lock() {
            inner.fail_filter = Some(Box::new(filter));
        }
    }

    /// Report success on operations matching `filter` without changing
    /// anything.
    pub fn ignore_when<F>(&self, filter: F)
    where
        F: Fn(&Operation) -> bool + Send + 'static,
    {
        if let Ok(mut inner) = self.lock() {
            inner.ignore_filter = Some(Box::new(filter));
        }
    }

    pub fn set_rollback_failure(&self, fail: bool) {
        if let Ok(mut inner) = self.lock() {
            inner.fail_rollback = fail;
        }
    }

    pub fn set_checkpoint_failure(&self, fail: bool) {
        if let Ok(mut inner) = self.lock() {
            inner.fail_checkpoint = fail;
        }
    }

    /// After checkpoint created, the first `count` queries return the state
    /// stored in checkpoint.
    pub fn set_convergence_delay(&self, count: u32) {
        if let Ok(mut inner) = self.lock() {
            inner.convergence_delay = count;
        }
    }

    /// Sleep before committing checkpoint.
    pub fn set_commit_delay(&self, delay: Duration) {
        if let Ok(mut inner) = self.lock() {
            inner.commit_delay = Some(delay);
        }
    }

    /// Sleep before executing each operation.
    pub fn set_operation_delay(&self, delay: Duration) {
        if let Ok(mut inner) = self.lock() {
            inner.operation_delay = Some(delay);
        }
    }
}

impl NetrecBackend for NetrecMemoryBackend {
    async fn query_network_state(&self) -> Result<NetworkState, NetrecError> {
        let mut inner = self.lock()?;
        if inner.stale_queries > 0 {
            inner.stale_queries -= 1;
            if let Some(snapshot) =
                inner.checkpoint.as_ref().map(|c| c.snapshot.clone())
            {
                log::debug!("Memory backend reporting stale state");
                return Ok(snapshot);
            }
        }
        Ok(inner.state.clone())
    }

    async fn create_checkpoint(
        &self,
        id: Uuid,
        timeout: Duration,
    ) -> Result<(), NetrecError> {
        let mut inner = self.lock()?;
        if inner.fail_checkpoint {
            return Err(NetrecError::new(
                ErrorKind::CheckpointError,
                "Memory backend instructed to fail on checkpoint creation"
                    .to_string(),
            ));
        }
        if let Some(cur) = inner.checkpoint.as_ref() {
            return Err(NetrecError::new(
                ErrorKind::CheckpointError,
                format!("Checkpoint {} is still open", cur.id),
            ));
        }
        let shared = self.inner.clone();
        let watchdog = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            expire_checkpoint(&shared, id);
        });
        inner.checkpoint = Some(MemoryCheckpoint {
            id,
            snapshot: inner.state.clone(),
            watchdog,
        });
        inner.stale_queries = inner.convergence_delay;
        log::debug!("Memory backend created checkpoint {id}");
        Ok(())
    }

    async fn rollback_checkpoint(&self, id: Uuid) -> Result<(), NetrecError> {
        let mut inner = self.lock()?;
        if inner.fail_rollback {
            return Err(NetrecError::new(
                ErrorKind::RollbackError,
                "Memory backend instructed to fail on rollback".to_string(),
            ));
        }
        let checkpoint = inner.take_checkpoint(id)?;
        checkpoint.watchdog.abort();
        inner.state = checkpoint.snapshot;
        inner.stale_queries = 0;
        log::debug!("Memory backend rolled back checkpoint {id}");
        Ok(())
    }

    async fn commit_checkpoint(&self, id: Uuid) -> Result<(), NetrecError> {
        let delay = self.lock()?.commit_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut inner = self.lock()?;
        let checkpoint = inner.take_checkpoint(id)?;
        checkpoint.watchdog.abort();
        inner.stale_queries = 0;
        log::debug!("Memory backend committed checkpoint {id}");
        Ok(())
    }

    async fn apply_operation(
        &self,
        operation: &Operation,
    ) -> Result<(), NetrecError> {
        let delay = {
            let mut inner = self.lock()?;
            inner.operations.push(operation.clone());
            if inner.fail_filter.as_ref().map(|f| f(operation)) == Some(true)
            {
                return Err(NetrecError::new(
                    ErrorKind::ApplyError,
                    format!("Memory backend failed on purpose: {operation}"),
                ));
            }
            if inner.ignore_filter.as_ref().map(|f| f(operation))
                == Some(true)
            {
                log::debug!("Memory backend ignoring {operation}");
                return Ok(());
            }
            inner.operation_delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        dispatch_operation(self, operation).await
    }

    async fn create_interface(
        &self,
        iface: &Interface,
    ) -> Result<(), NetrecError> {
        self.lock()?.create_iface(iface)
    }

    async fn modify_interface(
        &self,
        iface: &Interface,
    ) -> Result<(), NetrecError> {
        self.lock()?.modify_iface(iface)
    }

    async fn delete_interface(
        &self,
        iface: &Interface,
    ) -> Result<(), NetrecError> {
        self.lock()?.delete_iface(iface.name())
    }

    async fn set_addresses(
        &self,
        iface_name: &str,
        ipv4: Option<&InterfaceIpv4>,
        ipv6: Option<&InterfaceIpv6>,
    ) -> Result<(), NetrecError> {
        let mut inner = self.lock()?;
        let iface = inner.get_iface_mut(iface_name)?;
        if let Some(ipv4) = ipv4 {
            iface.base_iface_mut().ipv4 = Some(ipv4.clone());
        }
        if let Some(ipv6) = ipv6 {
            iface.base_iface_mut().ipv6 = Some(ipv6.clone());
        }
        Ok(())
    }

    async fn add_route(&self, route: &RouteEntry) -> Result<(), NetrecError> {
        let mut inner = self.lock()?;
        if let Some(via) = route.next_hop_iface.as_deref() {
            inner.get_iface_mut(via)?;
        }
        let routes = inner.state.routes.config.get_or_insert_with(Vec::new);
        if !routes.contains(route) {
            routes.push(route.clone());
            routes.sort_unstable();
        }
        Ok(())
    }

    async fn delete_route(
        &self,
        route: &RouteEntry,
    ) -> Result<(), NetrecError> {
        let mut inner = self.lock()?;
        if let Some(routes) = inner.state.routes.config.as_mut() {
            let old_len = routes.len();
            routes.retain(|r| r != route);
            if routes.len() == old_len {
                log::debug!("Route {route} not found, nothing to delete");
            }
        }
        Ok(())
    }

    async fn set_dns(
        &self,
        config: &DnsClientState,
    ) -> Result<(), NetrecError> {
        self.lock()?.state.dns.config = Some(config.clone());
        Ok(())
    }
}

fn expire_checkpoint(inner: &Mutex<MemoryInner>, id: Uuid) {
    let mut inner = match inner.lock() {
        Ok(i) => i,
        Err(e) => {
            log::error!("Failed to expire checkpoint {id}: {e}");
            return;
        }
    };
    if inner.checkpoint.as_ref().map(|c| c.id) == Some(id) {
        if let Some(checkpoint) = inner.checkpoint.take() {
            log::warn!("Checkpoint {id} expired, restoring the snapshot");
            inner.state = checkpoint.snapshot;
            inner.stale_queries = 0;
            inner.expired_checkpoints.push(id);
        }
    }
}

impl MemoryInner {
    fn take_checkpoint(
        &mut self,
        id: Uuid,
    ) -> Result<MemoryCheckpoint, NetrecError> {
        if self.checkpoint.as_ref().map(|c| c.id) == Some(id) {
            if let Some(checkpoint) = self.checkpoint.take() {
                return Ok(checkpoint);
            }
        }
        if self.expired_checkpoints.contains(&id) {
            Err(NetrecError::new(
                ErrorKind::CheckpointExpired,
                format!("Checkpoint {id} expired and already rolled back"),
            ))
        } else {
            Err(NetrecError::new(
                ErrorKind::CheckpointError,
                format!("Checkpoint {id} not found"),
            ))
        }
    }

    fn get_iface_mut(
        &mut self,
        iface_name: &str,
    ) -> Result<&mut Interface, NetrecError> {
        self.state.ifaces.get_mut(iface_name).ok_or_else(|| {
            NetrecError::new(
                ErrorKind::ApplyError,
                format!("Interface {iface_name} not found"),
            )
        })
    }

    fn check_parent(&self, iface: &Interface) -> Result<(), NetrecError> {
        if let Some(parent) = iface.parent() {
            if self.state.ifaces.get(parent).is_none() {
                return Err(NetrecError::new(
                    ErrorKind::ApplyError,
                    format!(
                        "Parent interface {parent} of {} not found",
                        iface.name()
                    ),
                ));
            }
        }
        Ok(())
    }

    fn create_iface(&mut self, iface: &Interface) -> Result<(), NetrecError> {
        if self.state.ifaces.get(iface.name()).is_some() {
            return Err(NetrecError::new(
                ErrorKind::ApplyError,
                format!("Interface {} already exists", iface.name()),
            ));
        }
        if !iface.is_virtual() {
            return Err(NetrecError::new(
                ErrorKind::ApplyError,
                format!(
                    "Cannot create physical interface {} of type {}",
                    iface.name(),
                    iface.iface_type()
                ),
            ));
        }
        self.check_parent(iface)?;
        let mut new_iface = iface.clone();
        if new_iface.base_iface().state.is_none() {
            new_iface.base_iface_mut().state = Some(InterfaceState::Up);
        }
        self.state.ifaces.push(new_iface);
        self.state.ifaces.sort_by_name();
        self.resync_controllers();
        Ok(())
    }

    fn modify_iface(&mut self, iface: &Interface) -> Result<(), NetrecError> {
        self.check_parent(iface)?;
        let cur_iface = self.get_iface_mut(iface.name())?;
        if cur_iface.iface_type() != iface.iface_type() {
            return Err(NetrecError::new(
                ErrorKind::ApplyError,
                format!(
                    "Cannot change type of interface {} from {} to {}",
                    iface.name(),
                    cur_iface.iface_type(),
                    iface.iface_type()
                ),
            ));
        }
        let mut new_iface = iface.clone();
        let new_base = new_iface.base_iface_mut();
        let cur_base = cur_iface.base_iface();
        new_base.ipv4.clone_from(&cur_base.ipv4);
        new_base.ipv6.clone_from(&cur_base.ipv6);
        new_base.min_mtu = cur_base.min_mtu;
        new_base.max_mtu = cur_base.max_mtu;
        if new_base.state.is_none() {
            new_base.state = cur_base.state;
        }
        *cur_iface = new_iface;
        self.resync_controllers();
        Ok(())
    }

    fn delete_iface(&mut self, iface_name: &str) -> Result<(), NetrecError> {
        let iface = self.get_iface_mut(iface_name)?;
        if !iface.is_virtual() {
            return Err(NetrecError::new(
                ErrorKind::ApplyError,
                format!("Cannot delete physical interface {iface_name}"),
            ));
        }
        if let Some(child) = self
            .state
            .ifaces
            .iter()
            .find(|i| i.parent() == Some(iface_name))
        {
            return Err(NetrecError::new(
                ErrorKind::ApplyError,
                format!(
                    "Interface {iface_name} is still used as parent by {}",
                    child.name()
                ),
            ));
        }
        self.state.ifaces.remove(iface_name);
        if let Some(routes) = self.state.routes.config.as_mut() {
            routes.retain(|r| r.next_hop_iface.as_deref() != Some(iface_name));
        }
        self.resync_controllers();
        Ok(())
    }

    /// The `controller` property is derived from port list of controllers.
    fn resync_controllers(&mut self) {
        let mut port_to_ctrl: HashMap<String, String> = HashMap::new();
        for iface in self.state.ifaces.iter() {
            for port in iface.ports().unwrap_or_default() {
                port_to_ctrl.insert(port.to_string(), iface.name().to_string());
            }
        }
        for iface in self.state.ifaces.iter_mut() {
            let ctrl = port_to_ctrl.remove(iface.name());
            iface.base_iface_mut().controller = ctrl;
        }
    }
}
