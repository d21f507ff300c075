// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use uuid::Uuid;

use super::current_state;
use crate::{
    ErrorKind, NetrecBackend, NetrecInterface, NetrecMemoryBackend, Operation,
};

fn new_op(yaml: &str) -> Operation {
    serde_yaml::from_str(yaml).unwrap()
}

#[tokio::test]
async fn test_memory_create_physical_iface() {
    let backend = NetrecMemoryBackend::new(current_state());
    let result = backend
        .apply_operation(&new_op(
            r#"
            kind: create-interface
            iface:
              name: eth9
              type: ethernet
            rank: 0
            "#,
        ))
        .await;
    assert!(result.is_err());
    if let Err(e) = result {
        assert_eq!(e.kind(), ErrorKind::ApplyError);
    }
    assert_eq!(backend.operations().len(), 1);
}

#[tokio::test]
async fn test_memory_create_bond_sync_controller() {
    let backend = NetrecMemoryBackend::new(current_state());
    backend
        .apply_operation(&new_op(
            r#"
            kind: create-interface
            iface:
              name: bond0
              type: bond
              link-aggregation:
                mode: balance-rr
                port:
                - eth2
            rank: 0
            "#,
        ))
        .await
        .unwrap();
    let state = backend.query_network_state().await.unwrap();
    let bond0 = state.ifaces.get("bond0").unwrap();
    assert_eq!(bond0.base_iface().state, Some(crate::InterfaceState::Up));
    assert_eq!(
        state.ifaces.get("eth2").unwrap().base_iface().controller,
        Some("bond0".to_string())
    );
}

#[tokio::test]
async fn test_memory_delete_parent_in_use() {
    let backend = NetrecMemoryBackend::new_from_yaml(
        r#"
        interfaces:
        - name: dummy0
          type: dummy
          state: up
        - name: dummy0.10
          type: vlan
          state: up
          vlan:
            base-iface: dummy0
            id: 10
        "#,
    )
    .unwrap();
    let result = backend
        .apply_operation(&new_op(
            r#"
            kind: delete-interface
            iface:
              name: dummy0
              type: dummy
            rank: 0
            "#,
        ))
        .await;
    assert!(result.is_err());
    if let Err(e) = result {
        assert_eq!(e.kind(), ErrorKind::ApplyError);
        assert!(e.msg().contains("dummy0.10"));
    }
}

#[tokio::test]
async fn test_memory_modify_keep_ip() {
    let backend = NetrecMemoryBackend::new(current_state());
    backend
        .apply_operation(&new_op(
            r#"
            kind: modify-interface
            iface:
              name: eth1
              type: ethernet
              mtu: 9000
            rank: 0
            "#,
        ))
        .await
        .unwrap();
    let state = backend.state().unwrap();
    let eth1 = state.ifaces.get("eth1").unwrap().base_iface();
    assert_eq!(eth1.mtu, Some(9000));
    assert_eq!(eth1.max_mtu, Some(9000));
    assert_eq!(eth1.state, Some(crate::InterfaceState::Up));
    assert_eq!(
        eth1.ipv4,
        current_state().ifaces.get("eth1").unwrap().base_iface().ipv4
    );
}

#[tokio::test]
async fn test_memory_checkpoint_rollback() {
    let backend = NetrecMemoryBackend::new(current_state());
    let before = backend.state().unwrap();
    let id = Uuid::now_v7();
    backend
        .create_checkpoint(id, Duration::from_secs(10))
        .await
        .unwrap();
    let result = backend
        .create_checkpoint(Uuid::now_v7(), Duration::from_secs(10))
        .await;
    assert!(result.is_err());
    if let Err(e) = result {
        assert_eq!(e.kind(), ErrorKind::CheckpointError);
    }

    backend
        .apply_operation(&new_op(
            r#"
            kind: set-dns
            config:
              server:
              - 192.0.2.53
              search: []
            rank: 0
            "#,
        ))
        .await
        .unwrap();
    assert_ne!(backend.state().unwrap(), before);

    backend.rollback_checkpoint(id).await.unwrap();
    assert_eq!(backend.state().unwrap(), before);
    assert!(!backend.has_checkpoint());
}

#[tokio::test]
async fn test_memory_checkpoint_expired() {
    let backend = NetrecMemoryBackend::new(current_state());
    let before = backend.state().unwrap();
    let id = Uuid::now_v7();
    backend
        .create_checkpoint(id, Duration::from_millis(10))
        .await
        .unwrap();
    backend
        .apply_operation(&new_op(
            r#"
            kind: set-dns
            config:
              server: []
              search: []
            rank: 0
            "#,
        ))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(backend.state().unwrap(), before);
    let result = backend.commit_checkpoint(id).await;
    assert!(result.is_err());
    if let Err(e) = result {
        assert_eq!(e.kind(), ErrorKind::CheckpointExpired);
    }
    let result = backend.rollback_checkpoint(Uuid::now_v7()).await;
    assert!(result.is_err());
    if let Err(e) = result {
        assert_eq!(e.kind(), ErrorKind::CheckpointError);
    }
}

#[tokio::test]
async fn test_memory_stale_query() {
    let backend = NetrecMemoryBackend::new(current_state());
    backend.set_convergence_delay(1);
    let before = backend.state().unwrap();
    backend
        .create_checkpoint(Uuid::now_v7(), Duration::from_secs(10))
        .await
        .unwrap();
    backend
        .apply_operation(&new_op(
            r#"
            kind: set-dns
            config:
              server: []
              search: []
            rank: 0
            "#,
        ))
        .await
        .unwrap();
    assert_eq!(backend.query_network_state().await.unwrap(), before);
    assert_ne!(backend.query_network_state().await.unwrap(), before);
}

#[tokio::test]
async fn test_memory_poisoned_lock_state_error() {
    let backend = NetrecMemoryBackend::new(current_state());
    backend.fail_when(|_| panic!("operation filter panicked"));
    let cloned = backend.clone();
    let op = new_op(
        r#"
        kind: set-dns
        config:
          server: []
        rank: 0
        "#,
    );
    let join = tokio::spawn(async move { cloned.apply_operation(&op).await });
    assert!(join.await.is_err());

    let result = backend.state();
    assert!(result.is_err());
    if let Err(e) = result {
        assert_eq!(e.kind(), ErrorKind::Bug);
    }
    assert!(backend.query_network_state().await.is_err());
}
