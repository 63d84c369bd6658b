// Copyright (c) 2025 - Cowboy AI, Inc.
//! Inventory editing operations

mod fixtures;

use cim_inventory::{InventoryError, ResourceKind};
use fixtures::*;
use pretty_assertions::assert_eq;
use std::sync::Arc;

#[tokio::test]
async fn test_delete_missing_is_not_found() {
    let inventory = inventory_with(vec![server("a")]).await;
    let err = inventory.delete("b").await.unwrap_err();
    assert!(matches!(err, InventoryError::NotFound(ref name) if name == "b"));
}

#[tokio::test]
async fn test_delete_clears_every_dependent() {
    let inventory = inventory_with(vec![
        server("host"),
        hosted_on(ResourceKind::System, "vm-1", "host"),
        hosted_on(ResourceKind::Service, "web", "Host"),
    ])
    .await;

    let removed = inventory.delete("HOST").await.unwrap();
    assert_eq!(removed.name(), "host");
    assert!(inventory.dependents("host").await.is_empty());
    for name in ["vm-1", "web"] {
        assert!(inventory.get(name).await.unwrap().runs_on().is_empty());
    }
}

#[tokio::test]
async fn test_rename_collision_is_conflict() {
    let inventory = inventory_with(vec![server("a"), server("b")]).await;
    for target in ["a", "A"] {
        let err = inventory.rename("b", target).await.unwrap_err();
        assert!(matches!(err, InventoryError::Conflict(_)));
    }
}

#[tokio::test]
async fn test_rename_missing_is_not_found() {
    let inventory = inventory_with(vec![]).await;
    let err = inventory.rename("ghost", "spirit").await.unwrap_err();
    assert!(matches!(err, InventoryError::NotFound(_)));
}

#[tokio::test]
async fn test_rename_to_blank_is_invalid() {
    let inventory = inventory_with(vec![server("a")]).await;
    let err = inventory.rename("a", " ").await.unwrap_err();
    assert!(matches!(err, InventoryError::InvalidInput(_)));
}

#[tokio::test]
async fn test_clone_is_a_deep_copy() {
    let mut original = server_with_ipmi("template", true);
    original.meta_mut().labels.insert("rack".to_string(), "r1".to_string());
    let inventory = inventory_with(vec![original]).await;

    let copy = inventory.clone_resource("TEMPLATE", "srv-02").await.unwrap();
    assert_eq!(copy.name(), "srv-02");
    assert_eq!(copy.meta().labels.get("rack").map(String::as_str), Some("r1"));

    inventory.delete("template").await.unwrap();
    let stored = inventory.get("srv-02").await.unwrap();
    assert_eq!(stored, copy);
}

#[tokio::test]
async fn test_clone_conflicts_and_missing_source() {
    let inventory = inventory_with(vec![server("a"), server("b")]).await;

    let err = inventory.clone_resource("a", "B").await.unwrap_err();
    assert!(matches!(err, InventoryError::Conflict(_)));

    let err = inventory.clone_resource("zzz", "c").await.unwrap_err();
    assert!(matches!(err, InventoryError::NotFound(_)));
}

#[tokio::test]
async fn test_every_edit_is_persisted() {
    let inventory = inventory_with(vec![server("a")]).await;
    inventory.rename("a", "b").await.unwrap();
    inventory.clone_resource("b", "c").await.unwrap();
    inventory.delete("b").await.unwrap();

    assert_eq!(inventory.store().save_count(), 4);
    let text = inventory.store().text().await.unwrap();
    assert_eq!(text, "version: 3\nresources:\n- kind: Server\n  name: c\n");
}

#[tokio::test]
async fn test_failed_save_keeps_published_state() {
    let inventory =
        inventory_with(vec![server("a"), hosted_on(ResourceKind::System, "vm", "a")]).await;
    inventory.store().fail_saves(true);

    assert!(matches!(inventory.delete("a").await, Err(InventoryError::Io(_))));
    assert!(matches!(inventory.add(server("b")).await, Err(InventoryError::Io(_))));

    assert_eq!(inventory.resources().await.len(), 2);
    assert_eq!(inventory.dependents("a").await, vec!["vm".to_string()]);
    assert_eq!(inventory.store().save_count(), 2);
}

#[tokio::test]
async fn test_concurrent_adds_are_serialized() {
    let inventory = Arc::new(inventory_with(vec![]).await);

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let inventory = Arc::clone(&inventory);
            tokio::spawn(async move { inventory.add(server(&format!("srv-{:02}", i))).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(inventory.resources().await.len(), 16);
    assert_eq!(inventory.store().save_count(), 16);
}

#[tokio::test]
async fn test_readers_keep_their_snapshot() {
    let inventory = inventory_with(vec![server("a")]).await;
    let before = inventory.snapshot().await;

    inventory.add(server("b")).await.unwrap();

    assert_eq!(before.len(), 1);
    assert_eq!(inventory.snapshot().await.len(), 2);
}
