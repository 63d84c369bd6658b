// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for cim-inventory
//!
//! Fixed document texts and record builders shared by the integration tests.
//! Nothing here reads the clock or the environment.

#![allow(dead_code)]

use async_trait::async_trait;
use cim_inventory::domain::{Drive, Server};
use cim_inventory::{
    DocumentStore, Inventory, InventoryError, InventoryResult, MemoryDocumentStore, MergeMode,
    Resource, ResourceKind, UpsertRequest, VersionedDocument,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Current-schema document with a host and a VM running on it
pub const CURRENT_DOCUMENT: &str = "\
version: 3
resources:
- kind: Server
  name: host-a
  ipmi: true
  drives:
  - type: ssd
    size: 1024
- kind: System
  name: vm-01
  os: debian
  runsOn:
  - host-a
";

/// Version 1 document where `runsOn` is still a scalar
pub const LEGACY_V1_DOCUMENT: &str = "\
version: 1
resources:
  - kind: Server
    name: host-a
  - kind: System
    name: vm-01
    runsOn: host-a
";

/// Unversioned document with mixed-case keys and a bare ram size
pub const LEGACY_V0_DOCUMENT: &str = "\
Resources:
  - Kind: server
    Name: host-a
    RAM: 64
  - kind: service
    name: dns
    RunsOn: host-a
    Ports: [53]
";

/// Document written by a future program
pub const FUTURE_DOCUMENT: &str = "version: 99\nresources: []\n";

pub fn server(name: &str) -> Resource {
    Resource::new(ResourceKind::Server, name)
}

pub fn server_with_ipmi(name: &str, ipmi: bool) -> Resource {
    Resource::Server(Server {
        name: name.to_string(),
        ipmi: Some(ipmi),
        ..Server::default()
    })
}

pub fn server_with_drives(name: &str, drives: Vec<Drive>) -> Resource {
    Resource::Server(Server {
        name: name.to_string(),
        drives,
        ..Server::default()
    })
}

pub fn hosted_on(kind: ResourceKind, name: &str, parent: &str) -> Resource {
    let mut resource = Resource::new(kind, name);
    resource.meta_mut().runs_on.push(parent.to_string());
    resource
}

/// In-memory store that counts saves and can be told to reject them
#[derive(Default)]
pub struct RecordingStore {
    inner: MemoryDocumentStore,
    saves: AtomicUsize,
    failing: AtomicBool,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: &str) -> Self {
        Self {
            inner: MemoryDocumentStore::with_text(text),
            ..Self::default()
        }
    }

    pub async fn text(&self) -> Option<String> {
        self.inner.text().await
    }

    pub async fn backups(&self) -> Vec<String> {
        self.inner.backups().await
    }

    /// Number of successful saves
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Make every following save fail with an I/O error
    pub fn fail_saves(&self, fail: bool) {
        self.failing.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl DocumentStore for RecordingStore {
    async fn load(&self) -> InventoryResult<VersionedDocument> {
        self.inner.load().await
    }

    async fn save(&self, document: &VersionedDocument) -> InventoryResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(InventoryError::Io(std::io::Error::other("disk full")));
        }
        self.inner.save(document).await?;
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Inventory over a recording store preloaded with `resources`
pub async fn inventory_with(resources: Vec<Resource>) -> Inventory<RecordingStore> {
    let inventory = Inventory::open(RecordingStore::new())
        .await
        .expect("empty memory store opens");
    for resource in resources {
        inventory.add(resource).await.expect("fixture resource is unique");
    }
    inventory
}

/// Request importing `yaml` with the given mode and dry-run flag
pub fn import(yaml: &str, mode: MergeMode, dry_run: bool) -> UpsertRequest {
    UpsertRequest::from_text(yaml)
        .with_mode(mode)
        .with_dry_run(dry_run)
}
