// Copyright (c) 2025 - Cowboy AI, Inc.
//! Inventory Service
//!
//! The single owner of the loaded document. Every read-modify-write runs
//! under one writer lock, and the store save happens before the new state is
//! published to readers.
//!
//! # Architecture
//!
//! ```text
//! Caller
//!     ↓
//! Inventory (writer lock)
//!     ↓
//! Merge Engine / edit      ← pure
//!     ↓
//! DocumentStore::save     ← full rewrite
//!     ↓
//! publish Arc<VersionedDocument>
//! ```
//!
//! Readers clone the published `Arc` and never wait on a writer.
//!
//! # Example
//!
//! ```rust,no_run
//! use cim_inventory::{FileDocumentStore, Inventory, InventoryConfig, UpsertRequest};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let store = FileDocumentStore::new(InventoryConfig::new("inventory.yaml"));
//! let inventory = Inventory::open(store).await?;
//!
//! let response = inventory
//!     .upsert(UpsertRequest::from_text("resources:\n  - {kind: Server, name: srv}\n"))
//!     .await?;
//! println!("added: {:?}", response.added);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard, RwLock};
use tracing::info;

use crate::document::{DocumentStore, VersionedDocument};
use crate::domain::{validate_name, NameKey, Resource};
use crate::errors::{InventoryError, InventoryResult};
use crate::migration::MigrationPipeline;

pub mod upsert;

pub use upsert::{plan_upsert, UpsertPlan, UpsertRequest, UpsertResponse};

/// Loaded inventory bound to its store
pub struct Inventory<S: DocumentStore> {
    store: S,
    pipeline: MigrationPipeline,
    writer: Mutex<()>,
    current: RwLock<Arc<VersionedDocument>>,
}

impl<S: DocumentStore> Inventory<S> {
    /// Load the document, migrating it if it is stale
    pub async fn open(store: S) -> InventoryResult<Self> {
        let inventory = Self {
            store,
            pipeline: MigrationPipeline::default(),
            writer: Mutex::new(()),
            current: RwLock::new(Arc::new(VersionedDocument::empty())),
        };
        let document = inventory.reload().await?;
        info!(
            "Opened inventory at schema v{} with {} resources",
            document.version,
            document.len()
        );
        Ok(inventory)
    }

    /// Re-read the store under the writer lock and publish what it holds
    ///
    /// A stale document is backed up and rewritten before anything is
    /// published, so no edit can interleave with the migration.
    pub async fn reload(&self) -> InventoryResult<Arc<VersionedDocument>> {
        let _guard = self.writer.lock().await;
        let document = Arc::new(self.store.load().await?);
        *self.current.write().await = Arc::clone(&document);
        Ok(document)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub(crate) fn pipeline(&self) -> &MigrationPipeline {
        &self.pipeline
    }

    /// The currently published document
    pub async fn snapshot(&self) -> Arc<VersionedDocument> {
        self.current.read().await.clone()
    }

    /// All records in document order
    pub async fn resources(&self) -> Vec<Resource> {
        self.snapshot().await.resources.clone()
    }

    /// Record by name, ignoring case
    pub async fn get(&self, name: &str) -> Option<Resource> {
        self.snapshot().await.find(name).cloned()
    }

    pub async fn contains(&self, name: &str) -> bool {
        self.snapshot().await.find(name).is_some()
    }

    /// Names of records whose `runsOn` references `name`
    pub async fn dependents(&self, name: &str) -> Vec<String> {
        dependents_of(&self.snapshot().await.resources, name)
    }

    /// Add a new record; the name must be free under every kind
    pub async fn add(&self, resource: Resource) -> InventoryResult<()> {
        validate_name(resource.name())?;
        let writer = self.writer.lock().await;
        let current = self.snapshot().await;

        if let Some(existing) = current.find(resource.name()) {
            return Err(InventoryError::Conflict(format!(
                "{} already exists as {}",
                existing.name(),
                existing.kind()
            )));
        }

        let name = resource.name().to_string();
        let mut resources = current.resources.clone();
        resources.push(resource);
        self.commit(&writer, resources).await?;
        info!("Added resource {}", name);
        Ok(())
    }

    /// Remove a record and strip it from every `runsOn` list
    pub async fn delete(&self, name: &str) -> InventoryResult<Resource> {
        let writer = self.writer.lock().await;
        let current = self.snapshot().await;
        let position = current
            .position(name)
            .ok_or_else(|| InventoryError::NotFound(name.to_string()))?;

        let mut resources = current.resources.clone();
        let removed = resources.remove(position);
        let key = removed.key();
        for resource in &mut resources {
            resource.meta_mut().runs_on.retain(|parent| !key.matches(parent));
        }

        self.commit(&writer, resources).await?;
        info!("Deleted resource {}", removed.name());
        Ok(removed)
    }

    /// Rename a record and every `runsOn` reference to it
    ///
    /// Changing only the case of a name is allowed.
    pub async fn rename(&self, old_name: &str, new_name: &str) -> InventoryResult<()> {
        validate_name(new_name)?;
        let writer = self.writer.lock().await;
        let current = self.snapshot().await;
        let position = current
            .position(old_name)
            .ok_or_else(|| InventoryError::NotFound(old_name.to_string()))?;

        if let Some(taken) = current.position(new_name) {
            if taken != position {
                return Err(InventoryError::Conflict(format!(
                    "{} already exists",
                    current.resources[taken].name()
                )));
            }
        }

        let mut resources = current.resources.clone();
        let old_key = resources[position].key();
        resources[position].set_name(new_name);
        for resource in &mut resources {
            for parent in &mut resource.meta_mut().runs_on {
                if old_key.matches(parent) {
                    *parent = new_name.to_string();
                }
            }
        }

        self.commit(&writer, resources).await?;
        info!("Renamed resource {} to {}", old_name, new_name);
        Ok(())
    }

    /// Deep copy a record under a new name
    pub async fn clone_resource(&self, source: &str, new_name: &str) -> InventoryResult<Resource> {
        validate_name(new_name)?;
        let writer = self.writer.lock().await;
        let current = self.snapshot().await;
        let original = current
            .find(source)
            .ok_or_else(|| InventoryError::NotFound(source.to_string()))?;

        if let Some(existing) = current.find(new_name) {
            return Err(InventoryError::Conflict(format!(
                "{} already exists",
                existing.name()
            )));
        }

        let copy = original.clone_named(new_name);
        let mut resources = current.resources.clone();
        resources.push(copy.clone());
        self.commit(&writer, resources).await?;
        info!("Cloned resource {} as {}", source, new_name);
        Ok(copy)
    }

    /// Save `resources` and publish them
    ///
    /// The writer guard proves the caller holds the lock. State is only
    /// published after the store accepted the save.
    async fn commit(&self, _writer: &MutexGuard<'_, ()>, resources: Vec<Resource>) -> InventoryResult<()> {
        let document = VersionedDocument::with_resources(resources);
        self.store.save(&document).await?;
        *self.current.write().await = Arc::new(document);
        Ok(())
    }
}

/// Names of records in `resources` that run on `name`
pub fn dependents_of(resources: &[Resource], name: &str) -> Vec<String> {
    let key = NameKey::new(name);
    resources
        .iter()
        .filter(|resource| resource.runs_on().iter().any(|parent| key.matches(parent)))
        .map(|resource| resource.name().to_string())
        .collect()
}
