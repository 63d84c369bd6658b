// Copyright (c) 2025 - Cowboy AI, Inc.
//! Versioned infrastructure inventory for the Composable Information Machine
//!
//! A single YAML document holds every server, network device, workstation,
//! power unit, system and service. This crate loads it (upgrading older
//! schema versions), merges imported batches into it field by field, and
//! reports exactly what an import changed.
//!
//! # Modules
//!
//! - [`domain`] - resource kinds, typed records and their merge schemas
//! - [`migration`] - ordered schema upgrade steps over the untyped tree
//! - [`merge`] - pure strategic merge of record sets
//! - [`document`] - YAML codec and document stores
//! - [`inventory`] - locked read-modify-write service and upsert
//! - [`config`] - environment-driven configuration

pub mod config;
pub mod document;
pub mod domain;
pub mod errors;
pub mod inventory;
pub mod merge;
pub mod migration;

// Re-export commonly used types
pub use config::InventoryConfig;
pub use document::{DocumentStore, FileDocumentStore, MemoryDocumentStore, VersionedDocument};
pub use domain::{NameKey, Resource, ResourceKind, ResourceMeta};
pub use errors::{InventoryError, InventoryResult};
pub use inventory::{Inventory, UpsertRequest, UpsertResponse};
pub use merge::{merge_resources, MergeMode};
pub use migration::{MigrationPipeline, CURRENT_SCHEMA_VERSION};
