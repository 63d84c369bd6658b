// Copyright (c) 2025 - Cowboy AI, Inc.
//! Document Storage
//!
//! Stores hold the single inventory document. Loading always runs the
//! migration pipeline, so callers only ever see current-schema records.
//!
//! # Load Flow
//!
//! ```text
//! read bytes ──(missing)──→ empty document (create_if_missing)
//!     │
//!     ▼
//! migrate ──(stale)──→ backup original bytes → save upgraded document
//!     │
//!     ▼
//! typed document
//! ```
//!
//! Saves are atomic: the new text is written to `<path>.tmp` and renamed
//! over the target, so readers never observe a half-written file.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{encode, load_text, VersionedDocument};
use crate::config::InventoryConfig;
use crate::errors::{InventoryError, InventoryResult};
use crate::migration::{MigrationPipeline, CURRENT_SCHEMA_VERSION};

/// Persistence for the inventory document
///
/// Implementations must make `save` all-or-nothing: after a failed save the
/// previously stored document is still intact.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read the stored document, migrating it to the current schema
    ///
    /// A migrated document is written back before it is returned.
    async fn load(&self) -> InventoryResult<VersionedDocument>;

    /// Replace the stored document
    async fn save(&self, document: &VersionedDocument) -> InventoryResult<()>;
}

/// Backup file name for a document migrated at `at`
///
/// `inventory.yaml` → `inventory.yaml.bak.20250101120000`
pub fn backup_path(path: &Path, at: DateTime<Utc>) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".bak.{}", at.format("%Y%m%d%H%M%S")));
    PathBuf::from(name)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

fn check_saveable(document: &VersionedDocument) -> InventoryResult<()> {
    if document.version > CURRENT_SCHEMA_VERSION {
        return Err(InventoryError::SchemaTooNew {
            found: document.version,
            supported: CURRENT_SCHEMA_VERSION,
        });
    }
    document.validate()
}

/// YAML file on the local filesystem
pub struct FileDocumentStore {
    config: InventoryConfig,
    pipeline: MigrationPipeline,
}

impl FileDocumentStore {
    pub fn new(config: InventoryConfig) -> Self {
        Self::with_pipeline(config, MigrationPipeline::default())
    }

    pub fn with_pipeline(config: InventoryConfig, pipeline: MigrationPipeline) -> Self {
        Self { config, pipeline }
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    pub fn config(&self) -> &InventoryConfig {
        &self.config
    }

    /// Copy the original bytes next to the document, never overwriting an
    /// earlier backup
    async fn write_backup(&self, original: &[u8]) -> InventoryResult<PathBuf> {
        let base = backup_path(self.path(), Utc::now());
        let mut attempt = 0u32;
        loop {
            let candidate = if attempt == 0 {
                base.clone()
            } else {
                let mut name = base.as_os_str().to_os_string();
                name.push(format!("-{}", attempt));
                PathBuf::from(name)
            };

            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&candidate)
                .await
            {
                Ok(mut file) => {
                    file.write_all(original).await?;
                    file.flush().await?;
                    return Ok(candidate);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[async_trait]
impl DocumentStore for FileDocumentStore {
    async fn load(&self) -> InventoryResult<VersionedDocument> {
        let bytes = match tokio::fs::read(self.path()).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound && self.config.create_if_missing => {
                info!(
                    "No inventory at {}, starting from an empty document",
                    self.path().display()
                );
                return Ok(VersionedDocument::empty());
            }
            Err(e) => return Err(e.into()),
        };

        let text = std::str::from_utf8(&bytes).map_err(|e| {
            InventoryError::InvalidDocument(format!("{} is not UTF-8: {}", self.path().display(), e))
        })?;
        let loaded = load_text(text, &self.pipeline)?;

        if loaded.was_migrated() {
            let backup = self.write_backup(&bytes).await?;
            info!("Backed up schema v{} document to {}", loaded.stored_version, backup.display());
            self.save(&loaded.document).await?;
            info!(
                "Upgraded {} from schema v{} to v{}",
                self.path().display(),
                loaded.stored_version,
                loaded.document.version
            );
        }

        debug!(
            "Loaded {} resources from {}",
            loaded.document.len(),
            self.path().display()
        );
        Ok(loaded.document)
    }

    async fn save(&self, document: &VersionedDocument) -> InventoryResult<()> {
        check_saveable(document)?;
        let text = encode(document)?;

        if let Some(parent) = self.path().parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let temp = temp_path(self.path());
        tokio::fs::write(&temp, text.as_bytes()).await?;
        if let Err(e) = tokio::fs::rename(&temp, self.path()).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(e.into());
        }

        debug!(
            "Saved {} resources to {}",
            document.len(),
            self.path().display()
        );
        Ok(())
    }
}

/// In-memory store holding the document as text
///
/// Goes through the same parse and migration path as the file store, which
/// makes it suitable for tests of both.
#[derive(Default)]
pub struct MemoryDocumentStore {
    text: Mutex<Option<String>>,
    backups: Mutex<Vec<String>>,
    pipeline: MigrationPipeline,
}

impl MemoryDocumentStore {
    /// Store with nothing saved yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Store preloaded with raw document text
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: Mutex::new(Some(text.into())),
            ..Self::default()
        }
    }

    /// Current stored text
    pub async fn text(&self) -> Option<String> {
        self.text.lock().await.clone()
    }

    /// Original texts preserved by migrations, oldest first
    pub async fn backups(&self) -> Vec<String> {
        self.backups.lock().await.clone()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn load(&self) -> InventoryResult<VersionedDocument> {
        let Some(text) = self.text().await else {
            return Ok(VersionedDocument::empty());
        };

        let loaded = load_text(&text, &self.pipeline)?;
        if loaded.was_migrated() {
            self.backups.lock().await.push(text);
            self.save(&loaded.document).await?;
            info!(
                "Upgraded in-memory document from schema v{} to v{}",
                loaded.stored_version, loaded.document.version
            );
        }
        Ok(loaded.document)
    }

    async fn save(&self, document: &VersionedDocument) -> InventoryResult<()> {
        check_saveable(document)?;
        let text = encode(document)?;
        *self.text.lock().await = Some(text);
        Ok(())
    }
}
