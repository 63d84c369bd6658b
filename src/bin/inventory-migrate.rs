// Copyright (c) 2025 - Cowboy AI, Inc.
//! Inventory Migration Tool
//!
//! Opens the inventory document, upgrading it to the current schema (with a
//! backup of the original), and optionally previews or applies an import.
//!
//! Run with: cargo run --bin inventory-migrate
//!
//! Environment:
//! 1. `CIM_INVENTORY_PATH` - document path (default `inventory.yaml`)
//! 2. `CIM_INVENTORY_CREATE` - treat a missing file as empty (default `true`)
//! 3. `CIM_INVENTORY_IMPORT` - optional YAML/JSON file to upsert
//! 4. `CIM_INVENTORY_MODE` - `Merge` (default) or `Replace`
//! 5. `CIM_INVENTORY_DRY_RUN` - preview only (default `true`)

use anyhow::{Context, Result};
use cim_inventory::{
    config::env_flag, FileDocumentStore, Inventory, InventoryConfig, MergeMode, UpsertRequest,
};
use std::path::PathBuf;
use tracing::{info, warn};

/// Import settings, present only when an import file is named
#[derive(Debug, Clone)]
struct ImportConfig {
    path: PathBuf,
    mode: MergeMode,
    dry_run: bool,
}

impl ImportConfig {
    /// Load import settings from environment variables
    fn from_env() -> Result<Option<Self>> {
        let Ok(path) = std::env::var("CIM_INVENTORY_IMPORT") else {
            return Ok(None);
        };

        let mode = match std::env::var("CIM_INVENTORY_MODE") {
            Ok(mode) => mode.parse::<MergeMode>().context("CIM_INVENTORY_MODE is invalid")?,
            Err(_) => MergeMode::default(),
        };
        let dry_run = env_flag("CIM_INVENTORY_DRY_RUN", true)?;

        Ok(Some(Self {
            path: PathBuf::from(path),
            mode,
            dry_run,
        }))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = InventoryConfig::from_env().context("Failed to read inventory configuration")?;
    let import = ImportConfig::from_env()?;
    info!("Inventory: {}", config.path.display());
    info!("  - create if missing: {}", config.create_if_missing);

    let inventory = Inventory::open(FileDocumentStore::new(config.clone()))
        .await
        .with_context(|| format!("Failed to open {}", config.path.display()))?;

    let snapshot = inventory.snapshot().await;
    info!(
        "Inventory is at schema v{} with {} resources",
        snapshot.version,
        snapshot.len()
    );

    let Some(import) = import else {
        return Ok(());
    };

    let text = tokio::fs::read_to_string(&import.path)
        .await
        .with_context(|| format!("Failed to read {}", import.path.display()))?;
    let request = UpsertRequest::from_text(text)
        .with_mode(import.mode)
        .with_dry_run(import.dry_run);

    let response = inventory
        .upsert(request)
        .await
        .with_context(|| format!("Failed to import {}", import.path.display()))?;

    if import.dry_run {
        warn!("Dry run: nothing was written");
    }
    info!("Added: {:?}", response.added);
    info!("Updated: {:?}", response.updated);
    info!("Replaced: {:?}", response.replaced);

    Ok(())
}
