// Copyright (c) 2025 - Cowboy AI, Inc.
//! Inventory configuration

use std::path::PathBuf;

use crate::errors::{InventoryError, InventoryResult};

/// Where the inventory lives and how it is opened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryConfig {
    /// Path of the YAML document
    pub path: PathBuf,
    /// Treat a missing file as an empty inventory
    pub create_if_missing: bool,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("inventory.yaml"),
            create_if_missing: true,
        }
    }
}

impl InventoryConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Load configuration from environment variables
    ///
    /// - `CIM_INVENTORY_PATH` (default `inventory.yaml`)
    /// - `CIM_INVENTORY_CREATE` (default `true`)
    pub fn from_env() -> InventoryResult<Self> {
        let defaults = Self::default();
        Ok(Self {
            path: std::env::var("CIM_INVENTORY_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.path),
            create_if_missing: env_flag("CIM_INVENTORY_CREATE", defaults.create_if_missing)?,
        })
    }
}

/// Read a boolean environment variable, falling back to `default` when unset
pub fn env_flag(name: &str, default: bool) -> InventoryResult<bool> {
    match std::env::var(name) {
        Ok(value) => parse_flag(&value).ok_or_else(|| {
            InventoryError::InvalidInput(format!("{} must be true or false, got '{}'", name, value))
        }),
        Err(_) => Ok(default),
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
