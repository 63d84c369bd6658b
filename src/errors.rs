// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for inventory operations

use thiserror::Error;

use crate::migration::MigrationError;

/// Errors that can occur while loading, migrating, merging or saving the inventory
#[derive(Debug, Error)]
pub enum InventoryError {
    /// Malformed request or undecodable incoming records
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Stored or incoming document was written by a newer program
    #[error("Document schema version {found} is newer than the supported version {supported}")]
    SchemaTooNew { found: u32, supported: u32 },

    /// Named resource does not exist
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Operation would collide with an existing resource name
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Record carries a kind discriminator outside the closed set
    #[error("Unknown resource kind: {kind}")]
    UnknownKind { kind: String },

    /// Stored document cannot be parsed or decoded
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// A migration step rejected the document tree
    #[error("Migration error: {0}")]
    Migration(MigrationError),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for inventory operations
pub type InventoryResult<T> = Result<T, InventoryError>;

impl From<serde_yaml::Error> for InventoryError {
    fn from(err: serde_yaml::Error) -> Self {
        InventoryError::Serialization(err.to_string())
    }
}

impl From<MigrationError> for InventoryError {
    fn from(err: MigrationError) -> Self {
        match err {
            MigrationError::Unsupported { found, supported } => {
                InventoryError::SchemaTooNew { found, supported }
            }
            other => InventoryError::Migration(other),
        }
    }
}

impl InventoryError {
    /// Whether the error was caused by the caller's request rather than stored state
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            InventoryError::InvalidInput(_)
                | InventoryError::NotFound(_)
                | InventoryError::Conflict(_)
                | InventoryError::UnknownKind { .. }
        )
    }
}
