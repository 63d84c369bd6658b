// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource Name Identity
//!
//! Resource names are the natural key of the inventory. Identity is
//! case-insensitive and document-wide: `CaseTest` and `casetest` are the same
//! resource no matter which kind either record declares.

use std::fmt;
use thiserror::Error;

use crate::errors::InventoryError;

/// Resource name validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NameError {
    #[error("Resource name is empty")]
    Empty,

    #[error("Resource name has leading or trailing whitespace: {0:?}")]
    Untrimmed(String),

    #[error("Invalid control character in resource name: {0:?}")]
    ControlCharacter(String),
}

impl From<NameError> for InventoryError {
    fn from(err: NameError) -> Self {
        InventoryError::InvalidInput(err.to_string())
    }
}

/// Validate a resource name
///
/// # Invariants
/// - Non-empty
/// - No surrounding whitespace
/// - No control characters
pub fn validate_name(name: &str) -> Result<(), NameError> {
    if name.trim().is_empty() {
        return Err(NameError::Empty);
    }

    if name.trim() != name {
        return Err(NameError::Untrimmed(name.to_string()));
    }

    if name.chars().any(char::is_control) {
        return Err(NameError::ControlCharacter(name.to_string()));
    }

    Ok(())
}

/// Case-insensitive identity of a resource name
///
/// Two names denote the same resource exactly when their keys are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NameKey(String);

impl NameKey {
    /// Build the key for a name
    pub fn new(name: &str) -> Self {
        Self(name.to_lowercase())
    }

    /// The folded key
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `name` folds to this key
    pub fn matches(&self, name: &str) -> bool {
        *self == Self::new(name)
    }
}

impl fmt::Display for NameKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NameKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}
