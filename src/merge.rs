// Copyright (c) 2025 - Cowboy AI, Inc.
//! Strategic Merge Engine
//!
//! Combines an incoming batch of records with the existing set. Pure: no
//! I/O, no shared state, and callers' records are never mutated.
//!
//! # Rules
//!
//! ```text
//! incoming name unknown                → append
//! mode == Replace  OR  kind changed    → incoming replaces existing
//! mode == Merge    AND same kind       → field-level merge:
//!     Scalar  incoming Some overwrites
//!     Map     keys upserted, others kept
//!     List    non-empty replaces, empty keeps existing
//!     Nested  absent → take incoming, else recurse
//! ```
//!
//! Replace mode declares the full desired state of a record, so whatever it
//! leaves out is cleared. Merge mode is a partial patch; an empty list cannot
//! be told apart from an omitted one and is ignored.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::{NameKey, Resource};
use crate::errors::InventoryError;

/// How matched records are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MergeMode {
    /// Incoming record is the full desired state
    Replace,
    /// Incoming record is a partial patch
    #[default]
    Merge,
}

impl MergeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Replace => "Replace",
            Self::Merge => "Merge",
        }
    }
}

impl fmt::Display for MergeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MergeMode {
    type Err = InventoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "replace" => Ok(Self::Replace),
            "merge" => Ok(Self::Merge),
            other => Err(InventoryError::InvalidInput(format!(
                "Unknown merge mode: {}",
                other
            ))),
        }
    }
}

/// Combine one incoming record with the existing record of the same name
///
/// In Merge mode the existing record keeps its name spelling; in Replace
/// mode (or on a kind change) the incoming record is taken whole.
pub fn merge_one(existing: &Resource, incoming: &Resource, mode: MergeMode) -> Resource {
    let incoming = incoming.clone();
    if mode == MergeMode::Replace {
        return incoming;
    }

    let mut merged = existing.clone();
    match merged.merge_same_kind(incoming) {
        Ok(()) => merged,
        Err(replacement) => replacement,
    }
}

/// Merge an incoming batch into the existing set
///
/// Existing records keep their document order; records new to the set are
/// appended in incoming order. Incoming names are expected to be unique.
pub fn merge_resources(
    existing: &[Resource],
    incoming: &[Resource],
    mode: MergeMode,
) -> Vec<Resource> {
    let mut merged: Vec<Resource> = existing.to_vec();
    let mut index: HashMap<NameKey, usize> = merged
        .iter()
        .enumerate()
        .map(|(position, resource)| (resource.key(), position))
        .collect();

    for record in incoming {
        match index.get(&record.key()) {
            Some(&position) => {
                merged[position] = merge_one(&merged[position], record, mode);
            }
            None => {
                index.insert(record.key(), merged.len());
                merged.push(record.clone());
            }
        }
    }

    merged
}
