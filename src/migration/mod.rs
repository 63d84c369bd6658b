// Copyright (c) 2025 - Cowboy AI, Inc.
//! Document Schema Migration
//!
//! Upgrades an inventory document written under an older schema version to
//! the version this program writes. Steps run on the untyped tree, before
//! records are decoded, so a step can reshape fields the typed decoder would
//! reject.
//!
//! # Version States
//!
//! ```text
//! stored == current  → UpToDate     (nothing to do)
//! stored <  current  → Stale        (run steps [stored, current))
//! stored >  current  → Unsupported  (fail, never interpreted)
//! ```
//!
//! The current version is the number of registered steps: step `n` moves a
//! document from version `n` to `n + 1`.
//!
//! # Writing Steps
//!
//! Steps must tolerate input that is already at or past their target shape.
//! Guard on the presence and type of a field rather than assuming it is
//! missing.
//!
//! ```rust,ignore
//! struct DropLegacyField;
//!
//! impl MigrationStep for DropLegacyField {
//!     fn name(&self) -> &'static str { "drop-legacy" }
//!
//!     fn apply(&self, mut tree: Value) -> Result<Value, MigrationError> {
//!         for record in records_mut(&mut tree)? {
//!             record.remove("legacy");
//!         }
//!         Ok(tree)
//!     }
//! }
//! ```

use serde_json::{Map, Value};
use std::fmt;
use tracing::{debug, info};

pub mod steps;

pub use steps::{InjectVersion, RamToObject, RunsOnToList};

/// Root key holding the schema version
pub const VERSION_KEY: &str = "version";

/// Root key holding the record list
pub const RESOURCES_KEY: &str = "resources";

/// Schema version written by this program
pub const CURRENT_SCHEMA_VERSION: u32 = 3;

/// Error type for migration operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationError {
    /// Document root is not a mapping
    NotAMapping,

    /// `version` is present but not a non-negative integer
    InvalidVersion(String),

    /// A step rejected the tree
    StepFailed { step: String, reason: String },

    /// Stored version is newer than the pipeline knows how to read
    Unsupported { found: u32, supported: u32 },
}

impl fmt::Display for MigrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationError::NotAMapping => write!(f, "Document root is not a mapping"),
            MigrationError::InvalidVersion(found) => {
                write!(f, "Document version must be a non-negative integer, found {}", found)
            }
            MigrationError::StepFailed { step, reason } => {
                write!(f, "Migration step '{}' failed: {}", step, reason)
            }
            MigrationError::Unsupported { found, supported } => {
                write!(
                    f,
                    "Document version {} is newer than supported version {}",
                    found, supported
                )
            }
        }
    }
}

impl std::error::Error for MigrationError {}

/// One ordered transform advancing the document by a single version
pub trait MigrationStep: Send + Sync {
    /// Short identifier used in logs and errors
    fn name(&self) -> &'static str;

    /// What the step changes
    fn description(&self) -> &'static str {
        ""
    }

    /// Transform the tree; must be safe on trees already in the target shape
    fn apply(&self, tree: Value) -> Result<Value, MigrationError>;
}

/// Where a stored version stands relative to the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaStatus {
    UpToDate,
    Stale { from: u32, to: u32 },
    Unsupported { found: u32, supported: u32 },
}

/// Result of running the pipeline over a tree
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationOutcome {
    /// Tree at the current version
    pub tree: Value,
    /// Version the tree was stored at
    pub from_version: u32,
    /// Version the tree is at now
    pub to_version: u32,
}

impl MigrationOutcome {
    /// Whether any step ran
    pub fn migrated(&self) -> bool {
        self.from_version != self.to_version
    }
}

/// Ordered chain of migration steps
pub struct MigrationPipeline {
    steps: Vec<Box<dyn MigrationStep>>,
}

impl MigrationPipeline {
    /// Empty pipeline (current version 0)
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Register the next step; its index is the version it migrates from
    pub fn add<S: MigrationStep + 'static>(&mut self, step: S) {
        self.steps.push(Box::new(step));
    }

    /// Builder form of [`add`](Self::add)
    pub fn with_step<S: MigrationStep + 'static>(mut self, step: S) -> Self {
        self.add(step);
        self
    }

    /// Version reached after running every step
    pub fn current_version(&self) -> u32 {
        self.steps.len() as u32
    }

    /// Names of the registered steps, in order
    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|step| step.name()).collect()
    }

    /// Classify a stored version
    pub fn status(&self, stored: u32) -> SchemaStatus {
        let current = self.current_version();
        match stored.cmp(&current) {
            std::cmp::Ordering::Equal => SchemaStatus::UpToDate,
            std::cmp::Ordering::Less => SchemaStatus::Stale {
                from: stored,
                to: current,
            },
            std::cmp::Ordering::Greater => SchemaStatus::Unsupported {
                found: stored,
                supported: current,
            },
        }
    }

    /// Bring a tree to the current version
    ///
    /// An unsupported version fails before any step has touched the tree.
    pub fn migrate(&self, tree: Value) -> Result<MigrationOutcome, MigrationError> {
        let stored = stored_version(&tree)?;
        match self.status(stored) {
            SchemaStatus::UpToDate => Ok(MigrationOutcome {
                tree,
                from_version: stored,
                to_version: stored,
            }),
            SchemaStatus::Stale { from, to } => {
                let tree = self.run_range(tree, from, to)?;
                Ok(MigrationOutcome {
                    tree,
                    from_version: from,
                    to_version: to,
                })
            }
            SchemaStatus::Unsupported { found, supported } => {
                Err(MigrationError::Unsupported { found, supported })
            }
        }
    }

    fn run_range(&self, mut tree: Value, from: u32, to: u32) -> Result<Value, MigrationError> {
        info!("Migrating inventory document from version {} to {}", from, to);

        for (index, step) in self
            .steps
            .iter()
            .enumerate()
            .skip(from as usize)
            .take((to - from) as usize)
        {
            debug!("Applying migration step {} ({})", index, step.name());
            tree = step.apply(tree)?;
            set_version(&mut tree, index as u32 + 1)?;
        }

        Ok(tree)
    }
}

impl Default for MigrationPipeline {
    /// The pipeline for [`CURRENT_SCHEMA_VERSION`]
    fn default() -> Self {
        Self::new()
            .with_step(InjectVersion)
            .with_step(RunsOnToList)
            .with_step(RamToObject)
    }
}

/// Read the stored version; an empty document or absent key means version 0
pub fn stored_version(tree: &Value) -> Result<u32, MigrationError> {
    if tree.is_null() {
        return Ok(0);
    }
    let root = tree.as_object().ok_or(MigrationError::NotAMapping)?;
    match find_key(root, VERSION_KEY).and_then(|key| root.get(&key)) {
        None | Some(Value::Null) => Ok(0),
        Some(value) => value
            .as_u64()
            .and_then(|version| u32::try_from(version).ok())
            .ok_or_else(|| MigrationError::InvalidVersion(value.to_string())),
    }
}

/// Set the stored version
pub fn set_version(tree: &mut Value, version: u32) -> Result<(), MigrationError> {
    let root = tree.as_object_mut().ok_or(MigrationError::NotAMapping)?;
    root.retain(|key, _| !key.eq_ignore_ascii_case(VERSION_KEY));
    root.insert(VERSION_KEY.to_string(), Value::from(version));
    Ok(())
}

/// Mutable access to every record mapping in the tree
///
/// The `resources` key is matched ignoring case. A missing or null list
/// yields nothing; anything other than a list is an error.
pub fn records_mut(tree: &mut Value) -> Result<Vec<&mut Map<String, Value>>, MigrationError> {
    let root = tree.as_object_mut().ok_or(MigrationError::NotAMapping)?;
    let records = match find_key(root, RESOURCES_KEY) {
        Some(key) => root.get_mut(&key),
        None => None,
    };
    match records {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(records)) => Ok(records.iter_mut().filter_map(Value::as_object_mut).collect()),
        Some(other) => Err(MigrationError::StepFailed {
            step: "records".to_string(),
            reason: format!("'{}' must be a list, found {}", RESOURCES_KEY, type_name(other)),
        }),
    }
}

/// Find a record key ignoring case
pub fn find_key(record: &Map<String, Value>, key: &str) -> Option<String> {
    record
        .keys()
        .find(|candidate| candidate.eq_ignore_ascii_case(key))
        .cloned()
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}
