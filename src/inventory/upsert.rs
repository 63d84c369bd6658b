// Copyright (c) 2025 - Cowboy AI, Inc.
//! Diff/Upsert
//!
//! Imports a batch of records, merges it into the inventory, and reports
//! what changed with before/after snapshots.
//!
//! # Classification
//!
//! | Before        | Condition                       | Result     |
//! |---------------|---------------------------------|------------|
//! | absent        |                                 | `added`    |
//! | present       | Replace mode or kind changed    | `replaced` |
//! | present       | snapshot differs after merge    | `updated`  |
//! | present       | snapshot identical              | (none)     |
//!
//! A dry run computes the full response and leaves both storage and the
//! in-memory document untouched.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info, warn};

use super::Inventory;
use crate::document::{self, DocumentStore};
use crate::domain::{NameKey, Resource};
use crate::errors::{InventoryError, InventoryResult};
use crate::merge::{merge_resources, MergeMode};
use crate::migration::{find_key, MigrationError, MigrationPipeline, RESOURCES_KEY, VERSION_KEY};

/// Import request
///
/// Exactly one of `raw_text` and `structured_input` must be set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertRequest {
    /// YAML or JSON document text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
    /// Already-parsed document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured_input: Option<Value>,
    #[serde(default)]
    pub mode: MergeMode,
    #[serde(default)]
    pub dry_run: bool,
}

impl UpsertRequest {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            raw_text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn from_value(input: Value) -> Self {
        Self {
            structured_input: Some(input),
            ..Self::default()
        }
    }

    pub fn with_mode(mut self, mode: MergeMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Parse the input into an untyped tree
    fn input_tree(&self) -> InventoryResult<Value> {
        match (&self.raw_text, &self.structured_input) {
            (Some(text), None) => document::parse_tree(text)
                .map_err(|e| InventoryError::InvalidInput(format!("Cannot parse input: {}", e))),
            (None, Some(input)) => Ok(input.clone()),
            (Some(_), Some(_)) => Err(InventoryError::InvalidInput(
                "Set either rawText or structuredInput, not both".to_string(),
            )),
            (None, None) => Err(InventoryError::InvalidInput(
                "One of rawText or structuredInput is required".to_string(),
            )),
        }
    }

    /// Decode the incoming batch, migrating it first if it carries a version
    pub fn decode(&self, pipeline: &MigrationPipeline) -> InventoryResult<Vec<Resource>> {
        let mut tree = self.input_tree()?;
        let Value::Object(root) = &tree else {
            return Err(InventoryError::InvalidInput(
                "Input must be a mapping with a resources list".to_string(),
            ));
        };

        if find_key(root, VERSION_KEY).is_some() {
            tree = pipeline.migrate(tree).map(|outcome| outcome.tree).map_err(|e| match e {
                MigrationError::Unsupported { .. } => InventoryError::from(e),
                other => InventoryError::InvalidInput(other.to_string()),
            })?;
        }

        let records = match &tree {
            Value::Object(root) => match find_key(root, RESOURCES_KEY).and_then(|key| root.get(&key)) {
                Some(Value::Array(records)) => records.clone(),
                Some(Value::Null) | None => {
                    return Err(InventoryError::InvalidInput(
                        "Input has no resources list".to_string(),
                    ))
                }
                Some(_) => {
                    return Err(InventoryError::InvalidInput(
                        "resources must be a list".to_string(),
                    ))
                }
            },
            _ => {
                return Err(InventoryError::InvalidInput(
                    "Input must be a mapping with a resources list".to_string(),
                ))
            }
        };

        let incoming = records
            .into_iter()
            .map(document::decode_record)
            .collect::<InventoryResult<Vec<_>>>()?;
        document::ensure_unique_names(&incoming)?;
        Ok(incoming)
    }
}

/// What an import did (or would do, for a dry run)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertResponse {
    pub added: Vec<String>,
    pub updated: Vec<String>,
    pub replaced: Vec<String>,
    /// Existing records matched by the import, before the merge
    pub old_snapshots: BTreeMap<String, String>,
    /// Every incoming record after the merge
    pub new_snapshots: BTreeMap<String, String>,
}

impl UpsertResponse {
    /// Whether any record was added, updated or replaced
    pub fn has_changes(&self) -> bool {
        !(self.added.is_empty() && self.updated.is_empty() && self.replaced.is_empty())
    }
}

/// Merged resource set plus the report describing it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertPlan {
    pub merged: Vec<Resource>,
    pub response: UpsertResponse,
}

/// Merge `incoming` into `existing` and classify every incoming record
///
/// Pure: neither input is modified.
pub fn plan_upsert(
    existing: &[Resource],
    incoming: &[Resource],
    mode: MergeMode,
) -> InventoryResult<UpsertPlan> {
    let before: HashMap<NameKey, &Resource> =
        existing.iter().map(|resource| (resource.key(), resource)).collect();

    let merged = merge_resources(existing, incoming, mode);
    let after: HashMap<NameKey, &Resource> =
        merged.iter().map(|resource| (resource.key(), resource)).collect();

    // Both snapshot maps are keyed by the name the record is stored under
    let mut response = UpsertResponse::default();
    for record in incoming {
        let key = record.key();
        let Some(result) = after.get(&key) else {
            continue;
        };
        let stored_name = result.name().to_string();
        let new_snapshot = document::snapshot(result)?;

        match before.get(&key) {
            None => {
                debug!("{} {}: added", record.kind(), record.name());
                response.added.push(stored_name.clone());
            }
            Some(previous) => {
                let old_snapshot = document::snapshot(previous)?;
                if mode == MergeMode::Replace || previous.kind() != record.kind() {
                    debug!(
                        "{} {}: replaced (was {})",
                        record.kind(),
                        record.name(),
                        previous.kind()
                    );
                    response.replaced.push(stored_name.clone());
                } else if old_snapshot != new_snapshot {
                    debug!("{} {}: updated", record.kind(), record.name());
                    response.updated.push(stored_name.clone());
                } else {
                    debug!("{} {}: unchanged", record.kind(), record.name());
                }
                response.old_snapshots.insert(stored_name.clone(), old_snapshot);
            }
        }

        response.new_snapshots.insert(stored_name, new_snapshot);
    }

    Ok(UpsertPlan { merged, response })
}

/// Incoming `runsOn` references that name no record in `merged`
fn dangling_references<'a>(merged: &[Resource], incoming: &'a [Resource]) -> Vec<(&'a str, &'a str)> {
    let known: HashSet<NameKey> = merged.iter().map(Resource::key).collect();
    incoming
        .iter()
        .flat_map(|record| {
            record
                .runs_on()
                .iter()
                .map(move |parent| (record.name(), parent.as_str()))
        })
        .filter(|(_, parent)| !known.contains(&NameKey::new(parent)))
        .collect()
}

impl<S: DocumentStore> Inventory<S> {
    /// Import a batch of records
    ///
    /// Unless `dry_run` is set, the merged document is saved and published
    /// before this returns. A failed save leaves the inventory unchanged.
    pub async fn upsert(&self, request: UpsertRequest) -> InventoryResult<UpsertResponse> {
        let incoming = request.decode(self.pipeline())?;

        let writer = self.writer.lock().await;
        let current = self.snapshot().await;
        let UpsertPlan { merged, response } = plan_upsert(&current.resources, &incoming, request.mode)?;

        for (child, parent) in dangling_references(&merged, &incoming) {
            warn!("{} runs on unknown resource {}", child, parent);
        }

        if request.dry_run {
            info!(
                "Dry run ({}): {} added, {} updated, {} replaced",
                request.mode,
                response.added.len(),
                response.updated.len(),
                response.replaced.len()
            );
            return Ok(response);
        }

        self.commit(&writer, merged).await?;
        info!(
            "Committed import ({}): {} added, {} updated, {} replaced",
            request.mode,
            response.added.len(),
            response.updated.len(),
            response.replaced.len()
        );
        Ok(response)
    }
}
