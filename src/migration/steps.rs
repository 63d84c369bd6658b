// Copyright (c) 2025 - Cowboy AI, Inc.
//! Registered Migration Steps
//!
//! | From | Step             | Change                                        |
//! |------|------------------|-----------------------------------------------|
//! | 0    | `inject-version` | root becomes a mapping with `version`/`resources` |
//! | 1    | `runs-on-list`   | scalar `runsOn` becomes a one-element list    |
//! | 2    | `ram-object`     | numeric `ram` becomes `{sizeGb: n}`           |

use serde_json::{json, Map, Value};

use super::{find_key, records_mut, type_name, MigrationError, MigrationStep, RESOURCES_KEY, VERSION_KEY};

/// Version 0 → 1: give the document its root shape
///
/// Early documents were either empty or a mapping without a version. Root
/// keys are folded to their canonical spelling.
pub struct InjectVersion;

impl MigrationStep for InjectVersion {
    fn name(&self) -> &'static str {
        "inject-version"
    }

    fn description(&self) -> &'static str {
        "Ensure the document root carries version and resources"
    }

    fn apply(&self, tree: Value) -> Result<Value, MigrationError> {
        let mut root = match tree {
            Value::Null => Map::new(),
            Value::Object(root) => root,
            _ => return Err(MigrationError::NotAMapping),
        };

        for canonical in [VERSION_KEY, RESOURCES_KEY] {
            if let Some(found) = find_key(&root, canonical) {
                if found != canonical {
                    if let Some(value) = root.remove(&found) {
                        root.insert(canonical.to_string(), value);
                    }
                }
            }
        }

        root.entry(VERSION_KEY.to_string()).or_insert(json!(0));
        match root.get(RESOURCES_KEY) {
            None | Some(Value::Null) => {
                root.insert(RESOURCES_KEY.to_string(), Value::Array(Vec::new()));
            }
            Some(_) => {}
        }

        Ok(Value::Object(root))
    }
}

/// Version 1 → 2: `runsOn` was once a single parent name
pub struct RunsOnToList;

impl MigrationStep for RunsOnToList {
    fn name(&self) -> &'static str {
        "runs-on-list"
    }

    fn description(&self) -> &'static str {
        "Normalize runsOn from a scalar to a list of names"
    }

    fn apply(&self, mut tree: Value) -> Result<Value, MigrationError> {
        for record in records_mut(&mut tree)? {
            let Some(key) = find_key(record, "runsOn") else {
                continue;
            };

            let replacement = match record.get(&key) {
                Some(Value::Null) => None,
                Some(Value::String(parent)) => Some(json!([parent])),
                Some(Value::Number(parent)) => Some(json!([parent.to_string()])),
                Some(Value::Array(_)) => continue,
                Some(other) => {
                    return Err(MigrationError::StepFailed {
                        step: self.name().to_string(),
                        reason: format!("runsOn cannot be a {}", type_name(other)),
                    })
                }
                None => continue,
            };

            match replacement {
                Some(list) => {
                    record.insert(key, list);
                }
                None => {
                    record.remove(&key);
                }
            }
        }
        Ok(tree)
    }
}

/// Version 2 → 3: `ram` was once a bare size in GB
pub struct RamToObject;

impl RamToObject {
    fn parse_size(raw: &str) -> Option<u64> {
        let trimmed = raw.trim();
        let digits = trimmed
            .strip_suffix("GB")
            .or_else(|| trimmed.strip_suffix("gb"))
            .or_else(|| trimmed.strip_suffix("G"))
            .unwrap_or(trimmed);
        digits.trim().parse().ok()
    }
}

impl MigrationStep for RamToObject {
    fn name(&self) -> &'static str {
        "ram-object"
    }

    fn description(&self) -> &'static str {
        "Move a bare ram size into a ram object"
    }

    fn apply(&self, mut tree: Value) -> Result<Value, MigrationError> {
        for record in records_mut(&mut tree)? {
            let Some(key) = find_key(record, "ram") else {
                continue;
            };

            let size = match record.get(&key) {
                Some(Value::Number(size)) => size.as_u64(),
                Some(Value::String(size)) => Self::parse_size(size),
                _ => continue,
            };

            let size = size.ok_or_else(|| MigrationError::StepFailed {
                step: self.name().to_string(),
                reason: format!("cannot read ram size {}", record[&key]),
            })?;
            record.insert(key, json!({ "sizeGb": size }));
        }
        Ok(tree)
    }
}
