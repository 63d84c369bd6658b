// Copyright (c) 2025 - Cowboy AI, Inc.
//! Versioned Inventory Document
//!
//! The persisted root is a single YAML file:
//!
//! ```yaml
//! version: 3
//! resources:
//!   - kind: Server
//!     name: srv-01
//!     ipmi: true
//!   - kind: System
//!     name: vm-01
//!     runsOn: [srv-01]
//! ```
//!
//! # Decode Path
//!
//! ```text
//! text → YAML → untyped tree → migrate → per record:
//!                                         peek kind → fold keys → typed Resource
//! ```
//!
//! Keys are matched case-insensitively against the record's schema table and
//! rewritten to their canonical camelCase spelling before the typed decode,
//! recursively into components.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::debug;

use crate::domain::{peek_kind, validate_name, FieldShape, FieldSpec, NameKey, Resource};
use crate::errors::{InventoryError, InventoryResult};
use crate::migration::{find_key, MigrationPipeline, CURRENT_SCHEMA_VERSION, RESOURCES_KEY};

pub mod store;

pub use store::{backup_path, DocumentStore, FileDocumentStore, MemoryDocumentStore};

/// The persisted root: schema version plus the flat record list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionedDocument {
    pub version: u32,
    pub resources: Vec<Resource>,
}

impl VersionedDocument {
    /// Empty document at the current schema version
    pub fn empty() -> Self {
        Self {
            version: CURRENT_SCHEMA_VERSION,
            resources: Vec::new(),
        }
    }

    /// Document at the current schema version holding `resources`
    pub fn with_resources(resources: Vec<Resource>) -> Self {
        Self {
            version: CURRENT_SCHEMA_VERSION,
            resources,
        }
    }

    /// Look a record up by name, ignoring case
    pub fn find(&self, name: &str) -> Option<&Resource> {
        let key = NameKey::new(name);
        self.resources.iter().find(|resource| resource.key() == key)
    }

    /// Position of a record by name, ignoring case
    pub fn position(&self, name: &str) -> Option<usize> {
        let key = NameKey::new(name);
        self.resources.iter().position(|resource| resource.key() == key)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Check names are valid and unique across the whole document
    pub fn validate(&self) -> InventoryResult<()> {
        ensure_unique_names(&self.resources)
    }
}

impl Default for VersionedDocument {
    fn default() -> Self {
        Self::empty()
    }
}

/// A document as read from storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedDocument {
    pub document: VersionedDocument,
    /// Version found in storage
    pub stored_version: u32,
}

impl LoadedDocument {
    /// Whether the stored text was older than the current schema
    pub fn was_migrated(&self) -> bool {
        self.stored_version != self.document.version
    }
}

/// Parse YAML (or JSON) text into an untyped tree; blank text is `Null`
pub fn parse_tree(text: &str) -> Result<Value, serde_yaml::Error> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_yaml::from_str(text)
}

/// Parse, migrate and decode stored text
pub fn load_text(text: &str, pipeline: &MigrationPipeline) -> InventoryResult<LoadedDocument> {
    let tree = parse_tree(text).map_err(|e| InventoryError::InvalidDocument(e.to_string()))?;
    let outcome = pipeline.migrate(tree)?;
    let resources = decode_resources(&outcome.tree).map_err(into_document_error)?;
    ensure_unique_names(&resources).map_err(into_document_error)?;

    Ok(LoadedDocument {
        document: VersionedDocument {
            version: outcome.to_version,
            resources,
        },
        stored_version: outcome.from_version,
    })
}

/// Decode the `resources` list of a migrated tree
pub fn decode_resources(tree: &Value) -> InventoryResult<Vec<Resource>> {
    let found = tree
        .as_object()
        .and_then(|root| find_key(root, RESOURCES_KEY).and_then(|key| root.get(&key)));
    let records = match found {
        Some(Value::Array(records)) => records,
        Some(Value::Null) | None => {
            return Err(InventoryError::InvalidInput(format!(
                "Document has no '{}' list",
                RESOURCES_KEY
            )))
        }
        Some(_) => {
            return Err(InventoryError::InvalidInput(format!(
                "'{}' must be a list",
                RESOURCES_KEY
            )))
        }
    };

    records.iter().cloned().map(decode_record).collect()
}

/// Decode one untyped record into a [`Resource`]
///
/// Unknown kinds are always an error; a record is never dropped.
pub fn decode_record(record: Value) -> InventoryResult<Resource> {
    let kind = peek_kind(&record)?;
    let Value::Object(fields) = record else {
        return Err(InventoryError::InvalidInput(
            "Resource record is not a mapping".to_string(),
        ));
    };

    let mut folded = fold_keys(fields, Resource::field_specs_for(kind));
    folded.insert("kind".to_string(), Value::String(kind.as_str().to_string()));

    let resource: Resource = serde_json::from_value(Value::Object(folded)).map_err(|e| {
        InventoryError::InvalidInput(format!("Cannot decode {} record: {}", kind, e))
    })?;
    validate_name(resource.name())?;
    Ok(resource)
}

/// Rewrite keys to their canonical spelling, recursing through composite fields
fn fold_keys(fields: Map<String, Value>, schema: &'static [FieldSpec]) -> Map<String, Value> {
    let mut folded = Map::with_capacity(fields.len());
    for (key, value) in fields {
        if key.eq_ignore_ascii_case("kind") || key.eq_ignore_ascii_case("name") {
            folded.insert(key.to_lowercase(), value);
            continue;
        }

        match FieldSpec::find(schema, &key) {
            // A null collection carries no information; decode it as empty
            Some(spec) if value.is_null() && matches!(spec.shape, FieldShape::List | FieldShape::Map) => {
                debug!("Treating null '{}' as empty", spec.name);
            }
            Some(spec) => {
                let value = fold_value(value, spec);
                folded.insert(spec.name.to_string(), value);
            }
            None => {
                debug!("Ignoring unknown field '{}'", key);
                folded.insert(key, value);
            }
        }
    }
    folded
}

fn fold_value(value: Value, spec: &FieldSpec) -> Value {
    if spec.children.is_empty() {
        return value;
    }
    match (spec.shape, value) {
        (FieldShape::Nested, Value::Object(fields)) => Value::Object(fold_keys(fields, spec.children)),
        (FieldShape::List, Value::Array(items)) => Value::Array(
            items
                .into_iter()
                .map(|item| match item {
                    Value::Object(fields) => Value::Object(fold_keys(fields, spec.children)),
                    other => other,
                })
                .collect(),
        ),
        (_, other) => other,
    }
}

/// Names must be valid and unique (case-insensitively) within a record set
pub fn ensure_unique_names(resources: &[Resource]) -> InventoryResult<()> {
    let mut seen = HashSet::with_capacity(resources.len());
    for resource in resources {
        validate_name(resource.name())?;
        if !seen.insert(resource.key()) {
            return Err(InventoryError::InvalidInput(format!(
                "Duplicate resource name: {}",
                resource.name()
            )));
        }
    }
    Ok(())
}

/// Serialize the whole document
pub fn encode(document: &VersionedDocument) -> InventoryResult<String> {
    Ok(serde_yaml::to_string(document)?)
}

/// Canonical text of one record, used for change detection
pub fn snapshot(resource: &Resource) -> InventoryResult<String> {
    Ok(serde_yaml::to_string(resource)?)
}

fn into_document_error(err: InventoryError) -> InventoryError {
    match err {
        InventoryError::InvalidInput(message) => InventoryError::InvalidDocument(message),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Drive, ResourceKind};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_decode_folds_key_case() {
        let resource = decode_record(json!({
            "KIND": "server",
            "Name": "srv",
            "IPMI": true,
            "Drives": [{"Type": "ssd", "SIZE": 1024}],
            "RunsOn": ["rack"]
        }))
        .unwrap();

        assert_eq!(resource.kind(), ResourceKind::Server);
        assert_eq!(resource.name(), "srv");
        assert_eq!(
            resource.as_has_drives().unwrap().drives(),
            &[Drive::new("ssd", 1024)]
        );
        assert_eq!(resource.runs_on(), &["rack".to_string()]);
    }

    #[test]
    fn test_decode_null_collections_as_empty() {
        let resource = decode_record(json!({
            "kind": "Switch",
            "name": "sw",
            "Ports": null,
            "tags": null,
            "labels": null,
            "runsOn": null,
            "poe": null
        }))
        .unwrap();

        assert_eq!(resource, Resource::new(ResourceKind::Switch, "sw"));
    }

    #[test]
    fn test_decode_unknown_kind() {
        let err = decode_record(json!({"kind": "Toaster", "name": "t"})).unwrap_err();
        assert!(matches!(err, InventoryError::UnknownKind { .. }));
    }

    #[test]
    fn test_decode_blank_name() {
        let err = decode_record(json!({"kind": "Server", "name": "  "})).unwrap_err();
        assert!(matches!(err, InventoryError::InvalidInput(_)));
    }

    #[test]
    fn test_decode_wrong_field_type() {
        let err = decode_record(json!({"kind": "Server", "name": "s", "drives": 3})).unwrap_err();
        assert!(matches!(err, InventoryError::InvalidInput(_)));
    }

    #[test]
    fn test_load_text_migrates_legacy_document() {
        let text = "version: 1\nresources:\n  - kind: System\n    name: vm\n    runsOn: host-a\n    ram: 8\n";
        let loaded = load_text(text, &MigrationPipeline::default()).unwrap();

        assert!(loaded.was_migrated());
        assert_eq!(loaded.stored_version, 1);
        assert_eq!(loaded.document.version, CURRENT_SCHEMA_VERSION);
        let vm = loaded.document.find("VM").unwrap();
        assert_eq!(vm.runs_on(), &["host-a".to_string()]);
    }

    #[test]
    fn test_load_text_rejects_duplicates() {
        let text = "version: 3\nresources:\n  - {kind: Server, name: a}\n  - {kind: Switch, name: A}\n";
        let err = load_text(text, &MigrationPipeline::default()).unwrap_err();
        assert!(matches!(err, InventoryError::InvalidDocument(_)));
    }

    #[test]
    fn test_load_text_rejects_newer_schema() {
        let err = load_text("version: 99\nresources: []\n", &MigrationPipeline::default())
            .unwrap_err();
        assert!(matches!(err, InventoryError::SchemaTooNew { found: 99, .. }));
    }

    #[test]
    fn test_load_text_unknown_kind_is_fatal() {
        let text = "version: 3\nresources:\n  - {kind: Toaster, name: t}\n";
        let err = load_text(text, &MigrationPipeline::default()).unwrap_err();
        assert!(matches!(err, InventoryError::UnknownKind { .. }));
    }

    #[test]
    fn test_encode_layout() {
        let document = VersionedDocument::with_resources(vec![Resource::new(
            ResourceKind::Server,
            "example-server",
        )]);
        let text = encode(&document).unwrap();
        assert_eq!(
            text,
            "version: 3\nresources:\n- kind: Server\n  name: example-server\n"
        );
    }

    #[test]
    fn test_encode_then_load_is_stable() {
        let mut server = Resource::new(ResourceKind::Server, "srv");
        server.meta_mut().runs_on.push("rack".to_string());
        let document = VersionedDocument::with_resources(vec![server]);

        let text = encode(&document).unwrap();
        let loaded = load_text(&text, &MigrationPipeline::default()).unwrap();
        assert!(!loaded.was_migrated());
        assert_eq!(loaded.document, document);
    }
}
