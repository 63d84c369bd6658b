// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Strategic Merge and Upsert
//!
//! Record sets are drawn from a small name pool in mixed case so that
//! collisions between existing and incoming records are common.

use cim_inventory::document::{encode, load_text};
use cim_inventory::domain::{Drive, NameKey};
use cim_inventory::inventory::plan_upsert;
use crate::fixtures::RecordingStore;
use cim_inventory::{
    merge_resources, Inventory, MergeMode, MigrationPipeline, Resource, ResourceKind,
    UpsertRequest, VersionedDocument,
};
use proptest::prelude::*;
use std::collections::HashSet;

// ============================================================================
// Property Test Strategies
// ============================================================================

/// Names from a small pool, randomly upper-cased
fn name() -> impl Strategy<Value = String> {
    ("[a-d]{1,2}", any::<bool>()).prop_map(|(name, upper)| {
        if upper {
            name.to_uppercase()
        } else {
            name
        }
    })
}

fn drive() -> impl Strategy<Value = Drive> {
    (prop::sample::select(vec!["ssd", "hdd", "nvme"]), 1u64..4096)
        .prop_map(|(drive_type, size)| Drive::new(drive_type, size))
}

fn resource() -> impl Strategy<Value = Resource> {
    (
        name(),
        prop::sample::select(ResourceKind::ALL.to_vec()),
        proptest::option::of(any::<bool>()),
        prop::collection::vec(drive(), 0..3),
        prop::collection::btree_set("[a-z]{1,4}", 0..3),
        prop::collection::vec(name(), 0..2),
    )
        .prop_map(|(name, kind, ipmi, drives, tags, parents)| {
            let mut resource = Resource::new(kind, name);
            if let Resource::Server(server) = &mut resource {
                server.ipmi = ipmi;
                server.drives = drives;
            }
            resource.meta_mut().tags = tags;
            resource.meta_mut().runs_on = parents;
            resource
        })
}

/// Record set with case-insensitively unique names
fn resource_set() -> impl Strategy<Value = Vec<Resource>> {
    prop::collection::vec(resource(), 0..8).prop_map(|resources| {
        let mut seen = HashSet::new();
        resources
            .into_iter()
            .filter(|resource| seen.insert(resource.key()))
            .collect()
    })
}

fn merge_mode() -> impl Strategy<Value = MergeMode> {
    prop_oneof![Just(MergeMode::Merge), Just(MergeMode::Replace)]
}

fn import_request(incoming: &[Resource], mode: MergeMode, dry_run: bool) -> UpsertRequest {
    let text = encode(&VersionedDocument::with_resources(incoming.to_vec()))
        .expect("generated records encode");
    UpsertRequest::from_text(text)
        .with_mode(mode)
        .with_dry_run(dry_run)
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: Merging the same batch twice changes nothing the second time
    #[test]
    fn prop_merge_is_idempotent(
        existing in resource_set(),
        incoming in resource_set(),
        mode in merge_mode(),
    ) {
        let once = merge_resources(&existing, &incoming, mode);
        let twice = merge_resources(&once, &incoming, mode);
        prop_assert_eq!(once, twice);
    }

    /// Property: Names stay unique and every name from both sides survives
    #[test]
    fn prop_merge_keeps_names_unique(
        existing in resource_set(),
        incoming in resource_set(),
        mode in merge_mode(),
    ) {
        let merged = merge_resources(&existing, &incoming, mode);
        let merged_keys: HashSet<NameKey> = merged.iter().map(Resource::key).collect();
        let expected: HashSet<NameKey> = existing
            .iter()
            .chain(incoming.iter())
            .map(Resource::key)
            .collect();

        prop_assert_eq!(merged.len(), merged_keys.len());
        prop_assert_eq!(merged_keys, expected);
    }

    /// Property: A second Merge import of the same batch classifies nothing
    #[test]
    fn prop_repeated_import_classifies_nothing(
        existing in resource_set(),
        incoming in resource_set(),
    ) {
        let first = plan_upsert(&existing, &incoming, MergeMode::Merge).unwrap();
        let second = plan_upsert(&first.merged, &incoming, MergeMode::Merge).unwrap();

        prop_assert!(second.response.added.is_empty());
        prop_assert!(second.response.updated.is_empty());
        prop_assert!(second.response.replaced.is_empty());
    }

    /// Property: Every incoming record lands in exactly one bucket unless unchanged
    #[test]
    fn prop_classification_is_a_partition(
        existing in resource_set(),
        incoming in resource_set(),
        mode in merge_mode(),
    ) {
        let plan = plan_upsert(&existing, &incoming, mode).unwrap();
        let response = plan.response;
        let classified = response.added.len() + response.updated.len() + response.replaced.len();

        prop_assert!(classified <= incoming.len());
        prop_assert_eq!(response.new_snapshots.len(), incoming.len());

        for record in &incoming {
            let found = existing
                .iter()
                .find(|candidate| candidate.key() == record.key());
            match found {
                None => prop_assert!(response.added.iter().any(|name| NameKey::new(name) == record.key())),
                Some(previous) if previous.kind() != record.kind() || mode == MergeMode::Replace => {
                    prop_assert!(response.replaced.iter().any(|name| NameKey::new(name) == record.key()))
                }
                Some(_) => {
                    prop_assert!(!response.added.iter().any(|name| NameKey::new(name) == record.key()));
                    prop_assert!(!response.replaced.iter().any(|name| NameKey::new(name) == record.key()));
                }
            }
        }
    }

    /// Property: Replace mode stores the incoming record under the incoming spelling
    #[test]
    fn prop_replace_takes_incoming_whole(
        existing in resource_set(),
        incoming in resource_set(),
    ) {
        let merged = merge_resources(&existing, &incoming, MergeMode::Replace);
        for record in &incoming {
            let stored = merged.iter().find(|candidate| candidate.key() == record.key());
            prop_assert_eq!(stored, Some(record));
        }
    }

    /// Property: Dry runs never touch the store or the published document
    #[test]
    fn prop_dry_run_is_isolated(
        existing in resource_set(),
        incoming in resource_set(),
        mode in merge_mode(),
    ) {
        tokio_test::block_on(async {
            let inventory = Inventory::open(RecordingStore::new()).await.unwrap();
            for resource in existing.clone() {
                inventory.add(resource).await.unwrap();
            }
            let saves = inventory.store().save_count();
            let text = inventory.store().text().await;

            let dry = inventory.upsert(import_request(&incoming, mode, true)).await.unwrap();
            assert_eq!(inventory.store().save_count(), saves);
            assert_eq!(inventory.store().text().await, text);
            assert_eq!(inventory.resources().await, existing);

            let real = inventory.upsert(import_request(&incoming, mode, false)).await.unwrap();
            assert_eq!(dry, real);
        });
    }

    /// Property: An unversioned copy of a document migrates back to the same records
    #[test]
    fn prop_version_zero_migrates_to_current(resources in resource_set()) {
        let text = encode(&VersionedDocument::with_resources(resources.clone())).unwrap();
        let unversioned = text.replacen("version: 3\n", "", 1);

        let loaded = load_text(&unversioned, &MigrationPipeline::default()).unwrap();
        prop_assert!(loaded.was_migrated());
        prop_assert_eq!(loaded.stored_version, 0);
        prop_assert_eq!(loaded.document.resources, resources);
    }
}
