// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Module
//!
//! proptest suites for the merge engine, upsert classification and schema
//! migration.

mod merge_properties;
