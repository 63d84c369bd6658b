// Copyright (c) 2025 - Cowboy AI, Inc.
//! Inventory Domain Model
//!
//! Core record types for the inventory document:
//!
//! - [`ResourceKind`] - closed kind taxonomy (the record discriminator)
//! - [`Resource`] - tagged union of kind payloads
//! - [`ResourceMeta`] - tags, labels, notes and `runsOn` shared by every kind
//! - [`NameKey`] - case-insensitive name identity
//! - [`Schema`] / [`StrategicMerge`] - compile-time field tables driving
//!   generic merge and key normalization
//!
//! # Capability Traits
//!
//! Payloads implement [`HasCpus`], [`HasDrives`], [`HasNics`], [`HasGpus`]
//! and [`HasPorts`] as their shape allows; [`Resource`] hands them out as
//! trait objects so callers never match on kinds to reach components.

pub mod components;
pub mod kind;
pub mod name;
pub mod resource;
pub mod schema;

pub use components::{Cpu, Drive, Gpu, Nic, Poe, PortGroup, Ram};
pub use kind::{Capabilities, KindCategory, ResourceKind};
pub use name::{validate_name, NameError, NameKey};
pub use resource::{
    peek_kind, AccessPoint, HasCpus, HasDrives, HasGpus, HasNics, HasPorts, NetworkDevice,
    Resource, ResourceMeta, Server, Service, System, Ups, Workstation,
};
pub use schema::{FieldShape, FieldSpec, Schema, StrategicMerge};
