// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource Records
//!
//! A [`Resource`] is one inventory record: a closed tagged union whose `kind`
//! discriminator selects the payload struct. Several kinds share a payload
//! shape (Switch/Router/Firewall are all [`NetworkDevice`]s) but stay
//! distinct variants, so a kind change is always visible to the merge engine.
//!
//! # Serialized Layout
//!
//! ```yaml
//! kind: Server
//! name: srv-01
//! model: R730
//! drives:
//!   - type: ssd
//!     size: 1024
//! tags: [prod]
//! runsOn: [rack-a]
//! ```
//!
//! `kind` comes first, then `name`, then kind fields, then the shared
//! metadata. Absent scalars and empty collections are omitted.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

use super::components::{Cpu, Drive, Gpu, Nic, Poe, PortGroup, Ram};
use super::kind::ResourceKind;
use super::name::NameKey;
use super::schema::{resource_schema, FieldSpec, Schema, StrategicMerge};
use crate::errors::{InventoryError, InventoryResult};

/// Metadata every record carries regardless of kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMeta {
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Names of the resources this one runs on (weak references)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub runs_on: Vec<String>,
}

resource_schema! {
    ResourceMeta {
        tags: List => "tags",
        labels: Map => "labels",
        notes: Scalar => "notes",
        runs_on: List => "runsOn",
    }
}

/// Rack or tower server
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Server {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cpus: Vec<Cpu>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ram: Option<Ram>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub drives: Vec<Drive>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nics: Vec<Nic>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gpus: Vec<Gpu>,
    /// Out-of-band management present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipmi: Option<bool>,
    #[serde(flatten)]
    pub meta: ResourceMeta,
}

resource_schema! {
    Server {
        model: Scalar => "model",
        cpus: List<Cpu> => "cpus",
        ram: Nested<Ram> => "ram",
        drives: List<Drive> => "drives",
        nics: List<Nic> => "nics",
        gpus: List<Gpu> => "gpus",
        ipmi: Scalar => "ipmi",
        meta: Flatten<ResourceMeta> => "",
    }
}

/// Desktop or laptop
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workstation {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cpus: Vec<Cpu>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ram: Option<Ram>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub drives: Vec<Drive>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nics: Vec<Nic>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gpus: Vec<Gpu>,
    #[serde(flatten)]
    pub meta: ResourceMeta,
}

resource_schema! {
    Workstation {
        model: Scalar => "model",
        cpus: List<Cpu> => "cpus",
        ram: Nested<Ram> => "ram",
        drives: List<Drive> => "drives",
        nics: List<Nic> => "nics",
        gpus: List<Gpu> => "gpus",
        meta: Flatten<ResourceMeta> => "",
    }
}

/// Switch, router or firewall
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDevice {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub managed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poe: Option<Poe>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<PortGroup>,
    #[serde(flatten)]
    pub meta: ResourceMeta,
}

resource_schema! {
    NetworkDevice {
        model: Scalar => "model",
        managed: Scalar => "managed",
        poe: Nested<Poe> => "poe",
        ports: List<PortGroup> => "ports",
        meta: Flatten<ResourceMeta> => "",
    }
}

/// Wireless access point
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessPoint {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Radio standard, e.g. `wifi6`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technology: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<String>,
    #[serde(flatten)]
    pub meta: ResourceMeta,
}

resource_schema! {
    AccessPoint {
        model: Scalar => "model",
        technology: Scalar => "technology",
        speed: Scalar => "speed",
        meta: Flatten<ResourceMeta> => "",
    }
}

/// Uninterruptible power supply
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ups {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity_va: Option<u32>,
    /// e.g. `line-interactive`, `online`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topology: Option<String>,
    #[serde(flatten)]
    pub meta: ResourceMeta,
}

resource_schema! {
    Ups {
        model: Scalar => "model",
        capacity_va: Scalar => "capacityVa",
        topology: Scalar => "topology",
        meta: Flatten<ResourceMeta> => "",
    }
}

/// Operating system instance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct System {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cores: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ram: Option<Ram>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub drives: Vec<Drive>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(flatten)]
    pub meta: ResourceMeta,
}

resource_schema! {
    System {
        os: Scalar => "os",
        cores: Scalar => "cores",
        ram: Nested<Ram> => "ram",
        drives: List<Drive> => "drives",
        ip: Scalar => "ip",
        meta: Flatten<ResourceMeta> => "",
    }
}

/// Application service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<u16>,
    #[serde(flatten)]
    pub meta: ResourceMeta,
}

resource_schema! {
    Service {
        ip: Scalar => "ip",
        url: Scalar => "url",
        ports: List => "ports",
        meta: Flatten<ResourceMeta> => "",
    }
}

/// Records carrying processors
pub trait HasCpus {
    fn cpus(&self) -> &[Cpu];
}

/// Records carrying storage
pub trait HasDrives {
    fn drives(&self) -> &[Drive];
}

/// Records carrying network interfaces
pub trait HasNics {
    fn nics(&self) -> &[Nic];
}

/// Records carrying graphics cards
pub trait HasGpus {
    fn gpus(&self) -> &[Gpu];
}

/// Records carrying front-panel ports
pub trait HasPorts {
    fn ports(&self) -> &[PortGroup];

    /// Total number of ports across all groups
    fn port_count(&self) -> u32 {
        self.ports().iter().filter_map(|group| group.count).sum()
    }
}

macro_rules! impl_capability {
    ($trait:ident :: $method:ident -> $item:ident for $($ty:ident),+) => {
        $(
            impl $trait for $ty {
                fn $method(&self) -> &[$item] {
                    &self.$method
                }
            }
        )+
    };
}

impl_capability!(HasCpus::cpus -> Cpu for Server, Workstation);
impl_capability!(HasDrives::drives -> Drive for Server, Workstation, System);
impl_capability!(HasNics::nics -> Nic for Server, Workstation);
impl_capability!(HasGpus::gpus -> Gpu for Server, Workstation);
impl_capability!(HasPorts::ports -> PortGroup for NetworkDevice);

/// One inventory record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Resource {
    Server(Server),
    Switch(NetworkDevice),
    Firewall(NetworkDevice),
    Router(NetworkDevice),
    Desktop(Workstation),
    Laptop(Workstation),
    AccessPoint(AccessPoint),
    Ups(Ups),
    System(System),
    Service(Service),
}

/// Dispatch an expression over the payload of every variant
macro_rules! with_payload {
    ($resource:expr, $payload:ident => $body:expr) => {
        match $resource {
            Resource::Server($payload) => $body,
            Resource::Switch($payload)
            | Resource::Firewall($payload)
            | Resource::Router($payload) => $body,
            Resource::Desktop($payload) | Resource::Laptop($payload) => $body,
            Resource::AccessPoint($payload) => $body,
            Resource::Ups($payload) => $body,
            Resource::System($payload) => $body,
            Resource::Service($payload) => $body,
        }
    };
}

impl Resource {
    /// Empty record of the given kind
    pub fn new(kind: ResourceKind, name: impl Into<String>) -> Self {
        let name = name.into();
        match kind {
            ResourceKind::Server => Self::Server(Server {
                name,
                ..Server::default()
            }),
            ResourceKind::Switch => Self::Switch(NetworkDevice {
                name,
                ..NetworkDevice::default()
            }),
            ResourceKind::Firewall => Self::Firewall(NetworkDevice {
                name,
                ..NetworkDevice::default()
            }),
            ResourceKind::Router => Self::Router(NetworkDevice {
                name,
                ..NetworkDevice::default()
            }),
            ResourceKind::Desktop => Self::Desktop(Workstation {
                name,
                ..Workstation::default()
            }),
            ResourceKind::Laptop => Self::Laptop(Workstation {
                name,
                ..Workstation::default()
            }),
            ResourceKind::AccessPoint => Self::AccessPoint(AccessPoint {
                name,
                ..AccessPoint::default()
            }),
            ResourceKind::Ups => Self::Ups(Ups {
                name,
                ..Ups::default()
            }),
            ResourceKind::System => Self::System(System {
                name,
                ..System::default()
            }),
            ResourceKind::Service => Self::Service(Service {
                name,
                ..Service::default()
            }),
        }
    }

    /// Kind discriminator
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Server(_) => ResourceKind::Server,
            Self::Switch(_) => ResourceKind::Switch,
            Self::Firewall(_) => ResourceKind::Firewall,
            Self::Router(_) => ResourceKind::Router,
            Self::Desktop(_) => ResourceKind::Desktop,
            Self::Laptop(_) => ResourceKind::Laptop,
            Self::AccessPoint(_) => ResourceKind::AccessPoint,
            Self::Ups(_) => ResourceKind::Ups,
            Self::System(_) => ResourceKind::System,
            Self::Service(_) => ResourceKind::Service,
        }
    }

    pub fn name(&self) -> &str {
        with_payload!(self, p => p.name.as_str())
    }

    /// Case-insensitive identity
    pub fn key(&self) -> NameKey {
        NameKey::new(self.name())
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        with_payload!(self, p => p.name = name)
    }

    pub fn meta(&self) -> &ResourceMeta {
        with_payload!(self, p => &p.meta)
    }

    pub fn meta_mut(&mut self) -> &mut ResourceMeta {
        with_payload!(self, p => &mut p.meta)
    }

    pub fn runs_on(&self) -> &[String] {
        &self.meta().runs_on
    }

    /// Independent deep copy under a new name
    pub fn clone_named(&self, name: impl Into<String>) -> Self {
        let mut copy = self.clone();
        copy.set_name(name);
        copy
    }

    /// Schema table of this record's payload (without `kind` and `name`)
    pub fn field_specs(&self) -> &'static [FieldSpec] {
        Self::field_specs_for(self.kind())
    }

    /// Schema table for a kind
    pub fn field_specs_for(kind: ResourceKind) -> &'static [FieldSpec] {
        match kind {
            ResourceKind::Server => Server::FIELDS,
            ResourceKind::Switch | ResourceKind::Firewall | ResourceKind::Router => {
                NetworkDevice::FIELDS
            }
            ResourceKind::Desktop | ResourceKind::Laptop => Workstation::FIELDS,
            ResourceKind::AccessPoint => AccessPoint::FIELDS,
            ResourceKind::Ups => Ups::FIELDS,
            ResourceKind::System => System::FIELDS,
            ResourceKind::Service => Service::FIELDS,
        }
    }

    /// Field-level merge of a same-kind record into this one
    ///
    /// Returns the incoming record unchanged when the kinds differ, since a
    /// kind change can only ever be a wholesale replacement.
    pub fn merge_same_kind(&mut self, incoming: Resource) -> Result<(), Resource> {
        match (self, incoming) {
            (Self::Server(a), Self::Server(b)) => a.merge_from(b),
            (Self::Switch(a), Self::Switch(b))
            | (Self::Firewall(a), Self::Firewall(b))
            | (Self::Router(a), Self::Router(b)) => a.merge_from(b),
            (Self::Desktop(a), Self::Desktop(b)) | (Self::Laptop(a), Self::Laptop(b)) => {
                a.merge_from(b)
            }
            (Self::AccessPoint(a), Self::AccessPoint(b)) => a.merge_from(b),
            (Self::Ups(a), Self::Ups(b)) => a.merge_from(b),
            (Self::System(a), Self::System(b)) => a.merge_from(b),
            (Self::Service(a), Self::Service(b)) => a.merge_from(b),
            (_, incoming) => return Err(incoming),
        }
        Ok(())
    }

    pub fn as_has_cpus(&self) -> Option<&dyn HasCpus> {
        match self {
            Self::Server(p) => Some(p),
            Self::Desktop(p) | Self::Laptop(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_has_drives(&self) -> Option<&dyn HasDrives> {
        match self {
            Self::Server(p) => Some(p),
            Self::Desktop(p) | Self::Laptop(p) => Some(p),
            Self::System(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_has_nics(&self) -> Option<&dyn HasNics> {
        match self {
            Self::Server(p) => Some(p),
            Self::Desktop(p) | Self::Laptop(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_has_gpus(&self) -> Option<&dyn HasGpus> {
        match self {
            Self::Server(p) => Some(p),
            Self::Desktop(p) | Self::Laptop(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_has_ports(&self) -> Option<&dyn HasPorts> {
        match self {
            Self::Switch(p) | Self::Firewall(p) | Self::Router(p) => Some(p),
            _ => None,
        }
    }
}

/// Read the kind discriminator of an untyped record without decoding it
///
/// The `kind` key is matched case-insensitively, as is its value.
pub fn peek_kind(record: &Value) -> InventoryResult<ResourceKind> {
    let object = record
        .as_object()
        .ok_or_else(|| InventoryError::InvalidInput("Resource record is not a mapping".to_string()))?;

    let raw = object
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case("kind"))
        .map(|(_, value)| value)
        .ok_or_else(|| {
            InventoryError::InvalidInput("Resource record has no kind".to_string())
        })?;

    match raw {
        Value::String(kind) => ResourceKind::parse(kind),
        other => Err(InventoryError::UnknownKind {
            kind: other.to_string(),
        }),
    }
}
