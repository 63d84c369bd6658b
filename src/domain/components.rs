// Copyright (c) 2025 - Cowboy AI, Inc.
//! Hardware Component Value Objects
//!
//! Components are owned by the record that lists them. All fields are
//! optional so a partial record can describe only what is known.

use serde::{Deserialize, Serialize};

use super::schema::resource_schema;

/// Processor package
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cpu {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cores: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threads: Option<u32>,
}

resource_schema! {
    Cpu {
        model: Scalar => "model",
        cores: Scalar => "cores",
        threads: Scalar => "threads",
    }
}

/// Installed memory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ram {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_gb: Option<u32>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub ram_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_mhz: Option<u32>,
}

resource_schema! {
    Ram {
        size_gb: Scalar => "sizeGb",
        ram_type: Scalar => "type",
        speed_mhz: Scalar => "speedMhz",
    }
}

/// Storage device; `size` is in GB
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drive {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub drive_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface: Option<String>,
}

impl Drive {
    pub fn new(drive_type: impl Into<String>, size: u64) -> Self {
        Self {
            drive_type: Some(drive_type.into()),
            size: Some(size),
            interface: None,
        }
    }
}

resource_schema! {
    Drive {
        drive_type: Scalar => "type",
        size: Scalar => "size",
        interface: Scalar => "interface",
    }
}

/// Network interface card
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nic {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub nic_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ports: Option<u32>,
}

resource_schema! {
    Nic {
        nic_type: Scalar => "type",
        speed: Scalar => "speed",
        ports: Scalar => "ports",
    }
}

/// Graphics or accelerator card
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gpu {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vram_gb: Option<u32>,
}

resource_schema! {
    Gpu {
        model: Scalar => "model",
        vram_gb: Scalar => "vramGb",
    }
}

/// A run of identical front-panel ports, e.g. 24 × 1G RJ45
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortGroup {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub port_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
}

resource_schema! {
    PortGroup {
        port_type: Scalar => "type",
        speed: Scalar => "speed",
        count: Scalar => "count",
    }
}

/// Power-over-Ethernet capability
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Poe {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ports: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_watts: Option<u32>,
}

resource_schema! {
    Poe {
        ports: Scalar => "ports",
        budget_watts: Scalar => "budgetWatts",
    }
}
