// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource Kind Taxonomy
//!
//! Defines the closed set of resource kinds an inventory document can hold.
//! The kind is the discriminator written first in every record; adding a kind
//! means extending this enum, the [`Resource`](super::Resource) union and the
//! exhaustive matches that hang off both.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::InventoryError;

/// Resource kind discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceKind {
    // Compute
    /// Rack or tower server
    Server,
    /// Desktop workstation
    Desktop,
    /// Laptop
    Laptop,

    // Network
    /// Network switch
    Switch,
    /// Network router
    Router,
    /// Firewall appliance
    Firewall,
    /// Wireless access point
    AccessPoint,

    // Power
    /// Uninterruptible power supply
    Ups,

    // Logical
    /// Operating system instance (bare metal or virtual)
    System,
    /// Application service
    Service,
}

impl ResourceKind {
    /// Every kind, in catalogue order
    pub const ALL: [ResourceKind; 10] = [
        Self::Server,
        Self::Switch,
        Self::Firewall,
        Self::Router,
        Self::Desktop,
        Self::Laptop,
        Self::AccessPoint,
        Self::Ups,
        Self::System,
        Self::Service,
    ];

    /// Canonical discriminator as written to the document
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Server => "Server",
            Self::Desktop => "Desktop",
            Self::Laptop => "Laptop",
            Self::Switch => "Switch",
            Self::Router => "Router",
            Self::Firewall => "Firewall",
            Self::AccessPoint => "AccessPoint",
            Self::Ups => "Ups",
            Self::System => "System",
            Self::Service => "Service",
        }
    }

    /// Parse a discriminator, ignoring case and accepting a few historical aliases
    pub fn parse(s: &str) -> Result<Self, InventoryError> {
        let kind = match s.trim().to_lowercase().as_str() {
            "server" => Self::Server,
            "desktop" => Self::Desktop,
            "laptop" => Self::Laptop,
            "switch" => Self::Switch,
            "router" => Self::Router,
            "firewall" | "fw" => Self::Firewall,
            "accesspoint" | "access_point" | "ap" => Self::AccessPoint,
            "ups" => Self::Ups,
            "system" => Self::System,
            "service" => Self::Service,
            _ => {
                return Err(InventoryError::UnknownKind {
                    kind: s.to_string(),
                })
            }
        };
        Ok(kind)
    }

    /// Human-readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Server => "Server",
            Self::Desktop => "Desktop",
            Self::Laptop => "Laptop",
            Self::Switch => "Switch",
            Self::Router => "Router",
            Self::Firewall => "Firewall",
            Self::AccessPoint => "Access Point",
            Self::Ups => "UPS",
            Self::System => "System",
            Self::Service => "Service",
        }
    }

    /// Primary category for this kind
    pub fn category(&self) -> KindCategory {
        match self {
            Self::Server | Self::Desktop | Self::Laptop => KindCategory::Compute,
            Self::Switch | Self::Router | Self::Firewall | Self::AccessPoint => {
                KindCategory::Network
            }
            Self::Ups => KindCategory::Power,
            Self::System | Self::Service => KindCategory::Logical,
        }
    }

    /// Structural capabilities records of this kind carry
    pub fn capabilities(&self) -> Capabilities {
        match self {
            Self::Server | Self::Desktop | Self::Laptop => Capabilities {
                cpus: true,
                drives: true,
                nics: true,
                gpus: true,
                ports: false,
            },
            Self::Switch | Self::Router | Self::Firewall => Capabilities {
                ports: true,
                ..Capabilities::NONE
            },
            Self::System => Capabilities {
                drives: true,
                ..Capabilities::NONE
            },
            Self::AccessPoint | Self::Ups | Self::Service => Capabilities::NONE,
        }
    }

    /// Whether this kind describes physical hardware
    pub fn is_hardware(&self) -> bool {
        !matches!(self.category(), KindCategory::Logical)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = InventoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// High-level grouping of kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KindCategory {
    /// Servers and workstations
    Compute,
    /// Switching, routing, security and wireless gear
    Network,
    /// Power protection
    Power,
    /// Systems and services running on hardware
    Logical,
}

impl fmt::Display for KindCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compute => write!(f, "Compute"),
            Self::Network => write!(f, "Network"),
            Self::Power => write!(f, "Power"),
            Self::Logical => write!(f, "Logical"),
        }
    }
}

/// Which component collections a kind exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub cpus: bool,
    pub drives: bool,
    pub nics: bool,
    pub gpus: bool,
    pub ports: bool,
}

impl Capabilities {
    /// No component collections
    pub const NONE: Capabilities = Capabilities {
        cpus: false,
        drives: false,
        nics: false,
        gpus: false,
        ports: false,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("Server", ResourceKind::Server ; "canonical")]
    #[test_case("server", ResourceKind::Server ; "lower case")]
    #[test_case("ACCESSPOINT", ResourceKind::AccessPoint ; "upper case")]
    #[test_case("access_point", ResourceKind::AccessPoint ; "snake alias")]
    #[test_case("UPS", ResourceKind::Ups ; "ups acronym")]
    #[test_case("fw", ResourceKind::Firewall ; "firewall alias")]
    fn test_kind_parsing(input: &str, expected: ResourceKind) {
        assert_eq!(ResourceKind::parse(input).unwrap(), expected);
    }

    #[test]
    fn test_unknown_kind() {
        let err = ResourceKind::parse("Toaster").unwrap_err();
        assert!(matches!(err, InventoryError::UnknownKind { kind } if kind == "Toaster"));
    }

    #[test]
    fn test_round_trip_all_kinds() {
        for kind in ResourceKind::ALL {
            assert_eq!(ResourceKind::parse(kind.as_str()).unwrap(), kind);
        }
    }

    #[test]
    fn test_categories() {
        assert_eq!(ResourceKind::Server.category(), KindCategory::Compute);
        assert_eq!(ResourceKind::AccessPoint.category(), KindCategory::Network);
        assert_eq!(ResourceKind::Ups.category(), KindCategory::Power);
        assert_eq!(ResourceKind::Service.category(), KindCategory::Logical);
        assert!(!ResourceKind::System.is_hardware());
        assert!(ResourceKind::Laptop.is_hardware());
    }

    #[test]
    fn test_capabilities() {
        assert!(ResourceKind::Server.capabilities().gpus);
        assert!(ResourceKind::Switch.capabilities().ports);
        assert!(!ResourceKind::Switch.capabilities().cpus);
        assert!(ResourceKind::System.capabilities().drives);
        assert_eq!(ResourceKind::Service.capabilities(), Capabilities::NONE);
    }
}
