//! Screen-scrape parsers for switch CLI output.
//!
//! Every function here is pure and total: malformed or unexpected text is
//! reported as an absent value, never as an error. "Not present" is the
//! normal answer for most devices in a fleet.

use crate::types::{MacAddress, VlanId};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

/// Marker that identifies a trunk port in running configuration.
pub const TRUNK_MARKER: &str = "switchport mode trunk";

/// Short interface-name prefixes recognized in MAC table output.
pub const INTERFACE_PREFIXES: [&str; 6] = ["Eth", "Fa", "Gi", "Te", "Fo", "Hu"];

/// A MAC table row: leading VLAN number, then a short interface name with a
/// slot/port suffix later on the same line.
static MAC_TABLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t*+]*(\d+)[ \t]+[^\n]*?\b((?:Eth|Fa|Gi|Te|Fo|Hu)\d+(?:/\d+)+)\b")
        .expect("Invalid regex pattern")
});

static INTERFACE_MAC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b([0-9a-f]{4}\.[0-9a-f]{4}\.[0-9a-f]{4}|[0-9a-f]{2}(?::[0-9a-f]{2}){5}|[0-9a-f]{2}(?:-[0-9a-f]{2}){5})\b",
    )
    .expect("Invalid regex pattern")
});

static SVI_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bVlan\d+\b").expect("Invalid regex pattern"));

/// What a MAC table response says about the searched address.
///
/// Both fields are absent when the address is not in the table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacTableEntry {
    pub vlan: Option<VlanId>,
    pub interface: Option<String>,
}

impl MacTableEntry {
    /// The "address not present on this device" answer.
    pub fn absent() -> Self {
        Self::default()
    }
}

/// How a switch port is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PortClassification {
    /// Single-VLAN edge port.
    Access,
    /// Multi-VLAN port.
    Trunk,
    /// Configuration could not be read. Never treated as Access.
    Unknown,
}

impl fmt::Display for PortClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Access => write!(f, "access"),
            Self::Trunk => write!(f, "trunk"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Extract the VLAN and interface from `show mac address-table` output.
///
/// Uses the first row that has both a leading VLAN number and a recognized
/// interface token. Rows with a VLAN outside 1-4094 are skipped.
pub fn parse_mac_table_line(text: &str) -> MacTableEntry {
    MAC_TABLE_RE
        .captures_iter(text)
        .find_map(|caps| {
            let vlan = caps
                .get(1)
                .and_then(|m| m.as_str().parse::<u16>().ok())
                .and_then(VlanId::new)?;
            let interface = caps.get(2)?.as_str().to_string();
            Some(MacTableEntry {
                vlan: Some(vlan),
                interface: Some(interface),
            })
        })
        .unwrap_or_default()
}

/// Classify a port from its running configuration block.
///
/// Presence of the trunk marker anywhere means Trunk; everything else is
/// Access, including an empty block.
pub fn classify_port(running_config: &str) -> PortClassification {
    if running_config.contains(TRUNK_MARKER) {
        PortClassification::Trunk
    } else {
        PortClassification::Access
    }
}

/// Find the first MAC address in `show interface` detail output.
pub fn extract_interface_mac(detail: &str) -> Option<MacAddress> {
    INTERFACE_MAC_RE
        .find_iter(detail)
        .find_map(|m| MacAddress::parse(m.as_str()).ok())
}

/// Collect every `Vlan<N>` token from a brief interface table, in order.
pub fn extract_svi_list(brief_table: &str) -> Vec<String> {
    SVI_RE
        .find_iter(brief_table)
        .map(|m| m.as_str().to_string())
        .collect()
}
