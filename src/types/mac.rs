//! Hardware (MAC) address type.
//!
//! Switches print MAC addresses in several groupings. `MacAddress` accepts
//! the common ones and stores the raw 48 bits, so two spellings of the same
//! address always compare equal.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A 48-bit hardware address.
///
/// Accepted input forms (case-insensitive):
/// - `aa:bb:cc:dd:ee:ff`
/// - `aa-bb-cc-dd-ee-ff`
/// - `aabb.ccdd.eeff`
///
/// `Display` renders the lowercase dotted form used by the switch CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    /// Create a MAC address from raw octets.
    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    /// Get the raw octets.
    pub const fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// Parse a MAC address in any accepted grouping.
    pub fn parse(s: &str) -> Result<Self, MacError> {
        let s = s.trim();
        let groups: Vec<&str> = match s.len() {
            14 => s.split('.').collect(),
            17 if s.contains(':') => s.split(':').collect(),
            17 => s.split('-').collect(),
            _ => return Err(MacError::InvalidFormat(s.to_string())),
        };

        let expected_width = if groups.len() == 3 { 4 } else { 2 };
        if !(groups.len() == 3 || groups.len() == 6)
            || groups.iter().any(|g| g.len() != expected_width)
        {
            return Err(MacError::InvalidFormat(s.to_string()));
        }

        let hex: String = groups.concat();
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(MacError::InvalidHex(s.to_string()));
        }

        let mut octets = [0u8; 6];
        for (i, octet) in octets.iter_mut().enumerate() {
            *octet = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
                .map_err(|_| MacError::InvalidHex(s.to_string()))?;
        }
        Ok(Self(octets))
    }

    /// Render in lowercase colon-separated form.
    pub fn to_colon_string(&self) -> String {
        self.0
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect::<Vec<_>>()
            .join(":")
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let o = &self.0;
        write!(
            f,
            "{:02x}{:02x}.{:02x}{:02x}.{:02x}{:02x}",
            o[0], o[1], o[2], o[3], o[4], o[5]
        )
    }
}

impl FromStr for MacAddress {
    type Err = MacError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MacAddress {
    type Error = MacError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MacAddress> for String {
    fn from(mac: MacAddress) -> Self {
        mac.to_string()
    }
}

/// Error type for MAC address parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MacError {
    #[error("invalid MAC address format: '{0}' (expected aa:bb:cc:dd:ee:ff or aabb.ccdd.eeff)")]
    InvalidFormat(String),
    #[error("MAC address contains non-hex characters: '{0}'")]
    InvalidHex(String),
}
