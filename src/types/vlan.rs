//! VLAN identifier newtype.
//!
//! `VlanId` is always a usable 802.1Q VLAN number (1-4094).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A validated VLAN id (1-4094).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct VlanId(u16);

impl VlanId {
    /// Lowest usable VLAN id.
    pub const MIN: u16 = 1;
    /// Highest usable VLAN id (4095 is reserved).
    pub const MAX: u16 = 4094;

    /// Create a new VlanId, returning None if out of range.
    #[inline]
    pub const fn new(id: u16) -> Option<Self> {
        if id >= Self::MIN && id <= Self::MAX {
            Some(Self(id))
        } else {
            None
        }
    }

    /// Get the raw VLAN number.
    #[inline]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// Name of the switch virtual interface for this VLAN (`Vlan<N>`).
    pub fn svi_name(self) -> String {
        format!("Vlan{}", self.0)
    }
}

impl fmt::Display for VlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u16> for VlanId {
    type Error = VlanError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(VlanError::OutOfRange(value))
    }
}

impl From<VlanId> for u16 {
    fn from(vlan: VlanId) -> Self {
        vlan.0
    }
}

impl FromStr for VlanId {
    type Err = VlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id: u16 = s
            .trim()
            .parse()
            .map_err(|_| VlanError::InvalidFormat(s.to_string()))?;
        Self::try_from(id)
    }
}

/// Error type for VLAN id parsing and validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VlanError {
    #[error("VLAN {0} is out of valid range (1-4094)")]
    OutOfRange(u16),
    #[error("invalid VLAN id: {0}")]
    InvalidFormat(String),
}
