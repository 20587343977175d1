//! Fleet inventory.
//!
//! The inventory is a read-only list of devices, loaded from a
//! semicolon-delimited CSV file:
//!
//! ```text
//! hostname;ip;tags
//! access-sw1;10.0.0.11;switch,access
//! core-sw1;10.0.0.1;switch,core
//! edge-rtr1;10.0.0.254;router
//! ```
//!
//! Device order in the file is the fleet order the search uses for
//! tie-breaks.

use crate::error::{InventoryError, InventoryResult};
use crate::types::DeviceHandle;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct InventoryRow {
    hostname: String,
    ip: String,
    #[serde(default)]
    tags: String,
}

/// The set of devices known to the tool.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    devices: Vec<DeviceHandle>,
}

impl Inventory {
    /// Build an inventory from handles, rejecting duplicate names.
    pub fn new(devices: Vec<DeviceHandle>) -> InventoryResult<Self> {
        let mut seen = HashSet::new();
        for device in &devices {
            if !seen.insert(device.name.as_str()) {
                return Err(InventoryError::DuplicateDevice(device.name.clone()));
            }
        }
        Ok(Self { devices })
    }

    /// Load an inventory CSV file.
    pub fn from_path(path: &Path) -> InventoryResult<Self> {
        let file = File::open(path).map_err(|e| InventoryError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_reader(file)
    }

    /// Load an inventory from any CSV source.
    pub fn from_reader<R: Read>(reader: R) -> InventoryResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .trim(csv::Trim::All)
            .comment(Some(b'#'))
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| InventoryError::InvalidRow {
                line: 1,
                reason: e.to_string(),
            })?
            .clone();

        let mut devices = Vec::new();
        for record in csv_reader.records() {
            let record = record.map_err(|e| InventoryError::InvalidRow {
                line: e.position().map(|p| p.line()).unwrap_or(0),
                reason: e.to_string(),
            })?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            let row: InventoryRow = record
                .deserialize(Some(&headers))
                .map_err(|e| InventoryError::InvalidRow {
                    line,
                    reason: e.to_string(),
                })?;

            if row.hostname.is_empty() || row.ip.is_empty() {
                return Err(InventoryError::InvalidRow {
                    line,
                    reason: "hostname and ip are required".to_string(),
                });
            }

            let device = row
                .tags
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .fold(DeviceHandle::new(row.hostname, row.ip), |d, tag| {
                    d.with_tag(tag)
                });
            devices.push(device);
        }

        Self::new(devices)
    }

    /// Devices carrying `tag`, or every device when no filter is given.
    pub fn list_devices(&self, tag_filter: Option<&str>) -> Vec<DeviceHandle> {
        self.devices
            .iter()
            .filter(|d| tag_filter.map_or(true, |tag| d.has_tag(tag)))
            .cloned()
            .collect()
    }

    /// Number of devices.
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Check if the inventory is empty.
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}
