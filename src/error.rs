//! Error types for macfinder.
//!
//! Uses `thiserror` for ergonomic error definitions.

use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single command on a single device.
///
/// The search treats every variant the same way: that device contributes
/// no observation for the stage.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("device {device} unreachable: {reason}")]
    DeviceUnreachable { device: String, reason: String },

    #[error("command '{command}' failed on {device}: {reason}")]
    CommandError {
        device: String,
        command: String,
        reason: String,
    },

    #[error("command '{command}' timed out on {device}")]
    Timeout { device: String, command: String },
}

impl GatewayError {
    /// Name of the device the failure belongs to.
    pub fn device(&self) -> &str {
        match self {
            Self::DeviceUnreachable { device, .. }
            | Self::CommandError { device, .. }
            | Self::Timeout { device, .. } => device,
        }
    }
}

/// Errors loading the fleet inventory.
#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("failed to read inventory {}: {reason}", .path.display())]
    ReadFailed { path: PathBuf, reason: String },

    #[error("invalid inventory row {line}: {reason}")]
    InvalidRow { line: u64, reason: String },

    #[error("duplicate device name in inventory: {0}")]
    DuplicateDevice(String),
}

/// Errors loading application settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine configuration directory")]
    DirectoryNotFound,

    #[error("failed to read {}: {reason}", .path.display())]
    ReadFailed { path: PathBuf, reason: String },

    #[error("invalid settings format: {0}")]
    InvalidFormat(String),

    #[error("invalid setting: {0}")]
    InvalidValue(String),
}

/// Result type alias for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Result type alias for inventory operations.
pub type InventoryResult<T> = Result<T, InventoryError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
