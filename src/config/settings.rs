//! Application settings and paths.
//!
//! Settings live in an XDG-compliant location
//! (`~/.config/macfinder/settings.json` on Linux).

use crate::error::{ConfigError, ConfigResult};
use crate::gateway::{DEFAULT_CONCURRENCY, DEFAULT_TEMPLATE};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application directory paths following XDG Base Directory Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/macfinder)
    pub config_dir: PathBuf,
}

impl Paths {
    /// Resolve paths using XDG directories.
    pub fn new() -> ConfigResult<Self> {
        let project = ProjectDirs::from("com", "macfinder", "macfinder")
            .ok_or(ConfigError::DirectoryNotFound)?;

        Ok(Self {
            config_dir: project.config_dir().to_path_buf(),
        })
    }

    /// Get the path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }

    /// Get the default inventory path.
    pub fn inventory_file(&self) -> PathBuf {
        self.config_dir.join("devices.csv")
    }
}

/// Application-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Maximum number of devices queried at once.
    pub concurrency: usize,
    /// Per-command timeout in milliseconds.
    pub command_timeout_ms: u64,
    /// Inventory tag selecting the switches to search.
    pub switch_tag: String,
    /// Shell template used to run a command on a device.
    pub connect_template: String,
    /// Inventory file; defaults to `devices.csv` in the config directory.
    pub inventory: Option<PathBuf>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            command_timeout_ms: 30_000,
            switch_tag: "switch".to_string(),
            connect_template: DEFAULT_TEMPLATE.to_string(),
            inventory: None,
        }
    }
}

impl AppSettings {
    /// Load settings from the default location, or defaults if absent.
    pub fn load() -> ConfigResult<Self> {
        let file = Paths::new()?.settings_file();

        if !file.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&file)
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let settings: Self =
            serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check that the settings are usable.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.concurrency == 0 {
            return Err(ConfigError::InvalidValue(
                "concurrency must be at least 1".to_string(),
            ));
        }

        if self.command_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "command_timeout_ms must be greater than 0".to_string(),
            ));
        }

        if !self.connect_template.contains("{command}") {
            return Err(ConfigError::InvalidValue(
                "connect_template must contain {command}".to_string(),
            ));
        }

        if !self.connect_template.contains("{address}") && !self.connect_template.contains("{name}") {
            return Err(ConfigError::InvalidValue(
                "connect_template must contain {address} or {name}".to_string(),
            ));
        }

        Ok(())
    }

    /// Per-command timeout.
    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }

    /// Inventory path, falling back to the config directory.
    pub fn inventory_path(&self) -> ConfigResult<PathBuf> {
        match &self.inventory {
            Some(path) => Ok(path.clone()),
            None => Ok(Paths::new()?.inventory_file()),
        }
    }
}
