//! Configuration management for macfinder.
//!
//! Provides XDG-compliant settings storage: gateway template, concurrency,
//! command timeout and inventory location.

mod settings;

pub use settings::{AppSettings, Paths};
