//! # macfinder - Locate a MAC Address on a Switch Fleet
//!
//! macfinder answers "which switch port is this device plugged into?" by
//! querying every switch in an inventory and narrowing down in tiers:
//!
//! - **Broadcast** the MAC table lookup to every switch
//! - **Direct port check**: an access port that learned the address is the answer
//! - **VLAN SVI fallback**: compare the learned VLAN's interface MAC on each switch
//! - **Exhaustive SVI scan**: compare every VLAN interface on every switch
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use macfinder::gateway::ShellGateway;
//! use macfinder::search::MacLocator;
//! use macfinder::types::DeviceHandle;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let fleet = vec![
//!         DeviceHandle::new("access-sw1", "10.0.0.11"),
//!         DeviceHandle::new("core-sw1", "10.0.0.1"),
//!     ];
//!     let locator = MacLocator::new(Arc::new(ShellGateway::default()), fleet);
//!
//!     let report = locator.locate("0050.7966.6800".parse().unwrap()).await;
//!     println!("{}", report.result);
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - MAC address, VLAN id and device handle newtypes
//! - [`parser`] - Pure parsers for switch CLI output
//! - [`commands`] - The command strings a search sends
//! - [`gateway`] - The `DeviceGateway` trait and its implementations
//! - [`inventory`] - Fleet inventory loading and tag filtering
//! - [`search`] - The tiered search state machine
//! - [`config`] - Settings management
//! - [`error`] - Error types
//! - [`output`] - Output formatting utilities

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod gateway;
pub mod inventory;
pub mod output;
pub mod parser;
pub mod search;
pub mod types;

// Re-export commonly used types
pub use error::{GatewayError, InventoryError};
pub use gateway::{DeviceGateway, ScriptedGateway, ShellGateway};
pub use search::{MacLocator, SearchReport, SearchResult, SearchStage};
pub use types::{DeviceHandle, MacAddress, VlanId};
