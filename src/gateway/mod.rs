//! Device gateway - the only way the search talks to switches.
//!
//! A gateway runs one command string on one device and hands back the raw
//! text. Session setup, credentials and per-command timeouts all live behind
//! this trait.

mod scripted;
mod shell;

pub use scripted::{ScriptedCall, ScriptedGateway};
pub use shell::{shellquote, ShellGateway, DEFAULT_TEMPLATE};

use crate::error::GatewayResult;
use crate::types::DeviceHandle;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};

/// Default number of devices queried at once.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Output (or failure) of one command on one device.
#[derive(Debug, Clone)]
pub struct DeviceResponse {
    pub device: DeviceHandle,
    pub output: GatewayResult<String>,
}

/// Trait for executing CLI commands on switches.
///
/// # Example
///
/// ```ignore
/// use macfinder::gateway::DeviceGateway;
/// use macfinder::types::DeviceHandle;
///
/// async fn version<G: DeviceGateway>(gateway: &G, device: &DeviceHandle) -> Option<String> {
///     gateway.run_command(device, "show version").await.ok()
/// }
/// ```
#[async_trait]
pub trait DeviceGateway: Send + Sync {
    /// Run a command on one device and return its raw output.
    async fn run_command(&self, device: &DeviceHandle, command: &str) -> GatewayResult<String>;

    /// Upper bound on concurrent commands issued by `broadcast`.
    fn max_concurrency(&self) -> usize {
        DEFAULT_CONCURRENCY
    }

    /// Run the same command on every device concurrently.
    ///
    /// Responses come back in completion order. A failing device only
    /// affects its own entry.
    async fn broadcast(&self, devices: &[DeviceHandle], command: &str) -> Vec<DeviceResponse> {
        stream::iter(devices.iter().cloned())
            .map(|device| async move {
                let output = self.run_command(&device, command).await;
                DeviceResponse { device, output }
            })
            .buffer_unordered(self.max_concurrency().max(1))
            .collect()
            .await
    }
}
