//! In-memory gateway that replays captured command output.
//!
//! Useful for tests and for replaying a fleet offline. Commands without a
//! scripted response return empty output, which is what a switch prints for
//! a filtered command that matched nothing.

use super::DeviceGateway;
use crate::error::{GatewayError, GatewayResult};
use crate::types::DeviceHandle;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// A command the scripted gateway received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedCall {
    pub device: String,
    pub command: String,
}

#[derive(Debug, Clone, Copy)]
enum DeviceFault {
    Unreachable,
    Timeout,
}

/// Gateway backed by a table of `(device, command) -> output`.
#[derive(Debug, Default)]
pub struct ScriptedGateway {
    responses: HashMap<(String, String), String>,
    command_failures: HashMap<(String, String), String>,
    device_faults: HashMap<String, DeviceFault>,
    delays: HashMap<String, Duration>,
    concurrency: Option<usize>,
    calls: Mutex<Vec<ScriptedCall>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

/// Decrements the in-flight counter when a command finishes.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ScriptedGateway {
    /// Create an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the output of a command on a device.
    pub fn respond(
        mut self,
        device: impl Into<String>,
        command: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        self.responses
            .insert((device.into(), command.into()), output.into());
        self
    }

    /// Make one command fail on a device with a CLI error.
    pub fn fail_command(
        mut self,
        device: impl Into<String>,
        command: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        self.command_failures
            .insert((device.into(), command.into()), reason.into());
        self
    }

    /// Make every command on a device fail as unreachable.
    pub fn unreachable(mut self, device: impl Into<String>) -> Self {
        self.device_faults
            .insert(device.into(), DeviceFault::Unreachable);
        self
    }

    /// Make every command on a device time out.
    pub fn timing_out(mut self, device: impl Into<String>) -> Self {
        self.device_faults.insert(device.into(), DeviceFault::Timeout);
        self
    }

    /// Delay every response from a device.
    pub fn with_delay(mut self, device: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(device.into(), delay);
        self
    }

    /// Override the broadcast concurrency.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = Some(concurrency);
        self
    }

    /// Every command received so far, in call order.
    pub fn calls(&self) -> Vec<ScriptedCall> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Number of times a command was sent to a device.
    pub fn call_count(&self, device: &str, command: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.device == device && c.command == command)
            .count()
    }

    /// Commands sent to one device, in call order.
    pub fn commands_for(&self, device: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.device == device)
            .map(|c| c.command)
            .collect()
    }

    /// Highest number of commands that were running at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, device: &str, command: &str) {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(ScriptedCall {
                device: device.to_string(),
                command: command.to_string(),
            });
    }
}

#[async_trait]
impl DeviceGateway for ScriptedGateway {
    async fn run_command(&self, device: &DeviceHandle, command: &str) -> GatewayResult<String> {
        self.record(&device.name, command);
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);
        let _in_flight = InFlight(&self.in_flight);

        if let Some(delay) = self.delays.get(&device.name) {
            tokio::time::sleep(*delay).await;
        }

        match self.device_faults.get(&device.name) {
            Some(DeviceFault::Unreachable) => {
                return Err(GatewayError::DeviceUnreachable {
                    device: device.name.clone(),
                    reason: "connection refused".to_string(),
                })
            }
            Some(DeviceFault::Timeout) => {
                return Err(GatewayError::Timeout {
                    device: device.name.clone(),
                    command: command.to_string(),
                })
            }
            None => {}
        }

        let key = (device.name.clone(), command.to_string());
        if let Some(reason) = self.command_failures.get(&key) {
            return Err(GatewayError::CommandError {
                device: device.name.clone(),
                command: command.to_string(),
                reason: reason.clone(),
            });
        }

        Ok(self.responses.get(&key).cloned().unwrap_or_default())
    }

    fn max_concurrency(&self) -> usize {
        self.concurrency.unwrap_or(super::DEFAULT_CONCURRENCY)
    }
}
