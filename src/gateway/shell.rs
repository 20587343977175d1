//! Gateway that runs each command through an external tool.
//!
//! The operator supplies a command template such as
//! `ssh -o BatchMode=yes {address} {command}`. Authentication, host keys and
//! jump hosts are the external tool's business; this gateway only renders
//! the template, enforces the per-command timeout and classifies failures.

use super::DeviceGateway;
use crate::error::{GatewayError, GatewayResult};
use crate::types::DeviceHandle;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

/// Default template: OpenSSH in batch mode, keys from the agent or config.
pub const DEFAULT_TEMPLATE: &str = "ssh -o BatchMode=yes -o ConnectTimeout=10 {address} {command}";

/// Exit status OpenSSH uses for connection-level failures.
const SSH_CONNECT_FAILURE: i32 = 255;

/// Prefixes the switch CLI uses for rejected commands.
const CLI_ERROR_MARKERS: [&str; 3] = [
    "% Invalid input",
    "% Incomplete command",
    "% Ambiguous command",
];

/// Characters that need escaping inside shell double quotes.
static SHELL_ESCAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"([$`"\\\n])"#).expect("Invalid regex pattern"));

/// Quote a string for use as one shell word.
///
/// ```
/// use macfinder::gateway::shellquote;
///
/// assert_eq!(shellquote("show ip int br | i Vlan"), "\"show ip int br | i Vlan\"");
/// assert_eq!(shellquote("with$var"), "\"with\\$var\"");
/// ```
pub fn shellquote(s: &str) -> String {
    let escaped = SHELL_ESCAPE_RE.replace_all(s, r"\$1");
    format!("\"{}\"", escaped)
}

/// Gateway that shells out once per command.
#[derive(Debug, Clone)]
pub struct ShellGateway {
    template: String,
    timeout: Duration,
    concurrency: usize,
}

impl ShellGateway {
    /// Create a gateway.
    ///
    /// # Arguments
    /// * `template` - Shell command with `{name}`, `{address}` and `{command}` placeholders
    /// * `timeout` - Upper bound on a single command, including connection setup
    /// * `concurrency` - Maximum commands in flight during a broadcast
    pub fn new(template: impl Into<String>, timeout: Duration, concurrency: usize) -> Self {
        Self {
            template: template.into(),
            timeout,
            concurrency: concurrency.max(1),
        }
    }

    /// Render the shell line for one device and command.
    pub fn render(&self, device: &DeviceHandle, command: &str) -> String {
        self.template
            .replace("{name}", &shellquote(&device.name))
            .replace("{address}", &shellquote(&device.address))
            .replace("{command}", &shellquote(command))
    }

    fn classify(
        &self,
        device: &DeviceHandle,
        command: &str,
        exit_code: i32,
        stdout: String,
        stderr: String,
    ) -> GatewayResult<String> {
        if exit_code == SSH_CONNECT_FAILURE {
            return Err(GatewayError::DeviceUnreachable {
                device: device.name.clone(),
                reason: stderr,
            });
        }

        if exit_code != 0 {
            return Err(GatewayError::CommandError {
                device: device.name.clone(),
                command: command.to_string(),
                reason: format!("exit code {}: {}", exit_code, stderr),
            });
        }

        if let Some(marker) = CLI_ERROR_MARKERS.iter().find(|m| stdout.contains(*m)) {
            return Err(GatewayError::CommandError {
                device: device.name.clone(),
                command: command.to_string(),
                reason: marker.trim_start_matches("% ").to_string(),
            });
        }

        Ok(stdout)
    }
}

impl Default for ShellGateway {
    fn default() -> Self {
        Self::new(
            DEFAULT_TEMPLATE,
            Duration::from_secs(30),
            super::DEFAULT_CONCURRENCY,
        )
    }
}

#[async_trait]
impl DeviceGateway for ShellGateway {
    async fn run_command(&self, device: &DeviceHandle, command: &str) -> GatewayResult<String> {
        let line = self.render(device, command);
        tracing::debug!(device = %device.name, command = %command, "Running device command");

        let child = Command::new("/bin/sh")
            .arg("-c")
            .arg(&line)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = match timeout(self.timeout, child).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(GatewayError::DeviceUnreachable {
                    device: device.name.clone(),
                    reason: format!("failed to spawn gateway command: {}", e),
                })
            }
            Err(_) => {
                tracing::warn!(device = %device.name, command = %command, "Device command timed out");
                return Err(GatewayError::Timeout {
                    device: device.name.clone(),
                    command: command.to_string(),
                });
            }
        };

        let exit_code = output.status.code().unwrap_or(-1);
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        let result = self.classify(device, command, exit_code, stdout, stderr);
        if let Err(ref e) = result {
            tracing::warn!(device = %device.name, error = %e, "Device command failed");
        } else {
            tracing::trace!(device = %device.name, command = %command, "Device command succeeded");
        }
        result
    }

    fn max_concurrency(&self) -> usize {
        self.concurrency
    }
}
