//! MAC address location across a switch fleet.
//!
//! The search runs in tiers, each one only when the previous could not give
//! an answer:
//!
//! 1. **Broadcast** - ask every switch for its MAC table entry for the target.
//! 2. **Direct port check** - for each switch that named an interface, read
//!    the interface config. An access port is the answer; a trunk only means
//!    the frame passed through.
//! 3. **VLAN SVI fallback** - if any switch reported a VLAN, compare the MAC
//!    of that VLAN's SVI on every responding switch.
//! 4. **Exhaustive SVI scan** - otherwise list every SVI on every switch and
//!    compare each one.
//!
//! Device failures never abort a search. They are logged, recorded in the
//! report, and the device simply contributes nothing to that stage.

mod retained;

#[cfg(test)]
mod tests;

pub use retained::RetainedVlan;

use crate::commands;
use crate::error::GatewayError;
use crate::gateway::{DeviceGateway, DeviceResponse};
use crate::parser::{self, PortClassification};
use crate::types::{DeviceHandle, MacAddress, VlanId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Stage of the search state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStage {
    Broadcast,
    DirectPortCheck,
    VlanSviFallback,
    ExhaustiveSviScan,
}

impl fmt::Display for SearchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Broadcast => write!(f, "broadcast"),
            Self::DirectPortCheck => write!(f, "direct port check"),
            Self::VlanSviFallback => write!(f, "VLAN SVI fallback"),
            Self::ExhaustiveSviScan => write!(f, "exhaustive SVI scan"),
        }
    }
}

/// What one device's MAC table said about the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupObservation {
    pub device: DeviceHandle,
    pub vlan: Option<VlanId>,
    pub interface: Option<String>,
}

/// Terminal outcome of a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SearchResult {
    Found {
        device: DeviceHandle,
        interface: String,
    },
    NotFound,
}

impl SearchResult {
    /// Check if the address was located.
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }
}

impl fmt::Display for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Found { device, interface } => write!(f, "{} interface {}", device, interface),
            Self::NotFound => write!(f, "MAC was not found"),
        }
    }
}

/// A device query that failed during the search.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceFailure {
    pub device: String,
    pub stage: SearchStage,
    pub error: String,
}

/// Result of a search together with what it took to get there.
#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    /// Address that was searched.
    pub target: MacAddress,
    /// Terminal outcome.
    pub result: SearchResult,
    /// Stage that produced the outcome.
    pub stage: SearchStage,
    /// VLAN retained from the broadcast, if any device reported one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retained_vlan: Option<VlanId>,
    /// Number of device commands issued.
    pub queries_issued: usize,
    /// Queries that failed and were treated as absent observations.
    pub failures: Vec<DeviceFailure>,
    /// When the search started.
    pub started_at: DateTime<Utc>,
    /// Total search duration in milliseconds.
    pub duration_ms: u64,
}

/// Locates MAC addresses on a fixed fleet through a gateway.
pub struct MacLocator<G: DeviceGateway + ?Sized> {
    gateway: Arc<G>,
    fleet: Vec<DeviceHandle>,
}

impl<G: DeviceGateway + ?Sized> MacLocator<G> {
    /// Create a locator. Fleet order is used for deterministic tie-breaks.
    pub fn new(gateway: Arc<G>, fleet: Vec<DeviceHandle>) -> Self {
        Self { gateway, fleet }
    }

    /// Devices this locator searches.
    pub fn fleet(&self) -> &[DeviceHandle] {
        &self.fleet
    }

    /// Search the fleet for `target`.
    pub async fn locate(&self, target: MacAddress) -> SearchReport {
        let started_at = Utc::now();
        let start = Instant::now();
        info!(mac = %target, devices = self.fleet.len(), "Starting MAC search");

        let mut run = SearchRun::new(self.gateway.as_ref(), &self.fleet, target);
        let (result, stage) = run.execute().await;

        info!(mac = %target, stage = %stage, result = %result, "MAC search finished");

        SearchReport {
            target,
            result,
            stage,
            retained_vlan: run.retained.get(),
            queries_issued: run.queries,
            failures: run.failures,
            started_at,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }
}

/// State of one search invocation.
struct SearchRun<'a, G: DeviceGateway + ?Sized> {
    gateway: &'a G,
    fleet: &'a [DeviceHandle],
    fleet_index: HashMap<&'a str, usize>,
    target: MacAddress,
    retained: RetainedVlan,
    failures: Vec<DeviceFailure>,
    queries: usize,
}

impl<'a, G: DeviceGateway + ?Sized> SearchRun<'a, G> {
    fn new(gateway: &'a G, fleet: &'a [DeviceHandle], target: MacAddress) -> Self {
        let fleet_index = fleet
            .iter()
            .enumerate()
            .map(|(i, d)| (d.name.as_str(), i))
            .collect();

        Self {
            gateway,
            fleet,
            fleet_index,
            target,
            retained: RetainedVlan::new(),
            failures: Vec::new(),
            queries: 0,
        }
    }

    async fn execute(&mut self) -> (SearchResult, SearchStage) {
        let observations = self.broadcast_stage().await;

        let candidates: Vec<(DeviceHandle, String)> = observations
            .iter()
            .filter_map(|o| o.interface.clone().map(|i| (o.device.clone(), i)))
            .collect();

        if !candidates.is_empty() {
            if let Some(found) = self.direct_port_check(&candidates).await {
                return (found, SearchStage::DirectPortCheck);
            }
        }

        match self.retained.get() {
            Some(vlan) => {
                let responders: Vec<DeviceHandle> =
                    observations.into_iter().map(|o| o.device).collect();
                let result = self.vlan_svi_fallback(&responders, vlan).await;
                (result, SearchStage::VlanSviFallback)
            }
            None => {
                let result = self.exhaustive_svi_scan().await;
                (result, SearchStage::ExhaustiveSviScan)
            }
        }
    }

    /// Query every MAC table and collect one observation per responding
    /// device, in fleet order. Waits for the whole fleet before returning.
    async fn broadcast_stage(&mut self) -> Vec<LookupObservation> {
        let command = commands::mac_table_lookup(&self.target);
        let responses = self.broadcast(SearchStage::Broadcast, self.fleet, &command).await;

        // Responses are in arrival order here; the retained VLAN follows it.
        let mut observations: Vec<LookupObservation> = responses
            .into_iter()
            .map(|(device, output)| {
                let entry = parser::parse_mac_table_line(&output);
                if self.retained.offer(entry.vlan) {
                    debug!(device = %device.name, vlan = ?entry.vlan, "Retained VLAN");
                }
                match &entry.interface {
                    Some(interface) => {
                        debug!(device = %device.name, interface = %interface, "MAC seen on device")
                    }
                    None => debug!(device = %device.name, "MAC not present on device"),
                }
                LookupObservation {
                    device,
                    vlan: entry.vlan,
                    interface: entry.interface,
                }
            })
            .collect();

        observations.sort_by_key(|o| self.position(&o.device));
        observations
    }

    /// Check candidate ports in fleet order; the first access port wins.
    async fn direct_port_check(
        &mut self,
        candidates: &[(DeviceHandle, String)],
    ) -> Option<SearchResult> {
        info!(candidates = candidates.len(), "Checking candidate ports");

        for (device, interface) in candidates {
            let command = commands::interface_running_config(interface);
            let classification = match self.query(SearchStage::DirectPortCheck, device, &command).await {
                Some(config) => parser::classify_port(&config),
                None => PortClassification::Unknown,
            };

            debug!(device = %device.name, interface = %interface, port = %classification, "Classified port");

            if classification == PortClassification::Access {
                return Some(SearchResult::Found {
                    device: device.clone(),
                    interface: interface.clone(),
                });
            }
        }

        None
    }

    /// Compare the SVI MAC of the retained VLAN on every broadcast responder.
    async fn vlan_svi_fallback(&mut self, responders: &[DeviceHandle], vlan: VlanId) -> SearchResult {
        info!(vlan = %vlan, devices = responders.len(), "Checking VLAN SVI on responding devices");

        let command = commands::vlan_interface_detail(vlan);
        for device in responders {
            if self.svi_matches(SearchStage::VlanSviFallback, device, &command).await {
                return SearchResult::Found {
                    device: device.clone(),
                    interface: vlan.svi_name(),
                };
            }
        }

        SearchResult::NotFound
    }

    /// List every SVI on every device and compare each one.
    async fn exhaustive_svi_scan(&mut self) -> SearchResult {
        info!(devices = self.fleet.len(), "Checking all SVIs on every device");

        let command = commands::svi_brief_table();
        let mut tables = self
            .broadcast(SearchStage::ExhaustiveSviScan, self.fleet, &command)
            .await;
        tables.sort_by_key(|(device, _)| self.position(device));

        for (device, table) in tables {
            let mut seen = HashSet::new();
            let svis: Vec<String> = parser::extract_svi_list(&table)
                .into_iter()
                .filter(|svi| seen.insert(svi.clone()))
                .collect();
            debug!(device = %device.name, svis = svis.len(), "Discovered SVIs");

            for svi in svis {
                let command = commands::interface_detail(&svi);
                if self.svi_matches(SearchStage::ExhaustiveSviScan, &device, &command).await {
                    return SearchResult::Found {
                        device,
                        interface: svi,
                    };
                }
            }
        }

        SearchResult::NotFound
    }

    async fn svi_matches(&mut self, stage: SearchStage, device: &DeviceHandle, command: &str) -> bool {
        let Some(detail) = self.query(stage, device, command).await else {
            return false;
        };

        match parser::extract_interface_mac(&detail) {
            Some(mac) => {
                debug!(device = %device.name, command = %command, mac = %mac, "Compared interface MAC");
                mac == self.target
            }
            None => false,
        }
    }

    /// Run one command; a failure becomes `None`.
    async fn query(&mut self, stage: SearchStage, device: &DeviceHandle, command: &str) -> Option<String> {
        self.queries += 1;
        match self.gateway.run_command(device, command).await {
            Ok(output) => Some(output),
            Err(e) => {
                self.record_failure(stage, e);
                None
            }
        }
    }

    /// Run one command on many devices; failures are recorded and dropped.
    /// Successful outputs are returned in arrival order.
    async fn broadcast(
        &mut self,
        stage: SearchStage,
        devices: &[DeviceHandle],
        command: &str,
    ) -> Vec<(DeviceHandle, String)> {
        self.queries += devices.len();
        let responses = self.gateway.broadcast(devices, command).await;

        let mut outputs = Vec::with_capacity(responses.len());
        for DeviceResponse { device, output } in responses {
            match output {
                Ok(text) => outputs.push((device, text)),
                Err(e) => self.record_failure(stage, e),
            }
        }
        outputs
    }

    fn record_failure(&mut self, stage: SearchStage, error: GatewayError) {
        warn!(device = %error.device(), stage = %stage, error = %error, "Device query failed");
        self.failures.push(DeviceFailure {
            device: error.device().to_string(),
            stage,
            error: error.to_string(),
        });
    }

    fn position(&self, device: &DeviceHandle) -> usize {
        self.fleet_index
            .get(device.name.as_str())
            .copied()
            .unwrap_or(usize::MAX)
    }
}
