//! Command-line interface for macfinder.
//!
//! Uses `clap` derive macros for declarative argument parsing. Flags
//! override the settings file, which overrides built-in defaults.

use crate::config::AppSettings;
use crate::gateway::ShellGateway;
use crate::inventory::Inventory;
use crate::output;
use crate::search::MacLocator;
use crate::types::MacAddress;
use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Find the switch interface that owns a MAC address.
///
/// Every switch in the inventory is asked for its MAC table entry. Access
/// ports answer directly; otherwise the matching VLAN interface is searched,
/// and as a last resort every VLAN interface on every switch.
#[derive(Parser, Debug)]
#[command(name = "macfinder")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Locate the switch interface that owns a MAC address", long_about = None)]
pub struct Args {
    /// MAC address to locate (aa:bb:cc:dd:ee:ff, aa-bb-cc-dd-ee-ff or aabb.ccdd.eeff).
    /// Prompted for when omitted.
    #[arg(value_name = "MAC")]
    pub mac: Option<String>,

    /// Inventory CSV file (hostname;ip;tags)
    #[arg(short, long, value_name = "PATH", env = "MACFINDER_INVENTORY")]
    pub inventory: Option<PathBuf>,

    /// Only search devices with this inventory tag
    #[arg(short = 't', long, value_name = "TAG")]
    pub tag: Option<String>,

    /// Maximum number of devices queried at once
    #[arg(short = 'c', long)]
    pub concurrency: Option<usize>,

    /// Per-command timeout in milliseconds
    #[arg(long = "timeout", value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Shell template used to reach a device ({name}, {address}, {command})
    #[arg(long = "connect", value_name = "TEMPLATE")]
    pub connect_template: Option<String>,

    /// Path to custom settings file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output format for the result
    #[arg(short, long, value_enum, default_value = "plain")]
    pub output: OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Print only the result line
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable plain text
    #[default]
    Plain,
    /// JSON search report
    Json,
}

impl Args {
    /// Merge the settings file with command-line overrides.
    pub fn settings(&self) -> anyhow::Result<AppSettings> {
        let mut settings = match &self.config {
            Some(path) => AppSettings::load_from(path)
                .with_context(|| format!("loading settings from {}", path.display()))?,
            None => AppSettings::load().context("loading settings")?,
        };

        if let Some(path) = &self.inventory {
            settings.inventory = Some(path.clone());
        }
        if let Some(tag) = &self.tag {
            settings.switch_tag = tag.clone();
        }
        if let Some(concurrency) = self.concurrency {
            settings.concurrency = concurrency;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            settings.command_timeout_ms = timeout_ms;
        }
        if let Some(template) = &self.connect_template {
            settings.connect_template = template.clone();
        }

        settings.validate().context("invalid settings")?;
        Ok(settings)
    }

    /// Run the search. Returns whether the address was found.
    pub async fn execute(&self) -> anyhow::Result<bool> {
        let settings = self.settings()?;
        let target = self.target()?;

        let inventory_path = settings.inventory_path()?;
        let inventory = Inventory::from_path(&inventory_path)
            .with_context(|| format!("loading inventory from {}", inventory_path.display()))?;
        let switches = inventory.list_devices(Some(&settings.switch_tag));
        if switches.is_empty() {
            bail!(
                "no devices tagged '{}' in {}",
                settings.switch_tag,
                inventory_path.display()
            );
        }

        let gateway = ShellGateway::new(
            settings.connect_template.clone(),
            settings.command_timeout(),
            settings.concurrency,
        );
        let locator = MacLocator::new(Arc::new(gateway), switches);

        let interactive = !self.quiet && self.output == OutputFormat::Plain;
        if interactive {
            output::print_search_header(&target.to_string(), locator.fleet().len());
        }

        let spinner = if interactive { Some(search_spinner()?) } else { None };
        let report = locator.locate(target).await;
        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }

        if !report.failures.is_empty() && !self.quiet && self.output == OutputFormat::Plain {
            output::print_warning(&format!(
                "{} device queries failed; results may be incomplete",
                report.failures.len()
            ));
        }

        output::print_report(&report, self.output, self.quiet).context("writing result")?;
        Ok(report.result.is_found())
    }

    /// Target MAC from the argument, or prompted from stdin.
    fn target(&self) -> anyhow::Result<MacAddress> {
        let raw = match &self.mac {
            Some(mac) => mac.clone(),
            None => prompt("Enter MAC to search: ")?,
        };
        raw.parse::<MacAddress>()
            .with_context(|| format!("'{}' is not a MAC address", raw.trim()))
    }
}

fn prompt(message: &str) -> anyhow::Result<String> {
    let mut stderr = io::stderr();
    write!(stderr, "{}", message)?;
    stderr.flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn search_spinner() -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .context("building spinner style")?,
    );
    pb.set_message("Searching fleet...");
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}
