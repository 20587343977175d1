//! Plain text output formatting.
//!
//! Produces human-readable output with colors. The last line is always the
//! answer: `<device> interface <name>` or `MAC was not found`.

use crate::search::SearchReport;
use console::style;
use std::io::{self, Write};

/// Print a search report to stdout.
pub fn print_plain(report: &SearchReport, quiet: bool) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_plain(&mut out, report, quiet)
}

/// Write a search report in plain text.
pub fn write_plain<W: Write>(out: &mut W, report: &SearchReport, quiet: bool) -> io::Result<()> {
    if !quiet {
        writeln!(out)?;
        writeln!(out, "  {} {}", style("Target:").bold(), report.target)?;
        writeln!(out, "  {} {}", style("Resolved by:").bold(), report.stage)?;
        if let Some(vlan) = report.retained_vlan {
            writeln!(out, "  {} {}", style("Learned VLAN:").bold(), vlan)?;
        }
        writeln!(
            out,
            "  {} {} device queries in {:.2}s",
            style("Statistics:").bold(),
            report.queries_issued,
            report.duration_ms as f64 / 1000.0
        )?;

        if !report.failures.is_empty() {
            writeln!(
                out,
                "  {} {}",
                style("Failed queries:").bold(),
                style(report.failures.len()).yellow()
            )?;
            for failure in &report.failures {
                writeln!(
                    out,
                    "    {} [{}] {}",
                    style("•").dim(),
                    failure.stage,
                    style(&failure.error).dim()
                )?;
            }
        }
        writeln!(out)?;

        if report.result.is_found() {
            writeln!(out, "{}", style("MAC was found").green().bold())?;
        }
    }

    if report.result.is_found() {
        writeln!(out, "{}", report.result)?;
    } else {
        writeln!(out, "{}", style(&report.result).red())?;
    }

    Ok(())
}

/// Print a search header before the search begins.
pub fn print_search_header(target: &str, devices: usize) {
    eprintln!();
    eprintln!(
        "{} {} v{}",
        style("Starting").cyan(),
        style("macfinder").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    eprintln!(
        "{} Target: {}",
        style("•").dim(),
        style(target).white().bold()
    );
    eprintln!(
        "{} Searching {} switches...",
        style("•").dim(),
        style(devices).white().bold()
    );
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}
