//! Output formatting module.
//!
//! Provides formatters for plain text and JSON output of search reports.

mod json_format;
mod plain;

pub use json_format::print_json;
pub use plain::{print_error, print_plain, print_search_header, print_warning, write_plain};

use crate::cli::OutputFormat;
use crate::search::SearchReport;
use std::io;

/// Format and print a search report according to the specified format.
pub fn print_report(report: &SearchReport, format: OutputFormat, quiet: bool) -> io::Result<()> {
    match format {
        OutputFormat::Plain => plain::print_plain(report, quiet),
        OutputFormat::Json => json_format::print_json(report),
    }
}
