//! JSON output formatting.

use crate::search::SearchReport;
use std::io;

/// Print a search report in JSON format.
pub fn print_json(report: &SearchReport) -> io::Result<()> {
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    println!("{}", json);
    Ok(())
}
