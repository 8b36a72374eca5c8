//! JSON output formatting.

use crate::executor::ScanResponse;
use std::io::{self, Write};

/// Write the response envelope as pretty-printed JSON.
pub fn write_json<W: Write>(out: &mut W, response: &ScanResponse) -> io::Result<()> {
    let json = response.to_json_pretty().map_err(io::Error::other)?;
    writeln!(out, "{json}")
}

/// Print the response envelope to stdout.
pub fn print_json(response: &ScanResponse) -> io::Result<()> {
    write_json(&mut io::stdout().lock(), response)
}
