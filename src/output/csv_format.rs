//! CSV output formatting.

use crate::executor::ScanResponse;
use std::io::{self, Write};

/// Write one `ip,port,service` row per identified service.
pub fn write_csv<W: Write>(out: W, response: &ScanResponse) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);

    wtr.write_record(["ip", "port", "service"])?;
    for found in response.results() {
        wtr.write_record([
            found.ip.to_string(),
            found.port.to_string(),
            found.service.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Print results in CSV format.
pub fn print_csv(response: &ScanResponse) -> io::Result<()> {
    write_csv(io::stdout().lock(), response).map_err(io::Error::from)
}
