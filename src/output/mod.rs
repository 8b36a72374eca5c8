//! Output formatting module.
//!
//! Provides formatters for plain text, JSON, and CSV output of scan results.

mod csv_format;
mod json_format;
mod plain;

pub use csv_format::{print_csv, write_csv};
pub use json_format::{print_json, write_json};
pub use plain::{
    print_error, print_plain, print_scan_header, print_success, print_warning,
    write_plain,
};

use crate::cli::OutputFormat;
use crate::executor::ScanResponse;
use std::io;

/// Format and print a response according to the specified format.
pub fn print_results(response: &ScanResponse, format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Plain => print_plain(response),
        OutputFormat::Json => print_json(response),
        OutputFormat::Csv => print_csv(response),
    }
}
