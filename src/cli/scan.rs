//! Scan subcommand implementation.
//!
//! Handles the `hostsweep scan [START] [END]` command.

use crate::cli::OutputFormat;
use crate::config::AppSettings;
use crate::error::{CliError, CliResult};
use crate::executor::ScanExecutor;
use crate::output;
use crate::types::{Ipv4Range, PortSpec, ScanRequest};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::debug;

/// Sweep an address range for live hosts and identify their services.
#[derive(Parser, Debug)]
pub struct ScanCommand {
    /// First address of the range (defaults to the stored setting)
    #[arg(value_name = "START", conflicts_with = "cidr")]
    pub start: Option<String>,

    /// Last address of the range (defaults to START when START is given)
    #[arg(value_name = "END", conflicts_with = "cidr")]
    pub end: Option<String>,

    /// Sweep a whole network instead, e.g. "10.0.0.0/24"
    #[arg(long, value_name = "CIDR")]
    pub cidr: Option<String>,

    /// Ports to identify (e.g., "22", "22,80", "8000-8080")
    #[arg(short, long)]
    pub ports: Option<String>,

    /// Overall deadline in seconds
    #[arg(short = 't', long, env = "HOSTSWEEP_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Maximum number of hosts scanned concurrently (0 = unlimited)
    #[arg(short = 'c', long, env = "HOSTSWEEP_CONCURRENCY")]
    pub concurrency: Option<usize>,

    /// Output format for results
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,
}

impl ScanCommand {
    /// Execute the scan command.
    pub async fn execute(&self, settings: &AppSettings, quiet: bool) -> CliResult<()> {
        let request = self.request(settings)?;
        let format = self
            .output
            .unwrap_or_else(|| OutputFormat::from_setting(&settings.default_output_format));
        let limit = self.concurrency.unwrap_or(settings.max_concurrency);
        let interactive = !quiet && format == OutputFormat::Plain;

        if !is_root() && !quiet {
            output::print_warning("not running as root; the ARP liveness probe is unavailable.");
        }

        if interactive {
            output::print_scan_header(&request);
        }

        debug!(limit, %format, "running scan");
        let spinner = interactive.then(|| spinner(&request));
        let response = ScanExecutor::with_limit(limit).run(&request).await;
        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }

        output::print_results(&response, format)?;
        Ok(())
    }

    /// Build the typed request, filling gaps from `settings`.
    pub fn request(&self, settings: &AppSettings) -> CliResult<ScanRequest> {
        let range = match &self.cidr {
            Some(cidr) => Ipv4Range::from_cidr(cidr)?,
            None => {
                let start = self.start.as_deref().unwrap_or(&settings.default_start);
                let end = match (&self.start, &self.end) {
                    (_, Some(end)) => end.as_str(),
                    (Some(start), None) => start.as_str(),
                    (None, None) => settings.default_end.as_str(),
                };
                Ipv4Range::from_strs(start, end)
            }
        };

        let ports = PortSpec::parse(self.ports.as_deref().unwrap_or(&settings.default_ports));
        if ports.is_empty() {
            return Err(CliError::InvalidArguments("no valid ports specified".to_string()));
        }

        let timeout = Duration::from_secs(self.timeout.unwrap_or(settings.default_timeout_secs));
        Ok(ScanRequest::new(range, &ports, timeout))
    }
}

fn spinner(request: &ScanRequest) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.cyan} [{elapsed_precise}] {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(format!("sweeping {}", request.range()));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Check if running with root/admin privileges.
fn is_root() -> bool {
    #[cfg(unix)]
    {
        unsafe { libc::geteuid() == 0 }
    }
    #[cfg(not(unix))]
    {
        false
    }
}
