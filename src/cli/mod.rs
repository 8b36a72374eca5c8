//! CLI subcommand definitions and handlers.
//!
//! Implements a git-like subcommand architecture:
//! - `hostsweep scan [START] [END]` - Sweep an address range
//! - `hostsweep exec '<json array>'` - Run the raw argument-list entry point
//! - `hostsweep settings` - Show or reset stored defaults

mod exec;
mod scan;
mod settings;

pub use exec::ExecCommand;
pub use scan::ScanCommand;
pub use settings::SettingsCommand;

use crate::config::AppSettings;
use crate::error::CliResult;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// hostsweep - IPv4 host discovery and service identification.
///
/// Walks an address range, checks each host for liveness with a cascade of
/// TCP, UDP, HTTP and ARP probes, then reads service banners from the
/// requested ports of every live host.
#[derive(Parser, Debug)]
#[command(name = "hostsweep")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Sweep an IPv4 range for live hosts and known services", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a settings file used instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Load settings from `--config` or the default location.
    ///
    /// A missing file yields the defaults.
    pub fn settings(&self) -> CliResult<AppSettings> {
        let settings = match &self.config {
            Some(path) if path.exists() => AppSettings::load_from(path)?,
            Some(_) => AppSettings::default(),
            None => AppSettings::load()?,
        };
        Ok(settings)
    }
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sweep an address range
    #[command(alias = "s")]
    Scan(ScanCommand),

    /// Run a scan from a JSON argument list and print the response envelope
    #[command(alias = "x")]
    Exec(ExecCommand),

    /// Show or reset stored defaults
    Settings(SettingsCommand),
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable plain text
    #[default]
    Plain,
    /// JSON response envelope
    Json,
    /// CSV rows of ip, port, service
    Csv,
}

impl OutputFormat {
    /// Parse a stored format name, falling back to plain text.
    pub fn from_setting(name: &str) -> Self {
        <Self as clap::ValueEnum>::from_str(name, true).unwrap_or_default()
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_scan() {
        let cli = Cli::parse_from([
            "hostsweep", "-v", "scan", "10.0.0.1", "10.0.0.9", "-p", "22,80", "-o", "json",
        ]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Scan(scan) => {
                assert_eq!(scan.start.as_deref(), Some("10.0.0.1"));
                assert_eq!(scan.end.as_deref(), Some("10.0.0.9"));
                assert_eq!(scan.ports.as_deref(), Some("22,80"));
                assert_eq!(scan.output, Some(OutputFormat::Json));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cidr_conflicts_with_range() {
        let parsed = Cli::try_parse_from(["hostsweep", "scan", "10.0.0.1", "--cidr", "10.0.0.0/24"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_format_from_setting() {
        assert_eq!(OutputFormat::from_setting("json"), OutputFormat::Json);
        assert_eq!(OutputFormat::from_setting("CSV"), OutputFormat::Csv);
        assert_eq!(OutputFormat::from_setting("yaml"), OutputFormat::Plain);
    }
}
