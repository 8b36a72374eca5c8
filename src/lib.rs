//! # hostsweep - IPv4 Host Discovery and Service Identification
//!
//! hostsweep walks an inclusive IPv4 address range, decides whether each
//! host is alive with a cascade of liveness probes, and reads a banner from
//! every requested port of each live host to label the service behind it.
//!
//! ## Features
//!
//! - **Liveness Cascade**: TCP connect, UDP DNS query, HTTP HEAD and ARP,
//!   tried in order until one succeeds
//! - **Banner Identification**: SSH, web, FTP and mail servers
//! - **Single Deadline**: one overall timeout bounds the whole sweep and
//!   partial results are kept
//! - **Bounded Fan-out**: optional cap on concurrent host scans
//! - **Multiple Output Formats**: Plain text, JSON, and CSV
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use hostsweep::ScanExecutor;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() {
//!     let executor = ScanExecutor::new();
//!     let response = executor
//!         .execute(&[json!("192.168.1.1"), json!("192.168.1.20"), json!("22,80"), json!(30)])
//!         .await;
//!
//!     for found in response.results() {
//!         println!("{}:{} {}", found.ip, found.port, found.service);
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Ports, address ranges and the typed scan request
//! - [`scanner`] - Liveness probes, the probe cascade and the range sweep
//! - [`banner`] - Banner reading on a single port
//! - [`services`] - Banner signatures and service labels
//! - [`executor`] - Argument-list entry point and response envelope
//! - [`config`] - Stored command-line defaults
//! - [`error`] - Error types
//! - [`output`] - Output formatting utilities

pub mod banner;
pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod output;
pub mod scanner;
pub mod services;
pub mod types;

// Re-export commonly used types
pub use error::{CliError, ScanError};
pub use executor::{ScanExecutor, ScanResponse};
pub use scanner::{HostService, LivenessProbe, ProbeCascade, ProbeKind, RangeScanner};
pub use services::ServiceLabel;
pub use types::{Ipv4Range, Port, PortSpec, ScanRequest};
