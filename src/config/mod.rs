//! Configuration management for hostsweep.
//!
//! Provides XDG-compliant settings storage for command-line defaults.

mod settings;

pub use settings::{AppSettings, Paths};
