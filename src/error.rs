//! Error types for hostsweep.
//!
//! Uses `thiserror` for ergonomic error definitions.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for scanning operations.
///
/// Only [`ScanError::Serialization`] can fail a scan response; the
/// remaining variants describe probe failures that are logged and folded
/// into "not alive".
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("failed to serialize scan results: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Raw socket error: {0}")]
    RawSocket(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Interface not found: {0}")]
    InterfaceNotFound(String),

    #[error("Invalid packet: {0}")]
    InvalidPacket(String),

    #[error("Invalid target: {0}")]
    InvalidTarget(String),
}

/// Result type alias for scan operations.
pub type ScanResult<T> = Result<T, ScanError>;

/// Errors raised while loading or storing settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine a configuration directory")]
    DirectoryNotFound,

    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("failed to write {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    #[error("invalid settings format: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::InvalidFormat(e.to_string())
    }
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Top-level error for the command-line front end.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
}

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;
