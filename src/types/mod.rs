//! Core type definitions using newtype patterns for type safety.
//!
//! Ports, address ranges and the scan request are validated once at the
//! boundary so the scanner only ever sees well-formed values.

mod port;
mod range;
mod request;

pub use port::{is_valid_port, parse_token, Port, PortError, PortRange, PortSpec};
pub use range::{int_to_ip, ip_to_int, Ipv4Range};
pub use request::{
    port_spec_from_value, ScanRequest, DEFAULT_END, DEFAULT_START, DEFAULT_TIMEOUT,
};
