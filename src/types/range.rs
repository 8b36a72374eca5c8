//! IPv4 address range arithmetic.
//!
//! Addresses are handled as 32-bit integers so a range can be walked with
//! plain integer iteration. IPv6 is out of scope: every type here assumes
//! the 32-bit address space.

use ipnetwork::Ipv4Network;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;

use crate::error::{ScanError, ScanResult};

/// Convert a dotted-quad string to its 32-bit integer form.
///
/// Malformed octets (non-numeric or above 255) and missing octets decode
/// as 0; there is no error path. Characters after the fourth octet are
/// ignored.
pub fn ip_to_int(ip: &str) -> u32 {
    ip.split('.')
        .take(4)
        .enumerate()
        .fold(0u32, |acc, (i, part)| {
            let octet = part.parse::<u8>().unwrap_or(0);
            acc | (u32::from(octet) << (24 - 8 * i))
        })
}

/// Convert a 32-bit integer back into an IPv4 address.
pub fn int_to_ip(ip: u32) -> Ipv4Addr {
    Ipv4Addr::from(ip)
}

/// An inclusive range of IPv4 addresses.
///
/// `start > end` is not rejected; such a range simply yields no addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ipv4Range {
    start: u32,
    end: u32,
}

impl Ipv4Range {
    /// Create a range from two addresses.
    pub fn new(start: Ipv4Addr, end: Ipv4Addr) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Create a range from two dotted-quad strings using [`ip_to_int`].
    pub fn from_strs(start: &str, end: &str) -> Self {
        Self {
            start: ip_to_int(start),
            end: ip_to_int(end),
        }
    }

    /// The full extent of a CIDR block, network and broadcast included.
    pub fn from_cidr(cidr: &str) -> ScanResult<Self> {
        let network: Ipv4Network = cidr
            .trim()
            .parse()
            .map_err(|e| ScanError::InvalidTarget(format!("{cidr}: {e}")))?;
        Ok(Self::new(network.network(), network.broadcast()))
    }

    pub fn start(&self) -> Ipv4Addr {
        int_to_ip(self.start)
    }

    pub fn end(&self) -> Ipv4Addr {
        int_to_ip(self.end)
    }

    /// Number of addresses in the range.
    pub fn len(&self) -> u64 {
        if self.start > self.end {
            0
        } else {
            u64::from(self.end - self.start) + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Walk the range in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = Ipv4Addr> {
        (self.start..=self.end).map(int_to_ip)
    }
}

impl fmt::Display for Ipv4Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start(), self.end())
    }
}
