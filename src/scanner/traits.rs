//! Liveness probe trait abstraction.
//!
//! Every reachability test shares one interface so the cascade can treat
//! them as an ordered list of interchangeable strategies.

use crate::types::Port;
use async_trait::async_trait;
use std::fmt;
use std::net::Ipv4Addr;

/// Which reachability technique a probe uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeKind {
    Tcp,
    Udp,
    Http,
    Arp,
}

impl fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp => write!(f, "tcp"),
            Self::Udp => write!(f, "udp"),
            Self::Http => write!(f, "http"),
            Self::Arp => write!(f, "arp"),
        }
    }
}

/// A bounded-time test deciding whether a host is reachable.
///
/// Implementations never fail: any error is an inconclusive result and is
/// reported as `false`.
#[async_trait]
pub trait LivenessProbe: Send + Sync {
    /// The technique this probe implements.
    fn kind(&self) -> ProbeKind;

    /// Probe `addr`, optionally using the requested `ports`.
    async fn probe(&self, addr: Ipv4Addr, ports: &[Port]) -> bool;
}

/// A boxed probe for dynamic dispatch.
pub type BoxedProbe = Box<dyn LivenessProbe>;
