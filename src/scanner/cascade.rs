//! Ordered liveness cascade.
//!
//! Probes run strictly in list order and the fold stops at the first one
//! that reports the host alive.

use crate::scanner::arp::ArpProbe;
use crate::scanner::http::HttpProbe;
use crate::scanner::tcp::TcpProbe;
use crate::scanner::traits::{BoxedProbe, LivenessProbe, ProbeKind};
use crate::scanner::udp::UdpProbe;
use crate::types::Port;
use std::net::Ipv4Addr;
use tracing::debug;

/// A short-circuiting OR over liveness probes.
pub struct ProbeCascade {
    probes: Vec<BoxedProbe>,
}

impl Default for ProbeCascade {
    /// TCP, then UDP, then HTTP, then ARP.
    fn default() -> Self {
        Self::new(vec![
            Box::new(TcpProbe::default()),
            Box::new(UdpProbe::default()),
            Box::new(HttpProbe::default()),
            Box::new(ArpProbe::default()),
        ])
    }
}

impl ProbeCascade {
    pub fn new(probes: Vec<BoxedProbe>) -> Self {
        Self { probes }
    }

    /// Probe kinds in the order they run.
    pub fn order(&self) -> Vec<ProbeKind> {
        self.probes.iter().map(|p| p.kind()).collect()
    }

    /// Run the probes in order until one reports the host alive.
    pub async fn is_alive(&self, addr: Ipv4Addr, ports: &[Port]) -> bool {
        for probe in &self.probes {
            if probe.probe(addr, ports).await {
                debug!(%addr, probe = %probe.kind(), "host alive");
                return true;
            }
        }
        false
    }
}
