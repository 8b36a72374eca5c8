//! TCP connect liveness probe.
//!
//! Tries a full handshake on each requested port in turn; the first
//! successful connect proves the host is up.

use crate::scanner::traits::{LivenessProbe, ProbeKind};
use crate::scanner::PROBE_TIMEOUT;
use crate::types::Port;
use async_trait::async_trait;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, trace};

/// TCP connect probe. Does not require elevated privileges.
pub struct TcpProbe {
    timeout: Duration,
}

impl Default for TcpProbe {
    fn default() -> Self {
        Self::new(PROBE_TIMEOUT)
    }
}

impl TcpProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn connects(&self, addr: SocketAddr) -> bool {
        match timeout(self.timeout, TcpStream::connect(addr)).await {
            Ok(Ok(_stream)) => true,
            Ok(Err(e)) => {
                debug!(%addr, error = %e, "tcp probe refused");
                false
            }
            Err(_) => {
                debug!(%addr, "tcp probe timed out");
                false
            }
        }
    }
}

#[async_trait]
impl LivenessProbe for TcpProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::Tcp
    }

    async fn probe(&self, addr: Ipv4Addr, ports: &[Port]) -> bool {
        for port in ports {
            let target = SocketAddr::new(addr.into(), port.as_u16());
            if self.connects(target).await {
                trace!(%target, "tcp probe connected");
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_open_port_is_alive() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let open = Port::new(listener.local_addr().unwrap().port()).unwrap();

        let probe = TcpProbe::new(Duration::from_millis(500));
        assert!(probe.probe(Ipv4Addr::LOCALHOST, &[open]).await);
    }

    #[tokio::test]
    async fn test_later_port_counts() {
        let closed = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let closed_port = Port::new(closed.local_addr().unwrap().port()).unwrap();
        drop(closed);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let open = Port::new(listener.local_addr().unwrap().port()).unwrap();

        let probe = TcpProbe::new(Duration::from_millis(500));
        assert!(probe.probe(Ipv4Addr::LOCALHOST, &[closed_port, open]).await);
    }

    #[tokio::test]
    async fn test_no_ports_is_not_alive() {
        let probe = TcpProbe::default();
        assert!(!probe.probe(Ipv4Addr::LOCALHOST, &[]).await);
        assert_eq!(probe.kind(), ProbeKind::Tcp);
    }
}
