//! UDP liveness probe.
//!
//! Sends a minimal DNS query to each requested port. Any reply proves the
//! host is up, and so does an ICMP port-unreachable surfaced by the OS as
//! "connection refused": only a live host answers with one.
//!
//! # Detection Methods
//!
//! 1. **Datagram received**: alive
//! 2. **Connection refused**: alive (ICMP port unreachable)
//! 3. **Timeout or other error**: inconclusive, next port

use crate::error::{ScanError, ScanResult};
use crate::scanner::traits::{LivenessProbe, ProbeKind};
use crate::scanner::PROBE_TIMEOUT;
use crate::types::Port;
use async_trait::async_trait;
use pnet::packet::dns::{DnsClass, DnsTypes, MutableDnsPacket, Opcode, Retcode};
use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::timeout;
use tracing::{debug, trace};

const DNS_HDR_LEN: usize = 12;

/// Root name (`.`), QTYPE and QCLASS.
const QUESTION_LEN: usize = 1 + 2 + 2;

/// UDP probe using a DNS query as payload.
pub struct UdpProbe {
    timeout: Duration,
}

impl Default for UdpProbe {
    fn default() -> Self {
        Self::new(PROBE_TIMEOUT)
    }
}

impl UdpProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Exchange one datagram with `addr`.
    async fn exchange(&self, addr: SocketAddr) -> ScanResult<bool> {
        let socket = UdpSocket::bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))).await?;
        socket.connect(addr).await?;
        socket.send(&dns_query(rand::random())?).await?;

        let mut buf = [0u8; 1024];
        match timeout(self.timeout, socket.recv(&mut buf)).await {
            Ok(Ok(_)) => Ok(true),
            Ok(Err(e)) if e.kind() == io::ErrorKind::ConnectionRefused => Ok(true),
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Ok(false),
        }
    }
}

#[async_trait]
impl LivenessProbe for UdpProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::Udp
    }

    async fn probe(&self, addr: Ipv4Addr, ports: &[Port]) -> bool {
        for port in ports {
            let target = SocketAddr::new(addr.into(), port.as_u16());
            match self.exchange(target).await {
                Ok(true) => {
                    trace!(%target, "udp probe answered");
                    return true;
                }
                Ok(false) => debug!(%target, "udp probe timed out"),
                Err(e) => debug!(%target, error = %e, "udp probe failed"),
            }
        }
        false
    }
}

/// Build a recursive `A` query for the root name.
pub fn dns_query(id: u16) -> ScanResult<Vec<u8>> {
    let mut buffer = vec![0u8; DNS_HDR_LEN + QUESTION_LEN];

    {
        let mut dns = MutableDnsPacket::new(&mut buffer)
            .ok_or_else(|| ScanError::InvalidPacket("DNS buffer too small".to_string()))?;
        dns.set_id(id);
        dns.set_is_response(0);
        dns.set_opcode(Opcode::StandardQuery);
        dns.set_is_authoriative(0);
        dns.set_is_truncated(0);
        dns.set_is_recursion_desirable(1);
        dns.set_is_recursion_available(0);
        dns.set_zero_reserved(0);
        dns.set_is_non_authenticated_data(0);
        dns.set_rcode(Retcode::NoError);
        dns.set_query_count(1);
        dns.set_response_count(0);
        dns.set_authority_rr_count(0);
        dns.set_additional_rr_count(0);
    }

    // Root label is a single zero byte, already in place.
    let mut cursor = DNS_HDR_LEN + 1;
    buffer[cursor..cursor + 2].copy_from_slice(&DnsTypes::A.0.to_be_bytes());
    cursor += 2;
    buffer[cursor..cursor + 2].copy_from_slice(&DnsClass(1).0.to_be_bytes());

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dns_query_layout() {
        let query = dns_query(0xBEEF).unwrap();
        assert_eq!(query.len(), 17);
        assert_eq!(&query[..2], &[0xBE, 0xEF]);
        // RD bit set, everything else in the flags clear.
        assert_eq!(&query[2..4], &[0x01, 0x00]);
        // QDCOUNT = 1, other counts zero.
        assert_eq!(&query[4..12], &[0, 1, 0, 0, 0, 0, 0, 0]);
        assert_eq!(&query[12..], &[0, 0, 1, 0, 1]);
    }

    #[tokio::test]
    async fn test_responding_port_is_alive() {
        let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = Port::new(server.local_addr().unwrap().port()).unwrap();
        tokio::spawn(async move {
            let mut buf = [0u8; 512];
            if let Ok((n, peer)) = server.recv_from(&mut buf).await {
                let _ = server.send_to(&buf[..n], peer).await;
            }
        });

        let probe = UdpProbe::new(Duration::from_millis(500));
        assert!(probe.probe(Ipv4Addr::LOCALHOST, &[port]).await);
    }

    #[tokio::test]
    async fn test_refused_port_is_alive() {
        // Nothing listens here once the socket is dropped; loopback answers
        // with ICMP port unreachable.
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = Port::new(socket.local_addr().unwrap().port()).unwrap();
        drop(socket);

        let probe = UdpProbe::new(Duration::from_millis(500));
        assert!(probe.probe(Ipv4Addr::LOCALHOST, &[port]).await);
    }

    #[tokio::test]
    async fn test_silent_port_is_inconclusive() {
        let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = Port::new(server.local_addr().unwrap().port()).unwrap();

        let probe = UdpProbe::new(Duration::from_millis(100));
        assert!(!probe.probe(Ipv4Addr::LOCALHOST, &[port]).await);
        drop(server);
    }

    #[tokio::test]
    async fn test_silent_port_moves_on_to_next() {
        let silent = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let silent_port = Port::new(silent.local_addr().unwrap().port()).unwrap();
        let closed = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let closed_port = Port::new(closed.local_addr().unwrap().port()).unwrap();
        drop(closed);

        let probe = UdpProbe::new(Duration::from_millis(100));
        assert!(probe.probe(Ipv4Addr::LOCALHOST, &[silent_port, closed_port]).await);
        drop(silent);
    }
}
