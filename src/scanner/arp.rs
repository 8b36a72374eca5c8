//! ARP liveness probe.
//!
//! Broadcasts an ARP "who-has" for the target on every usable interface and
//! waits for an "is-at" reply from it. This works for LAN-local hosts that
//! drop all IP traffic.
//!
//! # Privileges Required
//!
//! Opening a datalink channel needs root or `CAP_NET_RAW`. Without it every
//! interface degrades to "not alive"; the probe never fails the scan.
//!
//! # How It Works
//!
//! 1. Pick every interface that is up, not loopback, and has a MAC and IPv4
//! 2. On each, concurrently open a channel and send a broadcast request
//! 3. Read frames until the ARP deadline, keeping only replies whose sender
//!    protocol address is the target
//! 4. The first match on any interface wins

use crate::error::{ScanError, ScanResult};
use crate::scanner::traits::{LivenessProbe, ProbeKind};
use crate::types::Port;
use async_trait::async_trait;
use futures::stream::{FuturesUnordered, StreamExt};
use pnet::datalink::{self, Channel, Config, DataLinkReceiver, MacAddr, NetworkInterface};
use pnet::packet::arp::{ArpHardwareTypes, ArpOperations, ArpPacket, MutableArpPacket};
use pnet::packet::ethernet::{EtherTypes, EthernetPacket, MutableEthernetPacket};
use pnet::packet::Packet;
use std::io;
use std::net::{IpAddr, Ipv4Addr};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Overall budget for one ARP probe across all interfaces.
pub const ARP_DEADLINE: Duration = Duration::from_millis(500);

/// How long a blocking read waits before the deadline is re-checked.
const READ_TIMEOUT: Duration = Duration::from_millis(50);

const ETH_HDR_LEN: usize = 14;
const ARP_LEN: usize = 28;

/// Ethernet header plus ARP payload, padded to the minimum frame size.
const FRAME_LEN: usize = 60;

/// ARP who-has probe over raw datalink channels.
pub struct ArpProbe {
    deadline: Duration,
}

impl Default for ArpProbe {
    fn default() -> Self {
        Self::new(ARP_DEADLINE)
    }
}

impl ArpProbe {
    pub fn new(deadline: Duration) -> Self {
        Self { deadline }
    }
}

#[async_trait]
impl LivenessProbe for ArpProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::Arp
    }

    async fn probe(&self, addr: Ipv4Addr, _ports: &[Port]) -> bool {
        let deadline = Instant::now() + self.deadline;

        let mut pending: FuturesUnordered<_> = candidate_interfaces()
            .into_iter()
            .map(|(iface, source)| {
                tokio::task::spawn_blocking(move || {
                    match probe_interface(&iface, source, addr, deadline) {
                        Ok(found) => found,
                        Err(e) => {
                            debug!(interface = %iface.name, target = %addr, error = %e, "arp probe degraded");
                            false
                        }
                    }
                })
            })
            .collect();

        let race = async {
            while let Some(joined) = pending.next().await {
                if matches!(joined, Ok(true)) {
                    return true;
                }
            }
            false
        };

        // Workers stop on their own at the deadline; the grace period only
        // covers a read already in progress.
        tokio::time::timeout(self.deadline + READ_TIMEOUT, race)
            .await
            .unwrap_or(false)
    }
}

/// Interfaces able to carry an ARP request, with their IPv4 source address.
fn candidate_interfaces() -> Vec<(NetworkInterface, Ipv4Addr)> {
    datalink::interfaces()
        .into_iter()
        .filter(|iface| iface.is_up() && !iface.is_loopback() && iface.mac.is_some())
        .filter_map(|iface| {
            let source = interface_ipv4(&iface)?;
            Some((iface, source))
        })
        .collect()
}

/// First non-loopback IPv4 address on an interface.
fn interface_ipv4(interface: &NetworkInterface) -> Option<Ipv4Addr> {
    interface.ips.iter().find_map(|ip| match ip.ip() {
        IpAddr::V4(addr) if !addr.is_loopback() => Some(addr),
        _ => None,
    })
}

/// Open a channel on one interface, send the request, and wait for a reply.
fn probe_interface(
    iface: &NetworkInterface,
    source: Ipv4Addr,
    target: Ipv4Addr,
    deadline: Instant,
) -> ScanResult<bool> {
    let src_mac = iface
        .mac
        .ok_or_else(|| ScanError::InterfaceNotFound(format!("{} has no MAC address", iface.name)))?;

    let config = Config {
        read_timeout: Some(READ_TIMEOUT),
        ..Default::default()
    };
    let (mut tx, rx) = open_channel(iface, config, datalink::channel)?;

    let frame = build_request(src_mac, source, target)?;
    tx.send_to(&frame, None)
        .ok_or_else(|| ScanError::RawSocket("failed to send ARP request".to_string()))?
        .map_err(|e| ScanError::RawSocket(e.to_string()))?;

    Ok(listen_for_reply(rx, target, deadline))
}

fn open_channel<F>(
    iface: &NetworkInterface,
    config: Config,
    opener: F,
) -> ScanResult<(Box<dyn datalink::DataLinkSender>, Box<dyn DataLinkReceiver>)>
where
    F: FnOnce(&NetworkInterface, Config) -> io::Result<Channel>,
{
    match opener(iface, config) {
        Ok(Channel::Ethernet(tx, rx)) => Ok((tx, rx)),
        Ok(_) => Err(ScanError::RawSocket(format!(
            "non-ethernet channel for {}",
            iface.name
        ))),
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => Err(ScanError::PermissionDenied(
            format!("opening {}: raw access requires root/CAP_NET_RAW", iface.name),
        )),
        Err(e) => Err(ScanError::RawSocket(format!("opening {}: {e}", iface.name))),
    }
}

/// Craft a broadcast ARP request asking who has `target`.
pub fn build_request(src_mac: MacAddr, source: Ipv4Addr, target: Ipv4Addr) -> ScanResult<Vec<u8>> {
    let mut buffer = vec![0u8; FRAME_LEN];

    {
        let mut eth = MutableEthernetPacket::new(&mut buffer[..ETH_HDR_LEN + ARP_LEN])
            .ok_or_else(|| ScanError::InvalidPacket("ethernet buffer too small".to_string()))?;
        eth.set_destination(MacAddr::broadcast());
        eth.set_source(src_mac);
        eth.set_ethertype(EtherTypes::Arp);
    }

    {
        let mut arp = MutableArpPacket::new(&mut buffer[ETH_HDR_LEN..ETH_HDR_LEN + ARP_LEN])
            .ok_or_else(|| ScanError::InvalidPacket("ARP buffer too small".to_string()))?;
        arp.set_hardware_type(ArpHardwareTypes::Ethernet);
        arp.set_protocol_type(EtherTypes::Ipv4);
        arp.set_hw_addr_len(6);
        arp.set_proto_addr_len(4);
        arp.set_operation(ArpOperations::Request);
        arp.set_sender_hw_addr(src_mac);
        arp.set_sender_proto_addr(source);
        arp.set_target_hw_addr(MacAddr::zero());
        arp.set_target_proto_addr(target);
    }

    Ok(buffer)
}

/// Whether `frame` is an ARP reply sent by `target`.
pub fn is_reply_from(frame: &[u8], target: Ipv4Addr) -> bool {
    let Some(eth) = EthernetPacket::new(frame) else {
        return false;
    };
    if eth.get_ethertype() != EtherTypes::Arp {
        return false;
    }
    let Some(arp) = ArpPacket::new(eth.payload()) else {
        return false;
    };
    arp.get_operation() == ArpOperations::Reply && arp.get_sender_proto_addr() == target
}

fn listen_for_reply(mut rx: Box<dyn DataLinkReceiver>, target: Ipv4Addr, deadline: Instant) -> bool {
    while Instant::now() < deadline {
        match rx.next() {
            Ok(frame) if is_reply_from(frame, target) => {
                trace!(%target, "arp reply");
                return true;
            }
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::TimedOut => {}
            Err(e) => {
                debug!(%target, error = %e, "arp capture read failed");
                return false;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use pnet::datalink::dummy;
    use std::collections::VecDeque;

    const SRC_MAC: MacAddr = MacAddr(0x02, 0x00, 0x00, 0x00, 0x00, 0x01);

    fn reply_from(sender: Ipv4Addr, operation: pnet::packet::arp::ArpOperation) -> Vec<u8> {
        let mut frame = build_request(SRC_MAC, sender, Ipv4Addr::new(192, 168, 1, 10)).unwrap();
        MutableArpPacket::new(&mut frame[ETH_HDR_LEN..ETH_HDR_LEN + ARP_LEN])
            .unwrap()
            .set_operation(operation);
        frame
    }

    struct ScriptedReceiver {
        frames: VecDeque<io::Result<Vec<u8>>>,
        current: Vec<u8>,
    }

    impl ScriptedReceiver {
        fn boxed(frames: Vec<io::Result<Vec<u8>>>) -> Box<dyn DataLinkReceiver> {
            Box::new(Self {
                frames: frames.into(),
                current: Vec::new(),
            })
        }
    }

    impl DataLinkReceiver for ScriptedReceiver {
        fn next(&mut self) -> io::Result<&[u8]> {
            match self.frames.pop_front() {
                Some(Ok(frame)) => {
                    self.current = frame;
                    Ok(&self.current)
                }
                Some(Err(e)) => Err(e),
                None => {
                    std::thread::sleep(Duration::from_millis(5));
                    Err(io::Error::new(io::ErrorKind::TimedOut, "no frames"))
                }
            }
        }
    }

    #[test]
    fn test_build_request() {
        let source = Ipv4Addr::new(192, 168, 1, 10);
        let target = Ipv4Addr::new(192, 168, 1, 1);
        let frame = build_request(SRC_MAC, source, target).unwrap();
        assert_eq!(frame.len(), FRAME_LEN);

        let eth = EthernetPacket::new(&frame).unwrap();
        assert_eq!(eth.get_destination(), MacAddr::broadcast());
        assert_eq!(eth.get_source(), SRC_MAC);
        assert_eq!(eth.get_ethertype(), EtherTypes::Arp);

        let arp = ArpPacket::new(eth.payload()).unwrap();
        assert_eq!(arp.get_operation(), ArpOperations::Request);
        assert_eq!(arp.get_hardware_type(), ArpHardwareTypes::Ethernet);
        assert_eq!(arp.get_protocol_type(), EtherTypes::Ipv4);
        assert_eq!(arp.get_sender_hw_addr(), SRC_MAC);
        assert_eq!(arp.get_sender_proto_addr(), source);
        assert_eq!(arp.get_target_hw_addr(), MacAddr::zero());
        assert_eq!(arp.get_target_proto_addr(), target);
    }

    #[test]
    fn test_reply_matching() {
        let target = Ipv4Addr::new(192, 168, 1, 50);
        assert!(is_reply_from(&reply_from(target, ArpOperations::Reply), target));
        assert!(!is_reply_from(&reply_from(target, ArpOperations::Request), target));
        assert!(!is_reply_from(
            &reply_from(Ipv4Addr::new(192, 168, 1, 51), ArpOperations::Reply),
            target
        ));
        assert!(!is_reply_from(&[0u8; 10], target));

        let mut not_arp = reply_from(target, ArpOperations::Reply);
        MutableEthernetPacket::new(&mut not_arp)
            .unwrap()
            .set_ethertype(EtherTypes::Ipv4);
        assert!(!is_reply_from(&not_arp, target));
    }

    #[test]
    fn test_listen_finds_reply_after_noise() {
        let target = Ipv4Addr::new(10, 1, 1, 1);
        let rx = ScriptedReceiver::boxed(vec![
            Ok(reply_from(Ipv4Addr::new(10, 1, 1, 2), ArpOperations::Reply)),
            Err(io::Error::new(io::ErrorKind::TimedOut, "idle")),
            Ok(reply_from(target, ArpOperations::Reply)),
        ]);
        assert!(listen_for_reply(rx, target, Instant::now() + Duration::from_secs(1)));
    }

    #[test]
    fn test_listen_gives_up_at_deadline() {
        let target = Ipv4Addr::new(10, 1, 1, 1);
        let rx = ScriptedReceiver::boxed(Vec::new());
        let start = Instant::now();
        assert!(!listen_for_reply(rx, target, start + Duration::from_millis(60)));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_listen_stops_on_read_error() {
        let target = Ipv4Addr::new(10, 1, 1, 1);
        let rx = ScriptedReceiver::boxed(vec![
            Err(io::Error::new(io::ErrorKind::Other, "device gone")),
            Ok(reply_from(target, ArpOperations::Reply)),
        ]);
        assert!(!listen_for_reply(rx, target, Instant::now() + Duration::from_secs(1)));
    }

    #[test]
    fn test_open_channel_maps_permission_error() {
        let iface = dummy::dummy_interface(0);
        let result = open_channel(&iface, Config::default(), |_, _| {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        });
        assert!(matches!(result, Err(ScanError::PermissionDenied(_))));
    }

    #[test]
    fn test_open_channel_accepts_ethernet() {
        let iface = dummy::dummy_interface(0);
        let result = open_channel(&iface, Config::default(), |i, _| {
            dummy::channel(i, dummy::Config::default())
        });
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_probe_without_privileges_is_bounded() {
        // Whatever the environment allows, the probe must settle within its
        // deadline plus the read grace period.
        let probe = ArpProbe::new(Duration::from_millis(100));
        let start = Instant::now();
        let _ = probe.probe(Ipv4Addr::new(203, 0, 113, 1), &[]).await;
        assert!(start.elapsed() < Duration::from_secs(2));
    }
}
