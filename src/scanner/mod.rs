//! Scanner module - sweeps an address range under one deadline.
//!
//! Each address is gated by the liveness cascade; every live host gets its
//! own tokio task that identifies services on the requested ports. Results
//! flow back over a channel to a single collector, so nothing is shared
//! between tasks and a late cancellation never retracts a result.

pub mod arp;
pub mod cascade;
pub mod http;
pub mod limiter;
pub mod tcp;
pub mod traits;
pub mod udp;

use crate::banner::ServiceIdentifier;
use crate::services::ServiceLabel;
use crate::types::{Port, ScanRequest};
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};

pub use arp::ArpProbe;
pub use cascade::ProbeCascade;
pub use http::HttpProbe;
pub use limiter::TaskLimiter;
pub use tcp::TcpProbe;
pub use traits::{BoxedProbe, LivenessProbe, ProbeKind};
pub use udp::UdpProbe;

/// Per-operation timeout shared by the TCP, UDP and HTTP probes.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Deadline used when the requested timeout does not fit in an [`Instant`].
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// One identified service on one host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HostService {
    pub ip: Ipv4Addr,
    pub port: Port,
    pub service: ServiceLabel,
}

/// Sweeps a range of addresses and collects identified services.
pub struct RangeScanner {
    cascade: Arc<ProbeCascade>,
    identifier: Arc<ServiceIdentifier>,
    limiter: TaskLimiter,
}

impl Default for RangeScanner {
    fn default() -> Self {
        Self::new(ProbeCascade::default(), ServiceIdentifier::new())
    }
}

impl RangeScanner {
    pub fn new(cascade: ProbeCascade, identifier: ServiceIdentifier) -> Self {
        Self {
            cascade: Arc::new(cascade),
            identifier: Arc::new(identifier),
            limiter: TaskLimiter::unbounded(),
        }
    }

    /// Cap the number of per-host tasks in flight.
    pub fn with_limiter(mut self, limiter: TaskLimiter) -> Self {
        self.limiter = limiter;
        self
    }

    /// Run one sweep.
    ///
    /// Returns whatever was identified before the request's deadline. The
    /// order of the returned entries carries no meaning.
    pub async fn run(&self, request: &ScanRequest) -> Vec<HostService> {
        let now = Instant::now();
        let deadline = now
            .checked_add(request.timeout())
            .unwrap_or_else(|| now + FAR_FUTURE);
        let ports: Arc<[Port]> = request.ports().into();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut tasks = JoinSet::new();

        info!(
            range = %request.range(),
            hosts = request.range().len(),
            ports = ports.len(),
            timeout_secs = request.timeout().as_secs(),
            "starting sweep"
        );

        for addr in request.range().iter() {
            if Instant::now() >= deadline {
                warn!(%addr, "scan deadline reached, no further hosts started");
                break;
            }

            let alive = match timeout_at(deadline, self.cascade.is_alive(addr, &ports)).await {
                Ok(alive) => alive,
                Err(_) => {
                    warn!(%addr, "scan deadline reached during liveness check");
                    break;
                }
            };
            if !alive {
                continue;
            }

            let host_scan = scan_host(
                addr,
                Arc::clone(&ports),
                Arc::clone(&self.identifier),
                tx.clone(),
            );
            if timeout_at(deadline, self.limiter.submit(&mut tasks, host_scan))
                .await
                .is_err()
            {
                warn!(%addr, "scan deadline reached waiting for a task slot");
                break;
            }
        }

        // Only task-held senders remain, so the channel closes once every
        // host scan has finished.
        drop(tx);

        let mut results = Vec::new();
        loop {
            match timeout_at(deadline, rx.recv()).await {
                Ok(Some(found)) => results.push(found),
                Ok(None) => break,
                Err(_) => {
                    warn!(pending = tasks.len(), "scan deadline reached, returning partial results");
                    while let Ok(found) = rx.try_recv() {
                        results.push(found);
                    }
                    break;
                }
            }
        }
        tasks.abort_all();

        info!(found = results.len(), "sweep finished");
        results
    }
}

/// Identify services on every requested port of one live host.
async fn scan_host(
    addr: Ipv4Addr,
    ports: Arc<[Port]>,
    identifier: Arc<ServiceIdentifier>,
    results: mpsc::UnboundedSender<HostService>,
) {
    for &port in ports.iter() {
        let target = SocketAddr::new(addr.into(), port.as_u16());
        match identifier.identify(target).await {
            Some(service) if service.is_identified() => {
                if results.send(HostService { ip: addr, port, service }).is_err() {
                    // Collector is gone; the sweep is over.
                    return;
                }
            }
            Some(_) => debug!(%target, "open port with unrecognised banner"),
            None => {}
        }
    }
}
