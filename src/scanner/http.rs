//! HTTP liveness probe.
//!
//! One `HEAD` request to the host's default web port. Redirects are
//! followed and any final 2xx or 3xx status counts as alive.

use crate::scanner::traits::{LivenessProbe, ProbeKind};
use crate::scanner::PROBE_TIMEOUT;
use crate::types::Port;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::net::Ipv4Addr;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Port used when the probe builds `http://<ip>/`.
pub const DEFAULT_WEB_PORT: u16 = 80;

/// HTTP `HEAD` probe.
pub struct HttpProbe {
    client: Option<reqwest::Client>,
    port: u16,
}

impl Default for HttpProbe {
    fn default() -> Self {
        Self::new(PROBE_TIMEOUT)
    }
}

impl HttpProbe {
    /// Create a probe whose whole request is bounded by `timeout`.
    ///
    /// A client that cannot be built leaves the probe permanently
    /// inconclusive.
    pub fn new(timeout: Duration) -> Self {
        let client = match reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("hostsweep/", env!("CARGO_PKG_VERSION")))
            .build()
        {
            Ok(client) => Some(client),
            Err(e) => {
                warn!(error = %e, "failed to build HTTP client, http probe disabled");
                None
            }
        };
        Self {
            client,
            port: DEFAULT_WEB_PORT,
        }
    }

    /// Probe a different port.
    #[cfg(test)]
    pub(crate) fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    fn url(&self, addr: Ipv4Addr) -> String {
        if self.port == DEFAULT_WEB_PORT {
            format!("http://{addr}")
        } else {
            format!("http://{addr}:{}", self.port)
        }
    }
}

/// Whether a final status shows a responsive web server.
pub fn is_alive_status(status: StatusCode) -> bool {
    status.is_success() || status.is_redirection()
}

#[async_trait]
impl LivenessProbe for HttpProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::Http
    }

    async fn probe(&self, addr: Ipv4Addr, _ports: &[Port]) -> bool {
        let Some(client) = &self.client else {
            return false;
        };

        let url = self.url(addr);
        match client.head(&url).send().await {
            Ok(resp) => {
                trace!(%url, status = %resp.status(), "http probe answered");
                is_alive_status(resp.status())
            }
            Err(e) => {
                debug!(%url, error = %e, "http probe failed");
                false
            }
        }
    }
}
