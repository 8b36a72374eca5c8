//! Banner grabbing and service identification for TCP ports.
//!
//! Connects to a port, performs a single bounded read of whatever the
//! service sends first, and classifies it with [`ServiceLabel::from_banner`].

use crate::services::ServiceLabel;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, trace};

/// Maximum bytes to read for a banner.
pub const MAX_BANNER_SIZE: usize = 1024;

/// Default timeout for both the connect and the banner read.
pub const BANNER_TIMEOUT: Duration = Duration::from_secs(2);

/// Identifies services by their connection banner.
#[derive(Debug, Clone)]
pub struct ServiceIdentifier {
    connect_timeout: Duration,
    read_timeout: Duration,
}

impl Default for ServiceIdentifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceIdentifier {
    pub fn new() -> Self {
        Self {
            connect_timeout: BANNER_TIMEOUT,
            read_timeout: BANNER_TIMEOUT,
        }
    }

    /// Override both timeouts.
    pub fn with_timeouts(mut self, connect: Duration, read: Duration) -> Self {
        self.connect_timeout = connect;
        self.read_timeout = read;
        self
    }

    /// Identify the service listening on `addr`.
    ///
    /// Returns `None` when the port cannot be connected to. An open port
    /// that stays silent, errors, or sends an unrecognised banner yields
    /// `Some(ServiceLabel::Unknown)`.
    pub async fn identify(&self, addr: SocketAddr) -> Option<ServiceLabel> {
        let stream = match timeout(self.connect_timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                debug!(%addr, error = %e, "connect failed");
                return None;
            }
            Err(_) => {
                debug!(%addr, "connect timed out");
                return None;
            }
        };

        let label = match self.read_banner(stream).await {
            Some(banner) => {
                trace!(%addr, banner = %banner.trim_end(), "banner");
                ServiceLabel::from_banner(&banner)
            }
            None => ServiceLabel::Unknown,
        };
        Some(label)
    }

    /// One bounded read. The stream is dropped (closed) on return.
    async fn read_banner(&self, mut stream: TcpStream) -> Option<String> {
        let mut buffer = [0u8; MAX_BANNER_SIZE];
        match timeout(self.read_timeout, stream.read(&mut buffer)).await {
            Ok(Ok(n)) if n > 0 => Some(String::from_utf8_lossy(&buffer[..n]).into_owned()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    fn quick() -> ServiceIdentifier {
        ServiceIdentifier::new().with_timeouts(Duration::from_millis(500), Duration::from_millis(200))
    }

    async fn serve_banner(banner: &'static [u8]) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let _ = socket.write_all(banner).await;
                tokio::time::sleep(Duration::from_millis(300)).await;
            }
        });
        addr
    }

    #[tokio::test]
    async fn test_identifies_ssh() {
        let addr = serve_banner(b"SSH-2.0-OpenSSH_9.6\r\n").await;
        assert_eq!(quick().identify(addr).await, Some(ServiceLabel::SshServer));
    }

    #[tokio::test]
    async fn test_identifies_smtp() {
        let addr = serve_banner(b"220 mail.example.com ESMTP\r\n").await;
        assert_eq!(quick().identify(addr).await, Some(ServiceLabel::MailServer));
    }

    #[tokio::test]
    async fn test_silent_port_is_unknown() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(2)).await;
        });
        assert_eq!(quick().identify(addr).await, Some(ServiceLabel::Unknown));
    }

    #[tokio::test]
    async fn test_closed_port_is_skipped() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        assert_eq!(quick().identify(addr).await, None);
    }
}
