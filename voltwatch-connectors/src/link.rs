//! Link probe for hosts that are already on a network
//!
//! On a host the OS owns the network interface, so "bringing the link up"
//! means waiting until the database host accepts a TCP connection.

use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use voltwatch_core::{Link, LinkError};

/// [`Link`] that is up once `host:port` accepts a TCP connection
#[derive(Debug, Clone)]
pub struct TcpProbeLink {
    target: String,
    timeout: Duration,
    up: bool,
}

impl TcpProbeLink {
    /// Probe `target` (`host:port`) with a per-attempt connect timeout
    pub fn new(target: impl Into<String>, timeout: Duration) -> Self {
        Self {
            target: target.into(),
            timeout,
            up: false,
        }
    }

    /// Probe the host of an `http://` or `https://` URL, default port per scheme
    pub fn for_url(url: &str, timeout: Duration) -> Result<Self, LinkError> {
        let (default_port, rest) = if let Some(rest) = url.strip_prefix("https://") {
            (443, rest)
        } else if let Some(rest) = url.strip_prefix("http://") {
            (80, rest)
        } else {
            return Err(LinkError::Rejected {
                reason: "URL must start with http:// or https://",
            });
        };

        let authority = rest.split('/').next().unwrap_or_default();
        if authority.is_empty() {
            return Err(LinkError::Rejected { reason: "URL has no host" });
        }

        let target = if authority.contains(':') {
            authority.to_string()
        } else {
            format!("{}:{}", authority, default_port)
        };
        Ok(Self::new(target, timeout))
    }

    /// `host:port` being probed
    pub fn target(&self) -> &str {
        &self.target
    }

    fn resolve(&self) -> Result<Vec<SocketAddr>, LinkError> {
        let addrs: Vec<SocketAddr> = self
            .target
            .to_socket_addrs()
            .map_err(|err| {
                log::debug!("Resolving {} failed: {}", self.target, err);
                LinkError::Rejected { reason: "host did not resolve" }
            })?
            .collect();
        if addrs.is_empty() {
            return Err(LinkError::Rejected { reason: "host did not resolve" });
        }
        Ok(addrs)
    }
}

impl Link for TcpProbeLink {
    fn attempt(&mut self) -> Result<(), LinkError> {
        for addr in self.resolve()? {
            match TcpStream::connect_timeout(&addr, self.timeout) {
                Ok(_) => {
                    self.up = true;
                    return Ok(());
                }
                Err(err) => log::debug!("Connect to {} failed: {}", addr, err),
            }
        }
        self.up = false;
        Err(LinkError::Rejected { reason: "connection failed" })
    }

    fn is_up(&self) -> bool {
        self.up
    }
}
