//! Network endpoint for a FreeD transport

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

use crate::{FreedError, Result};

/// Address + port a receiver listens on.
///
/// Unicast addresses are bound directly. Multicast group addresses are joined
/// after binding the wildcard address on the same port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Endpoint(SocketAddr);

impl Endpoint {
    /// Creates a new endpoint from an IP address and port.
    pub const fn new(addr: IpAddr, port: u16) -> Self {
        Self(SocketAddr::new(addr, port))
    }

    /// Creates a loopback endpoint on the given port.
    pub const fn localhost(port: u16) -> Self {
        Self::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port)
    }

    pub const fn ip(&self) -> IpAddr {
        self.0.ip()
    }

    pub const fn port(&self) -> u16 {
        self.0.port()
    }

    /// Returns the underlying [`SocketAddr`].
    pub const fn as_socket_addr(&self) -> SocketAddr {
        self.0
    }

    /// Whether the address is a multicast group.
    pub fn is_multicast(&self) -> bool {
        self.0.ip().is_multicast()
    }
}

impl From<SocketAddr> for Endpoint {
    fn from(addr: SocketAddr) -> Self {
        Self(addr)
    }
}

impl From<Endpoint> for SocketAddr {
    fn from(endpoint: Endpoint) -> Self {
        endpoint.0
    }
}

impl FromStr for Endpoint {
    type Err = FreedError;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<SocketAddr>()
            .map(Self)
            .map_err(|e| FreedError::config_error(format!("invalid endpoint '{}': {}", s, e)))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
