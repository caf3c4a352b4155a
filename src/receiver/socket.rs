//! UDP socket setup for the receive thread
//!
//! Unicast endpoints are bound directly. Multicast endpoints bind the wildcard
//! address on the endpoint's port and join the group. On unix the socket is
//! created through rustix so `SO_REUSEADDR` and `SO_RCVBUF` can be applied
//! before `bind`.

use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};

use tracing::debug;

use crate::config::ReceiverConfig;
use crate::types::Endpoint;

/// Open a non-blocking datagram socket for `endpoint`.
#[cfg(unix)]
pub(crate) fn open(endpoint: &Endpoint, config: &ReceiverConfig) -> io::Result<UdpSocket> {
    use rustix::net::{AddressFamily, SocketType, sockopt};

    let family = if endpoint.ip().is_ipv4() { AddressFamily::INET } else { AddressFamily::INET6 };
    let fd = rustix::net::socket(family, SocketType::DGRAM, None)?;

    if sockopt::socket_type(&fd)? != SocketType::DGRAM {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "socket is not datagram-capable"));
    }

    if config.reuse_address {
        sockopt::set_socket_reuseaddr(&fd, true)?;
    }
    sockopt::set_socket_recv_buffer_size(&fd, config.recv_buffer_size)?;

    let bind_addr = bind_address(endpoint);
    rustix::net::bind(&fd, &bind_addr)?;
    debug!(
        %bind_addr,
        recv_buffer = sockopt::socket_recv_buffer_size(&fd).unwrap_or(0),
        "Bound FreeD socket"
    );

    let socket = UdpSocket::from(fd);
    join_multicast(&socket, endpoint, config)?;
    socket.set_nonblocking(true)?;
    Ok(socket)
}

/// Open a non-blocking datagram socket for `endpoint`.
#[cfg(not(unix))]
pub(crate) fn open(endpoint: &Endpoint, config: &ReceiverConfig) -> io::Result<UdpSocket> {
    tracing::warn!("SO_REUSEADDR and SO_RCVBUF are not applied on this platform");

    let bind_addr = bind_address(endpoint);
    let socket = UdpSocket::bind(bind_addr)?;
    debug!(%bind_addr, "Bound FreeD socket");

    join_multicast(&socket, endpoint, config)?;
    socket.set_nonblocking(true)?;
    Ok(socket)
}

fn bind_address(endpoint: &Endpoint) -> SocketAddr {
    match endpoint.ip() {
        IpAddr::V4(group) if group.is_multicast() => {
            SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), endpoint.port())
        }
        IpAddr::V6(group) if group.is_multicast() => {
            SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), endpoint.port())
        }
        _ => endpoint.as_socket_addr(),
    }
}

fn join_multicast(
    socket: &UdpSocket,
    endpoint: &Endpoint,
    config: &ReceiverConfig,
) -> io::Result<()> {
    match endpoint.ip() {
        IpAddr::V4(group) if group.is_multicast() => {
            socket.join_multicast_v4(&group, &Ipv4Addr::UNSPECIFIED)?;
            socket.set_multicast_loop_v4(config.multicast_loopback)?;
            socket.set_multicast_ttl_v4(config.multicast_ttl)?;
            debug!(%group, ttl = config.multicast_ttl, "Joined multicast group");
        }
        IpAddr::V6(group) if group.is_multicast() => {
            socket.join_multicast_v6(&group, 0)?;
            socket.set_multicast_loop_v6(config.multicast_loopback)?;
            debug!(%group, "Joined multicast group");
        }
        _ => {}
    }
    Ok(())
}
