//! C5 — DNS Listener: binds UDP and TCP on the configured port and runs
//! `hickory-server`'s accept loop against a [`DnsHandler`].
//!
//! Grounded directly on `cli/server/dns.rs`: `socket2` for buffer tuning
//! before handing the socket to tokio, `hickory_server::ServerFuture`
//! for the accept loop, a bounded TCP idle timeout. No teacher file in
//! the retrieved pack implements the handler itself (`DnsServerHandler`
//! is referenced from `cli/server/dns.rs` but its source wasn't part of
//! the pack), so [`DnsHandler`] is built straight from `hickory-server`'s
//! public `RequestHandler` trait contract instead.

use crate::dns::handler::DnsHandler;
use dnshield_domain::DnshieldError;
use hickory_server::ServerFuture;
use socket2::{Domain, Protocol, Socket, Type};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, UdpSocket};
use tracing::info;

const UDP_RECV_BUFFER: usize = 8 * 1024 * 1024;
const UDP_SEND_BUFFER: usize = 4 * 1024 * 1024;
const TCP_IDLE_TIMEOUT: Duration = Duration::from_secs(10);

/// Binds `bind_address` for both UDP and TCP and runs until the process
/// is signalled to stop (the caller races this future against shutdown).
pub async fn run(bind_address: SocketAddr, handler: DnsHandler) -> Result<(), DnshieldError> {
    let udp_socket = bind_tuned_udp(bind_address)?;
    let tcp_listener = bind_tcp(bind_address).await?;

    let mut server = ServerFuture::new(handler);
    server.register_socket(udp_socket);
    server.register_listener(tcp_listener, TCP_IDLE_TIMEOUT);

    info!(%bind_address, "DNS listener bound (udp+tcp)");
    server
        .block_until_done()
        .await
        .map_err(|e| DnshieldError::BindFailure { addr: bind_address.to_string(), source: std::io::Error::other(e) })
}

fn bind_tuned_udp(addr: SocketAddr) -> Result<UdpSocket, DnshieldError> {
    let domain = if addr.is_ipv4() { Domain::IPV4 } else { Domain::IPV6 };
    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP)).map_err(DnshieldError::Io)?;
    socket.set_recv_buffer_size(UDP_RECV_BUFFER).map_err(DnshieldError::Io)?;
    socket.set_send_buffer_size(UDP_SEND_BUFFER).map_err(DnshieldError::Io)?;
    socket.set_reuse_address(true).map_err(DnshieldError::Io)?;
    socket.set_nonblocking(true).map_err(DnshieldError::Io)?;
    socket
        .bind(&addr.into())
        .map_err(|e| DnshieldError::BindFailure { addr: addr.to_string(), source: e })?;
    UdpSocket::from_std(socket.into()).map_err(DnshieldError::Io)
}

async fn bind_tcp(addr: SocketAddr) -> Result<TcpListener, DnshieldError> {
    TcpListener::bind(addr)
        .await
        .map_err(|e| DnshieldError::BindFailure { addr: addr.to_string(), source: e })
}
