// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use socket2::{Domain, Socket, Type};
use tokio::net::TcpListener;

use super::errors::TunnelError;

const PORT_WALK_ATTEMPTS: u16 = 10;

/// Binds a local TCP listener for a forwarded port, walking nearby ports on
/// conflict and falling back to an OS-assigned port (C3). `requested_local_ip`
/// overrides whatever address the SSH side asked for.
pub(crate) async fn create_retry_listener(
    desired_port: u16,
    can_change_port: bool,
    requested_local_ip: Option<IpAddr>,
) -> Result<TcpListener, TunnelError> {
    let ip = requested_local_ip.unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));

    for attempt in 0..PORT_WALK_ATTEMPTS {
        let port = desired_port.wrapping_add(attempt);
        match bind(SocketAddr::new(ip, port)) {
            Ok(listener) => return Ok(listener),
            Err(e) if can_change_port && is_port_conflict(&e) => {
                log::debug!(
                    "listener bind on {}:{} failed ({}), trying next port",
                    ip,
                    port,
                    e
                );
            }
            Err(e) if !can_change_port && is_port_conflict(&e) => {
                return Err(TunnelError::ProtocolError(format!(
                    "port {port} is in use and cannot be changed: {e}"
                )));
            }
            Err(e) => {
                return Err(TunnelError::ProtocolError(format!(
                    "failed to bind local listener on {ip}:{port}: {e}"
                )))
            }
        }
    }

    log::debug!(
        "all {} candidate ports near {} were unavailable, falling back to an OS-assigned port",
        PORT_WALK_ATTEMPTS,
        desired_port
    );
    bind(SocketAddr::new(ip, 0)).map_err(|e| {
        TunnelError::ProtocolError(format!("failed to bind fallback local listener: {e}"))
    })
}

fn is_port_conflict(e: &std::io::Error) -> bool {
    matches!(
        e.kind(),
        std::io::ErrorKind::AddrInUse | std::io::ErrorKind::PermissionDenied
    )
}

/// Binds synchronously with `SO_REUSEADDR` explicitly disabled, then hands
/// the socket to tokio. The standard library's `TcpListener::bind` leaves
/// platform reuse-address defaults in place, which on some platforms would
/// let a stale listener mask a genuine conflict.
fn bind(addr: SocketAddr) -> std::io::Result<TcpListener> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };
    let socket = Socket::new(domain, Type::STREAM, None)?;
    socket.set_reuse_address(false)?;
    socket.bind(&addr.into())?;
    socket.listen(128)?;
    socket.set_nonblocking(true)?;
    TcpListener::from_std(socket.into())
}

#[cfg(test)]
mod test {
    use super::create_retry_listener;

    #[tokio::test]
    async fn binds_desired_port_when_free() {
        let listener = create_retry_listener(0, true, None)
            .await
            .expect("expected bind");
        assert!(listener.local_addr().unwrap().port() > 0);
    }

    #[tokio::test]
    async fn walks_to_next_port_on_conflict() {
        let first = create_retry_listener(0, true, None).await.expect("bind");
        let port = first.local_addr().unwrap().port();

        let second = create_retry_listener(port, true, None)
            .await
            .expect("expected walk to succeed");
        assert_ne!(second.local_addr().unwrap().port(), 0);
    }

    #[tokio::test]
    async fn rejects_conflict_when_cannot_change_port() {
        let first = create_retry_listener(0, true, None).await.expect("bind");
        let port = first.local_addr().unwrap().port();

        let err = create_retry_listener(port, false, None)
            .await
            .expect_err("expected conflict to be fatal");
        assert!(matches!(err, super::TunnelError::ProtocolError(_)));
    }
}
