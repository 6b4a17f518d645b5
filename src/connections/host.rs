// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use std::{collections::HashMap, io, pin::Pin, sync::Arc, task::Poll, time::Duration};

use crate::{
    contracts::{TunnelConnectionMode, TunnelEndpoint, TunnelPort, TunnelRelayTunnelEndpoint},
    management::{
        Authorization, HttpError, TunnelLocator, TunnelManagementClient, TunnelRequestOptions,
        NO_REQUEST_OPTIONS,
    },
};
use futures::FutureExt;
use russh::{server::Server as ServerTrait, CryptoVec};
use tokio::{
    io::{AsyncRead, AsyncWrite},
    sync::{mpsc, oneshot, watch},
    task::JoinHandle,
};
use uuid::Uuid;

use super::{
    connection::{ConnectionStatus, TunnelConnectionBase},
    connector::{connect_session, NoopRetryObserver},
    errors::TunnelError,
    forwarder::{forward, spawn_channel_io, ForwardChannel},
    port_forward_messages,
    relay_connection::{
        protocol_from_subprotocol, protocol_version_override, subprotocols_for, ConnectionProtocol,
        ConnectionRole, TunnelRelayConnectionOptions,
    },
    relay_stream::connect_relay_stream,
    secure_stream::SecureStream,
    ws::AsyncRWWebSocket,
};

type PortMap = HashMap<u32, mpsc::UnboundedSender<ForwardedPortConnection>>;

/// Hosts a tunnel's ports through the relay (C10). Generalizes the original
/// single-protocol prototype into the full client/host wire contract:
///
/// ## v1
///
/// The host is a single SSH *client* of the relay. Every connecting remote
/// client gets its own `client-ssh-session-stream` channel on that session,
/// inside of which the host runs a *nested* SSH server handshake (so the host
/// is the SSH server from the remote client's point of view, which is what
/// lets a client verify the host's key). The nested server issues
/// `tcpip-forward` for each port, and the client answers with
/// `forwarded-tcpip` channels per incoming TCP connection.
///
/// ```text
///        ┌───────────┐     ┌───────┐      ┌───────┐
///        │Host (this)│     │Service│      │Client │
///        └─────┬─────┘     └───┬───┘      └───┬───┘
///              │ Connect as    │              │
///              ├─SSH client────▶              │
///              │               │  Connect to  │
///              │               ◀──service ws──┤
///              │   Create new  │              │
///              ◀───SSH tunnel──┤              │
///              │               │              │
///              │    SSH server handshake.     │
///              ├────(Service just proxies ────▶
///              │      traffic through)        │
///              │               │              │
///              ├────tcpip-forward for ports───▶
///              │               │              │
///              │               │              ◀───asked to
///              │               │              │   connect
///              ◀────create forwarded-tcpip ───┤
///      make    │            channel           │
/// local tcp ◀──┤               │              │
/// connection   │               │              │
///              ◀ ─ ─ ─ ─forward traffic─ ─ ─ ─▶
///              ▼               ▼              ▼
/// ```
///
/// ## v2
///
/// There is no nested handshake: the host's single SSH client session issues
/// `tcpip-forward` directly, and the relay opens `forwarded-tcpip` channels on
/// that same session per incoming connection. Key exchange is the `none`
/// method, because the relay's TLS already secures the outer transport; the
/// only remaining function of the SSH layer is multiplexing.
pub struct Host {
    locator: TunnelLocator,
    host_id: Uuid,
    ports_tx: watch::Sender<PortMap>,
    ports_rx: watch::Receiver<PortMap>,
    mgmt: TunnelManagementClient,
    host_keypair: russh_keys::key::KeyPair,
    conn: Arc<TunnelConnectionBase>,
    options: TunnelRelayConnectionOptions,
}

#[allow(dead_code)]
impl Host {
    pub fn new(locator: TunnelLocator, mgmt: TunnelManagementClient) -> Self {
        Self::with_options(locator, mgmt, TunnelRelayConnectionOptions::default())
    }

    pub fn with_options(
        locator: TunnelLocator,
        mgmt: TunnelManagementClient,
        options: TunnelRelayConnectionOptions,
    ) -> Self {
        Self::with_host_id(locator, mgmt, options, Uuid::new_v4())
    }

    /// Like [`Host::with_options`], but lets the caller pin the host id
    /// instead of generating a fresh one. `MultiModeTunnelHost` uses this to
    /// give every wrapped `Host` the same process-wide id.
    pub fn with_host_id(
        locator: TunnelLocator,
        mgmt: TunnelManagementClient,
        options: TunnelRelayConnectionOptions,
        host_id: Uuid,
    ) -> Self {
        let (ports_tx, ports_rx) = watch::channel(HashMap::new());
        Host {
            host_id,
            locator,
            ports_tx,
            ports_rx,
            mgmt,
            // Ed25519 stands in for the ECDSA P-384 host key: russh-keys 0.37
            // exposes no safe P-384 generator, and Ed25519 is the other curve
            // the protocol already accepts for host keys.
            host_keypair: russh_keys::key::KeyPair::generate_ed25519()
                .expect("expected to generate ed25519 keypair"),
            conn: Arc::new(TunnelConnectionBase::new()),
            options,
        }
    }

    pub async fn status(&self) -> ConnectionStatus {
        self.conn.status().await
    }

    pub fn subscribe_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.conn.subscribe_status()
    }

    /// Cancels any in-flight reconnect and transitions the connection
    /// terminally to `Disconnected`. Idempotent.
    pub async fn dispose(&self) -> Result<(), TunnelError> {
        self.conn.dispose().await
    }

    /// Connects to the relay, retrying per the shared retry engine (C6) until
    /// a connection succeeds or a fatal error is returned. The returned handle
    /// is a future that completes when the tunnel closes.
    pub async fn connect(&mut self, host_token: &str) -> Result<RelayHandle, TunnelError> {
        self.conn.set_status(ConnectionStatus::Connecting).await;

        let locator = self.locator.clone();
        let mgmt = self.mgmt.clone();
        let host_keypair = self.host_keypair.clone();
        let ports_rx = self.ports_rx.clone();
        let host_id = self.host_id;
        let enable_retry = self.options.enable_retry;
        let conn = self.conn.clone();
        let token = host_token.to_string();

        let result = connect_session(
            enable_retry,
            &NoopRetryObserver,
            || Box::pin(async { false }), // host tokens are provided by the caller; no refresh hook yet
            || {
                let locator = locator.clone();
                let mgmt = mgmt.clone();
                let host_keypair = host_keypair.clone();
                let ports_rx = ports_rx.clone();
                let token = token.clone();
                let conn = conn.clone();
                Box::pin(async move {
                    connect_once(&locator, &mgmt, host_id, &host_keypair, ports_rx, &token, &conn).await
                })
            },
        )
        .await;

        match result {
            Ok(handle) => {
                self.conn.set_status(ConnectionStatus::Connected).await;
                Ok(handle)
            }
            Err(e) => {
                self.conn.set_status(ConnectionStatus::Disconnected).await;
                Err(e)
            }
        }
    }

    /// Unregisters relay from the tunnel's list of hosts.
    pub async fn unregister(&self) -> Result<bool, TunnelError> {
        self.mgmt
            .delete_tunnel_endpoints(
                &self.locator,
                &self.host_id.to_string(),
                None,
                NO_REQUEST_OPTIONS,
            )
            .await
            .map_err(|e| TunnelError::HttpError {
                error: e,
                reason: "could not unregister relay",
            })
    }

    /// Adds a new port to the relay and returns a receiver for connections
    /// made to it. Calling this twice for the same port is an error; dropping
    /// the receiver does not remove the port, `remove_port()` does that.
    pub async fn add_port_raw(
        &self,
        port_to_add: &TunnelPort,
    ) -> Result<mpsc::UnboundedReceiver<ForwardedPortConnection>, TunnelError> {
        let n = port_to_add.port_number as u32;
        if self.ports_tx.borrow().get(&n).is_some() {
            return Err(TunnelError::PortAlreadyExists(n));
        }

        let tunnel_port = self
            .mgmt
            .create_tunnel_port(&self.locator, port_to_add, NO_REQUEST_OPTIONS)
            .await;

        match tunnel_port {
            Ok(_) => {}
            Err(HttpError::ResponseError(e)) if e.status_code == 409 => {}
            Err(e) => {
                return Err(TunnelError::HttpError {
                    error: e,
                    reason: "failed to add port to tunnel",
                })
            }
        }

        let (tx, rx) = mpsc::unbounded_channel();
        self.ports_tx.send_modify(|v| {
            v.insert(n, tx);
        });

        Ok(rx)
    }

    /// Adds a new port and forwards TCP/IP connections made over it to the
    /// local machine.
    pub async fn add_port(&self, port_to_add: &TunnelPort) -> Result<(), TunnelError> {
        let rx = self.add_port_raw(port_to_add).await?;
        let bind_host = self
            .options
            .local_forwarding_host_address
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| "127.0.0.1".to_string());

        tokio::spawn(forward_port_to_tcp(
            format!("{}:{}", bind_host, port_to_add.port_number),
            rx,
            self.host_keypair.clone(),
            self.options.enable_e2e_encryption,
        ));

        Ok(())
    }

    /// Removes a port. Connections already in flight close shortly after.
    pub async fn remove_port(&self, port_number: u16) -> Result<(), TunnelError> {
        self.mgmt
            .delete_tunnel_port(&self.locator, port_number, NO_REQUEST_OPTIONS)
            .await
            .map_err(|e| TunnelError::HttpError {
                error: e,
                reason: "failed to remove port from tunnel",
            })?;

        self.ports_tx.send_modify(|v| {
            v.remove(&(port_number as u32));
        });

        Ok(())
    }

    /// Re-fetches the tunnel's port list and reconciles it against what's
    /// currently forwarded, adding/removing as needed. Intended to be called
    /// in response to a `RefreshPorts` SSH global request from a peer, or on
    /// a polling timer.
    pub async fn refresh_ports(&self) -> Result<(), TunnelError> {
        let tunnel = self
            .mgmt
            .get_tunnel(&self.locator, NO_REQUEST_OPTIONS)
            .await
            .map_err(|e| TunnelError::HttpError {
                error: e,
                reason: "failed to refresh tunnel ports",
            })?;

        let desired: std::collections::HashSet<u32> =
            tunnel.ports.iter().map(|p| p.port_number as u32).collect();
        let current: std::collections::HashSet<u32> = self.ports_tx.borrow().keys().copied().collect();

        for port in &tunnel.ports {
            if !current.contains(&(port.port_number as u32)) {
                self.add_port(port).await.ok();
            }
        }
        for port in current.difference(&desired) {
            self.remove_port(*port as u16).await.ok();
        }

        Ok(())
    }

    fn make_ssh_server(keypair: russh_keys::key::KeyPair) -> Server {
        let c = russh::server::Config {
            connection_timeout: None,
            auth_rejection_time: std::time::Duration::from_secs(5),
            keys: vec![keypair],
            window_size: 1024 * 1024 * 64,
            preferred: russh::Preferred::COMPRESSED,
            limits: russh::Limits {
                rekey_read_limit: usize::MAX,
                rekey_time_limit: Duration::MAX,
                rekey_write_limit: usize::MAX,
            },
            ..Default::default()
        };

        Server {
            config: Arc::new(c),
        }
    }

    /// The v1 client connection is a real (if anonymous) SSH handshake; v2
    /// forces `none` key exchange because the relay's TLS already secures
    /// the transport.
    async fn make_ssh_client(
        rw: impl AsyncRead + AsyncWrite + Unpin + Send + 'static,
        protocol: ConnectionProtocol,
    ) -> Result<(russh::client::Handle<Client>, mpsc::UnboundedReceiver<ChannelOp>), russh::Error> {
        let config = match protocol {
            ConnectionProtocol::V2 => russh::client::Config {
                anonymous: true,
                window_size: 1024 * 1024 * 64,
                preferred: russh::Preferred {
                    kex: &[russh::kex::NONE],
                    key: &[russh_keys::key::NONE],
                    cipher: &[russh::cipher::NONE],
                    mac: russh::Preferred::DEFAULT.mac,
                    compression: &["none"],
                },
                ..Default::default()
            },
            ConnectionProtocol::V1 => russh::client::Config {
                anonymous: true,
                window_size: 1024 * 1024 * 64,
                ..Default::default()
            },
        };

        let config = Arc::new(config);
        let (client, rx) = Client::new(protocol);
        let session = russh::client::connect_stream(config, rw, client).await?;
        Ok((session, rx))
    }

    async fn create_websocket(
        mgmt: &TunnelManagementClient,
        locator: &TunnelLocator,
        host_id: Uuid,
        host_keypair: &russh_keys::key::KeyPair,
        host_token: &str,
    ) -> Result<(tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>, String, TunnelRelayTunnelEndpoint), TunnelError> {
        let host_public_key = {
            use russh_keys::PublicKeyBase64;
            host_keypair
                .clone_public_key()
                .map_err(|_| TunnelError::ProtocolError("failed to derive host public key".into()))?
                .public_key_base64()
        };

        let endpoint = mgmt
            .update_tunnel_relay_endpoints(
                locator,
                &TunnelRelayTunnelEndpoint {
                    base: TunnelEndpoint {
                        connection_mode: TunnelConnectionMode::TunnelRelay,
                        host_id: host_id.to_string(),
                        host_public_keys: vec![host_public_key],
                        port_uri_format: None,
                        port_ssh_command_format: None,
                        host_relay_uri: None,
                        client_relay_uri: None,
                    },
                },
                &TunnelRequestOptions {
                    authorization: Some(Authorization::Tunnel(host_token.to_string())),
                    ..TunnelRequestOptions::default()
                },
            )
            .await
            .map_err(|e| TunnelError::HttpError {
                error: e,
                reason: "failed to update tunnel endpoint for hosting",
            })?;

        let url = endpoint
            .host_relay_uri()
            .ok_or(TunnelError::MissingHostEndpoint)?;

        let pin = protocol_version_override();
        let subprotocols = subprotocols_for(ConnectionRole::Host, pin);
        let (cnx, negotiated) = connect_relay_stream(
            url,
            &Authorization::Tunnel(host_token.to_string()),
            &subprotocols,
            mgmt.user_agent.to_str().unwrap_or(""),
        )
        .await?;

        Ok((cnx, negotiated, endpoint))
    }
}

async fn connect_once(
    locator: &TunnelLocator,
    mgmt: &TunnelManagementClient,
    host_id: Uuid,
    host_keypair: &russh_keys::key::KeyPair,
    ports_rx: watch::Receiver<PortMap>,
    host_token: &str,
    conn: &Arc<TunnelConnectionBase>,
) -> Result<RelayHandle, TunnelError> {
    let (cnx, negotiated, endpoint) =
        Host::create_websocket(mgmt, locator, host_id, host_keypair, host_token).await?;
    let protocol = protocol_from_subprotocol(&negotiated)
        .ok_or_else(|| TunnelError::ProtocolError(format!("unrecognized subprotocol {negotiated}")))?;

    let cnx = AsyncRWWebSocket::new(super::ws::AsyncRWWebSocketOptions {
        websocket: cnx,
        ping_interval: Duration::from_secs(60),
        ping_timeout: Duration::from_secs(10),
    });

    let (client_session, mut rx) = Host::make_ssh_client(cnx, protocol)
        .await
        .map_err(TunnelError::TunnelRelayDisconnected)?;
    let client_session = Arc::new(client_session);
    let client_session_ret = client_session.clone();

    log::debug!("established host relay primary session ({:?})", protocol);

    if protocol == ConnectionProtocol::V2 {
        let mut known = ports_rx.borrow().keys().copied().collect::<Vec<_>>();
        known.sort_unstable();
        for port in known {
            client_session
                .forward_tcpip("127.0.0.1".to_string(), port)
                .await
                .ok();
        }
    }

    let mut channels = HashMap::new();
    let host_keypair = host_keypair.clone();
    let conn = conn.clone();
    let mut ports_watch = ports_rx.clone();
    let join = tokio::spawn(async move {
        let mut server = Host::make_ssh_server(host_keypair.clone());
        let mut v2_known_ports: PortMap = HashMap::new();

        loop {
            tokio::select! {
                Some(op) = rx.recv() => match op {
                    ChannelOp::OpenNested(id) => {
                        let (rw, sender) = AsyncRWChannel::new(id, client_session.clone());
                        server.run_stream(rw, ports_rx.clone());
                        channels.insert(id, sender);
                        log::info!("opened new nested client session on channel {}", id);
                    },
                    ChannelOp::Close(id) => {
                        channels.remove(&id);
                    },
                    ChannelOp::Data(id, data) => {
                        if let Some(ch) = channels.get(&id) {
                            if ch.send(data).is_err() {
                                channels.remove(&id);
                            }
                        }
                    },
                    ChannelOp::ForwardedTcpip(cnx_conn) => {
                        if let Some(sender) = v2_known_ports.get(&cnx_conn.port) {
                            sender.send(cnx_conn).ok();
                        }
                    },
                },
                changed = ports_watch.changed(), if protocol == ConnectionProtocol::V2 => {
                    if changed.is_err() {
                        continue;
                    }
                    let new_ports = ports_watch.borrow().clone();
                    for port in new_ports.keys() {
                        if !v2_known_ports.contains_key(port) {
                            client_session.forward_tcpip("127.0.0.1".to_string(), *port).await.ok();
                        }
                    }
                    for port in v2_known_ports.keys() {
                        if !new_ports.contains_key(port) {
                            client_session.cancel_forward_tcpip("127.0.0.1".to_string(), *port).await.ok();
                        }
                    }
                    v2_known_ports = new_ports;
                },
                else => break,
            }
        }

        conn.set_status(ConnectionStatus::Disconnected).await;
        client_session
            .disconnect(russh::Disconnect::ByApplication, "going away", "en")
            .await
            .ok();

        log::debug!("disconnected primary host session after EOF");
        Ok(())
    });

    Ok(RelayHandle {
        endpoint,
        join,
        session: client_session_ret,
    })
}

/// Either side's channel handle: v1 forwarded-tcpip channels live on the
/// nested SSH *server* session, v2 ones live directly on the host's top-level
/// SSH *client* session. `ForwardedPortConnection` is agnostic to which.
#[derive(Clone)]
enum ChannelHandle {
    Server(russh::server::Handle),
    Client(Arc<russh::client::Handle<Client>>),
}

impl ChannelHandle {
    async fn data(&self, channel: russh::ChannelId, data: CryptoVec) -> Result<(), CryptoVec> {
        match self {
            ChannelHandle::Server(h) => h.data(channel, data).await,
            ChannelHandle::Client(h) => h.data(channel, data).await,
        }
    }

    async fn close(&self, channel: russh::ChannelId) {
        match self {
            ChannelHandle::Server(h) => {
                h.close(channel).await.ok();
            }
            ChannelHandle::Client(h) => {
                h.close(channel).await.ok();
            }
        }
    }
}

/// Type returned in a channel from `add_port_raw`; implements `AsyncRead`/`AsyncWrite`.
pub struct ForwardedPortConnection {
    port: u32,
    channel: russh::ChannelId,
    handle: ChannelHandle,
    receiver: mpsc::Receiver<Vec<u8>>,
}

impl ForwardedPortConnection {
    pub async fn send(&mut self, d: &[u8]) -> Result<(), ()> {
        self.handle
            .data(self.channel, CryptoVec::from_slice(d))
            .await
            .map_err(|_| ())
    }

    pub async fn recv(&mut self) -> Option<Vec<u8>> {
        self.receiver.recv().await
    }

    pub async fn close(self) {
        self.handle.close(self.channel).await;
    }

    async fn read_channel_open(&mut self) -> Result<(Option<String>, bool), TunnelError> {
        let data = self
            .recv()
            .await
            .ok_or_else(|| TunnelError::ProtocolError("channel closed before open metadata".into()))?;
        port_forward_messages::decode_channel_open(&data)
    }

    async fn send_channel_open_confirmation(&mut self, e2e_enabled: bool) -> Result<(), TunnelError> {
        self.send(&port_forward_messages::encode_channel_open_confirmation(e2e_enabled))
            .await
            .map_err(|_| TunnelError::ProtocolError("channel closed before open confirmation".into()))
    }

    pub fn into_rw(self) -> ForwardedPortRW {
        let (w, r) = self.into_split();
        ForwardedPortRW(r, w)
    }

    pub fn into_split(self) -> (ForwardedPortWriter, ForwardedPortReader) {
        (
            ForwardedPortWriter {
                channel: self.channel,
                handle: self.handle,
                is_write_fut_valid: false,
                write_fut: tokio_util::sync::ReusableBoxFuture::new(make_server_write_fut(None)),
            },
            ForwardedPortReader {
                receiver: self.receiver,
                readbuf: super::io::ReadBuffer::default(),
            },
        )
    }
}

#[async_trait::async_trait]
impl ForwardChannel for ForwardedPortConnection {
    async fn send(&mut self, data: &[u8]) -> Result<(), ()> {
        ForwardedPortConnection::send(self, data).await
    }

    async fn recv(&mut self) -> Option<Vec<u8>> {
        ForwardedPortConnection::recv(self).await
    }

    async fn close_gracefully(&mut self) {
        self.handle.close(self.channel).await;
    }

    async fn abort(&mut self, reason: &str) {
        log::debug!("aborting forwarded port connection: {}", reason);
        self.handle.close(self.channel).await;
    }
}

pub struct ForwardedPortWriter {
    channel: russh::ChannelId,
    handle: ChannelHandle,
    is_write_fut_valid: bool,
    write_fut: tokio_util::sync::ReusableBoxFuture<'static, Result<(), russh::CryptoVec>>,
}

async fn make_server_write_fut(
    data: Option<(ChannelHandle, russh::ChannelId, Vec<u8>)>,
) -> Result<(), russh::CryptoVec> {
    match data {
        Some((handle, id, data)) => handle.data(id, CryptoVec::from(data)).await,
        None => unreachable!("this future should not be pollable in this state"),
    }
}

impl AsyncWrite for ForwardedPortWriter {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
        buf: &[u8],
    ) -> Poll<Result<usize, io::Error>> {
        if !self.is_write_fut_valid {
            let handle = self.handle.clone();
            let id = self.channel;
            self.write_fut
                .set(make_server_write_fut(Some((handle, id, buf.to_vec()))));
            self.is_write_fut_valid = true;
        }

        self.poll_flush(cx).map(|r| r.map(|_| buf.len()))
    }

    fn poll_flush(
        mut self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> Poll<Result<(), io::Error>> {
        if !self.is_write_fut_valid {
            return Poll::Ready(Ok(()));
        }

        match self.write_fut.poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(_)) => {
                self.is_write_fut_valid = false;
                Poll::Ready(Ok(()))
            }
            Poll::Ready(Err(_)) => {
                self.is_write_fut_valid = false;
                Poll::Ready(Err(io::Error::new(io::ErrorKind::Other, "EOF")))
            }
        }
    }

    fn poll_shutdown(
        self: Pin<&mut Self>,
        _cx: &mut std::task::Context<'_>,
    ) -> Poll<Result<(), io::Error>> {
        Poll::Ready(Ok(()))
    }
}

pub struct ForwardedPortReader {
    receiver: mpsc::Receiver<Vec<u8>>,
    readbuf: super::io::ReadBuffer,
}

impl AsyncRead for ForwardedPortReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
        buf: &mut tokio::io::ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        if let Some((v, s)) = self.readbuf.take_data() {
            return self.readbuf.put_data(buf, v, s);
        }

        match self.receiver.poll_recv(cx) {
            Poll::Ready(Some(msg)) => self.readbuf.put_data(buf, msg, 0),
            Poll::Ready(None) => Poll::Ready(Err(io::Error::new(io::ErrorKind::Other, "EOF"))),
            Poll::Pending => Poll::Pending,
        }
    }
}

pub struct ForwardedPortRW(ForwardedPortReader, ForwardedPortWriter);

impl AsyncRead for ForwardedPortRW {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
        buf: &mut tokio::io::ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.0).poll_read(cx, buf)
    }
}

impl AsyncWrite for ForwardedPortRW {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
        buf: &[u8],
    ) -> Poll<Result<usize, io::Error>> {
        Pin::new(&mut self.1).poll_write(cx, buf)
    }
    fn poll_flush(
        mut self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> Poll<Result<(), io::Error>> {
        Pin::new(&mut self.1).poll_flush(cx)
    }
    fn poll_shutdown(
        mut self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> Poll<Result<(), io::Error>> {
        Pin::new(&mut self.1).poll_shutdown(cx)
    }
}

#[derive(Clone)]
struct Server {
    config: Arc<russh::server::Config>,
}

impl Server {
    pub fn run_stream(
        &mut self,
        rw: impl AsyncRead + AsyncWrite + Unpin + Send + 'static,
        mut ports: watch::Receiver<PortMap>,
    ) -> JoinHandle<Result<(), russh::Error>> {
        let mut server_session = self.new_client(None);
        let mut server_connection_rx = server_session.take_rx().expect("expected to have rx");
        let authed_tx = server_session.take_authed().expect("expected to have tx");

        let config = self.config.clone();
        tokio::spawn(async move {
            log::debug!("starting to serve nested host relay client session");
            let session = match russh::server::run_stream(config, rw, server_session).await {
                Ok(s) => s,
                Err(e) => {
                    log::error!("error handshaking nested session: {}", e);
                    return Err(e);
                }
            };

            if authed_tx.await.is_err() {
                log::debug!("nested connection closed before auth");
                return Ok(());
            }

            log::debug!("nested host relay client session successfully authed");
            let mut known_ports: PortMap = HashMap::new();
            tokio::pin!(session);

            loop {
                tokio::select! {
                    r = &mut session => return r,
                    cnx = server_connection_rx.recv() => match cnx {
                        Some(cnx) => {
                            if let Some(p) = known_ports.get(&cnx.port) {
                                p.send(cnx).ok();
                            }
                        },
                        None => {
                            log::debug!("no more connections on nested session, ending");
                            return Ok(());
                        },
                    },
                    _ = ports.changed() => {
                        let new_ports = ports.borrow().clone();
                        for port in new_ports.keys() {
                            if !known_ports.contains_key(port) {
                                session.handle().forward_tcpip("127.0.0.1".to_string(), *port).await.ok();
                            }
                        }
                        for port in known_ports.keys() {
                            if !new_ports.contains_key(port) {
                                session.handle().cancel_forward_tcpip("127.0.0.1".to_string(), *port).await.ok();
                            }
                        }

                        known_ports = new_ports;
                    },
                }
            }
        })
    }
}

/// Connects connections sent to the receiver to TCP services locally. Runs
/// until the receiver is closed (usually via `remove_port()`). Every
/// connection starts with the client's channel-open metadata frame (access
/// token, E2E request flag); the host reads it, replies with a confirmation
/// frame, and upgrades to a per-channel encrypted stream before bridging to
/// the local service if both sides agreed to E2EE.
async fn forward_port_to_tcp(
    addr: impl tokio::net::ToSocketAddrs + std::fmt::Display + Clone,
    mut rx: mpsc::UnboundedReceiver<ForwardedPortConnection>,
    host_keypair: russh_keys::key::KeyPair,
    enable_e2e_encryption: bool,
) {
    while let Some(mut conn) = rx.recv().await {
        let addr = addr.clone();
        let host_keypair = host_keypair.clone();
        tokio::spawn(async move {
            let (access_token, e2e_requested) = match conn.read_channel_open().await {
                Ok(v) => v,
                Err(e) => {
                    log::info!("error reading channel-open metadata: {}", e);
                    conn.abort(&e.to_string()).await;
                    return;
                }
            };
            if access_token.is_none() {
                log::debug!("forwarded connection presented no access token");
            }

            let e2e_enabled = enable_e2e_encryption && e2e_requested;
            if let Err(e) = conn.send_channel_open_confirmation(e2e_enabled).await {
                log::info!("error sending channel-open confirmation: {}", e);
                return;
            }

            let mut channel: Box<dyn ForwardChannel> = if e2e_enabled {
                match SecureStream::wrap_host(spawn_channel_io(conn), host_keypair).await {
                    Ok(secure) => Box::new(secure),
                    Err(e) => {
                        log::info!("error establishing end-to-end encryption: {}", e);
                        return;
                    }
                }
            } else {
                Box::new(conn)
            };

            let stream = match tokio::net::TcpStream::connect(&addr).await {
                Ok(s) => s,
                Err(e) => {
                    log::info!("error connecting forwarded port to {}: {}", addr, e);
                    channel.close_gracefully().await;
                    return;
                }
            };

            log::debug!("forwarded port to {}", addr);
            forward(channel, stream).await;
        });
    }
}

impl ServerTrait for Server {
    type Handler = ServerHandle;
    fn new_client(&mut self, _: Option<std::net::SocketAddr>) -> ServerHandle {
        ServerHandle::new()
    }
}

struct ServerHandle {
    authed_tx: Option<oneshot::Sender<()>>,
    authed_rx: Option<oneshot::Receiver<()>>,
    cnx_tx: mpsc::UnboundedSender<ForwardedPortConnection>,
    cnx_rx: Option<mpsc::UnboundedReceiver<ForwardedPortConnection>>,
    channel_senders: HashMap<russh::ChannelId, mpsc::Sender<Vec<u8>>>,
}

impl ServerHandle {
    pub fn new() -> Self {
        let (authed_tx, authed_rx) = oneshot::channel();
        let (cnx_tx, cnx_rx) = mpsc::unbounded_channel();
        Self {
            authed_rx: Some(authed_rx),
            authed_tx: Some(authed_tx),
            cnx_rx: Some(cnx_rx),
            cnx_tx,
            channel_senders: HashMap::new(),
        }
    }

    pub fn take_rx(&mut self) -> Option<mpsc::UnboundedReceiver<ForwardedPortConnection>> {
        self.cnx_rx.take()
    }

    pub fn take_authed(&mut self) -> Option<oneshot::Receiver<()>> {
        self.authed_rx.take()
    }
}

impl russh::server::Handler for ServerHandle {
    type Error = russh::Error;
    type FutureAuth = Pin<
        Box<
            dyn core::future::Future<Output = Result<(Self, russh::server::Auth), Self::Error>>
                + Send,
        >,
    >;
    type FutureUnit = Pin<
        Box<
            dyn core::future::Future<Output = Result<(Self, russh::server::Session), Self::Error>>
                + Send,
        >,
    >;
    type FutureBool = Pin<
        Box<
            dyn core::future::Future<
                    Output = Result<(Self, russh::server::Session, bool), Self::Error>,
                > + Send,
        >,
    >;

    fn finished_auth(self, auth: russh::server::Auth) -> Self::FutureAuth {
        async { Ok((self, auth)) }.boxed()
    }

    fn finished_bool(self, b: bool, s: russh::server::Session) -> Self::FutureBool {
        async move { Ok((self, s, b)) }.boxed()
    }

    fn finished(self, s: russh::server::Session) -> Self::FutureUnit {
        async { Ok((self, s)) }.boxed()
    }

    fn auth_succeeded(mut self, session: russh::server::Session) -> Self::FutureUnit {
        if let Some(tx) = self.authed_tx.take() {
            tx.send(()).ok();
        }
        self.finished(session)
    }

    /// Connecting clients use "none" auth on the nested v1 session.
    fn auth_none(self, _: &str) -> Self::FutureAuth {
        self.finished_auth(russh::server::Auth::Accept)
    }

    fn channel_open_forwarded_tcpip(
        mut self,
        channel: russh::ChannelId,
        _host_to_connect: &str,
        port_to_connect: u32,
        _originator_address: &str,
        _originator_port: u32,
        session: russh::server::Session,
    ) -> Self::FutureBool {
        let (sender, receiver) = mpsc::channel(10);
        let txd = self.cnx_tx.send(ForwardedPortConnection {
            port: port_to_connect,
            channel,
            handle: ChannelHandle::Server(session.handle()),
            receiver,
        });
        if txd.is_ok() {
            self.channel_senders.insert(channel, sender);
        }
        self.finished_bool(true, session)
    }

    fn data(
        mut self,
        channel: russh::ChannelId,
        data: &[u8],
        session: russh::server::Session,
    ) -> Self::FutureUnit {
        let data_vec = data.to_vec();
        async move {
            if let Some(sender) = self.channel_senders.get(&channel) {
                if sender.send(data_vec).await.is_err() {
                    self.channel_senders.remove(&channel);
                }
            }
            Ok((self, session))
        }
        .boxed()
    }
}

/// Sent from the top-level `Client` handler back to the connect loop.
#[derive(Debug)]
enum ChannelOp {
    /// v1: a new `client-ssh-session-stream` channel needing a nested server.
    OpenNested(russh::ChannelId),
    Close(russh::ChannelId),
    Data(russh::ChannelId, Vec<u8>),
}

/// The top-level SSH client handler for the host's primary relay session.
struct Client {
    sender: mpsc::UnboundedSender<ChannelOp>,
    protocol: ConnectionProtocol,
    /// v2 forwarded-tcpip channels route their data frames here directly,
    /// bypassing the `ChannelOp::Data`/nested-`channels` path that v1 uses.
    channel_senders: HashMap<russh::ChannelId, mpsc::Sender<Vec<u8>>>,
}

impl Client {
    pub fn new(protocol: ConnectionProtocol) -> (Self, mpsc::UnboundedReceiver<ChannelOp>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Client {
                sender: tx,
                protocol,
                channel_senders: HashMap::new(),
            },
            rx,
        )
    }
}

impl russh::client::Handler for Client {
    type Error = russh::Error;
    type FutureUnit = futures::future::Ready<Result<(Self, russh::client::Session), russh::Error>>;
    type FutureBool = futures::future::Ready<Result<(Self, bool), russh::Error>>;

    fn finished_bool(self, b: bool) -> Self::FutureBool {
        futures::future::ready(Ok((self, b)))
    }
    fn finished(self, session: russh::client::Session) -> Self::FutureUnit {
        futures::future::ready(Ok((self, session)))
    }

    /// v1 uses a real, if anonymous, key exchange and the endpoint's published
    /// `host_public_keys` back it on the client side; v2 forces `none` kex so
    /// there is no server key to check here in the first place.
    fn check_server_key(self, _server_public_key: &russh_keys::key::PublicKey) -> Self::FutureBool {
        self.finished_bool(true)
    }

    fn server_channel_handle_unknown(&self, channel: russh::ChannelId, channel_type: &[u8]) -> bool {
        if channel_type == b"client-ssh-session-stream" && self.protocol == ConnectionProtocol::V1 {
            self.sender.send(ChannelOp::OpenNested(channel)).ok();
            true
        } else {
            false
        }
    }

    /// v2's counterpart to `ServerHandle::channel_open_forwarded_tcpip`: since
    /// the host already issued `tcpip-forward` on this same session for every
    /// hosted port, the relay opens `forwarded-tcpip` channels on it directly,
    /// with no nested handshake needed.
    fn channel_open_forwarded_tcpip(
        mut self,
        channel: russh::ChannelId,
        _host_to_connect: &str,
        port_to_connect: u32,
        _originator_address: &str,
        _originator_port: u32,
        session: russh::client::Session,
    ) -> Self::FutureBool {
        let (sender, receiver) = mpsc::channel(10);
        let handle = ChannelHandle::Client(Arc::new(session.handle()));
        let txd = self.sender.send(ChannelOp::ForwardedTcpip(ForwardedPortConnection {
            port: port_to_connect,
            channel,
            handle,
            receiver,
        }));
        if txd.is_ok() {
            self.channel_senders.insert(channel, sender);
        }
        self.finished_bool(true)
    }

    fn channel_close(
        mut self,
        channel: russh::ChannelId,
        session: russh::client::Session,
    ) -> Self::FutureUnit {
        self.channel_senders.remove(&channel);
        self.sender.send(ChannelOp::Close(channel)).ok();
        self.finished(session)
    }

    fn data(mut self, channel: russh::ChannelId, data: &[u8], session: russh::client::Session) -> Self::FutureUnit {
        if let Some(sender) = self.channel_senders.get(&channel) {
            if sender.try_send(data.to_vec()).is_err() {
                log::debug!("forwarded-tcpip channel {} data dropped, receiver full or closed", channel);
            }
        } else {
            self.sender.send(ChannelOp::Data(channel, data.to_vec())).ok();
        }
        self.finished(session)
    }
}

/// AsyncRead/AsyncWrite for converting a v1 `client-ssh-session-stream`
/// channel into a transport the nested server can run a handshake over.
struct AsyncRWChannel {
    id: russh::ChannelId,
    session: Arc<russh::client::Handle<Client>>,
    incoming: mpsc::UnboundedReceiver<Vec<u8>>,
    readbuf: super::io::ReadBuffer,
    is_write_fut_valid: bool,
    write_fut: tokio_util::sync::ReusableBoxFuture<'static, Result<(), russh::CryptoVec>>,
}

impl AsyncRWChannel {
    pub fn new(
        id: russh::ChannelId,
        session: Arc<russh::client::Handle<Client>>,
    ) -> (Self, mpsc::UnboundedSender<Vec<u8>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            AsyncRWChannel {
                id,
                session,
                incoming: rx,
                readbuf: super::io::ReadBuffer::default(),
                is_write_fut_valid: false,
                write_fut: tokio_util::sync::ReusableBoxFuture::new(make_client_write_fut(None)),
            },
            tx,
        )
    }
}

async fn make_client_write_fut(
    data: Option<(Arc<russh::client::Handle<Client>>, russh::ChannelId, Vec<u8>)>,
) -> Result<(), russh::CryptoVec> {
    match data {
        Some((client, id, data)) => client.data(id, CryptoVec::from(data)).await,
        None => unreachable!("this future should not be pollable in this state"),
    }
}

impl AsyncWrite for AsyncRWChannel {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
        buf: &[u8],
    ) -> Poll<Result<usize, io::Error>> {
        if !self.is_write_fut_valid {
            let session = self.session.clone();
            let id = self.id;
            self.write_fut
                .set(make_client_write_fut(Some((session, id, buf.to_vec()))));
            self.is_write_fut_valid = true;
        }

        self.poll_flush(cx).map(|r| r.map(|_| buf.len()))
    }

    fn poll_flush(
        mut self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> Poll<Result<(), io::Error>> {
        if !self.is_write_fut_valid {
            return Poll::Ready(Ok(()));
        }

        match self.write_fut.poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(_)) => {
                self.is_write_fut_valid = false;
                Poll::Ready(Ok(()))
            }
            Poll::Ready(Err(_)) => {
                self.is_write_fut_valid = false;
                Poll::Ready(Err(io::Error::new(io::ErrorKind::Other, "EOF")))
            }
        }
    }

    fn poll_shutdown(
        self: Pin<&mut Self>,
        _cx: &mut std::task::Context<'_>,
    ) -> Poll<Result<(), io::Error>> {
        Poll::Ready(Ok(()))
    }
}

impl AsyncRead for AsyncRWChannel {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
        buf: &mut tokio::io::ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        if let Some((v, s)) = self.readbuf.take_data() {
            return self.readbuf.put_data(buf, v, s);
        }

        match self.incoming.poll_recv(cx) {
            Poll::Ready(Some(msg)) => self.readbuf.put_data(buf, msg, 0),
            Poll::Ready(None) => Poll::Ready(Err(io::Error::new(io::ErrorKind::Other, "EOF"))),
            Poll::Pending => Poll::Pending,
        }
    }
}

pub struct RelayHandle {
    endpoint: TunnelRelayTunnelEndpoint,
    session: Arc<russh::client::Handle<Client>>,
    join: JoinHandle<Result<(), russh::Error>>,
}

impl RelayHandle {
    pub fn endpoint(&self) -> &TunnelRelayTunnelEndpoint {
        &self.endpoint
    }

    pub async fn close(self) -> Result<(), TunnelError> {
        let result = self
            .session
            .disconnect(russh::Disconnect::ByApplication, "disconnect", "en")
            .await;
        self.join.await.ok();
        result.map_err(TunnelError::TunnelRelayDisconnected)
    }
}

impl std::future::Future for RelayHandle {
    type Output = Result<(), TunnelError>;
    fn poll(mut self: Pin<&mut Self>, cx: &mut std::task::Context<'_>) -> Poll<Self::Output> {
        match std::future::Future::poll(Pin::new(&mut self.join), cx) {
            Poll::Ready(r) => Poll::Ready(match r {
                Ok(Ok(_)) => Ok(()),
                Ok(Err(e)) => Err(TunnelError::TunnelRelayDisconnected(e)),
                Err(_) => Ok(()),
            }),
            Poll::Pending => Poll::Pending,
        }
    }
}
