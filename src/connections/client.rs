// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use std::{collections::HashMap, sync::Arc, time::Duration};

use tokio::{
    net::TcpListener,
    sync::{watch, Mutex},
};

use crate::{
    contracts::{Tunnel, TunnelPort},
    management::{Authorization, TunnelLocator, TunnelManagementClient, TunnelRequestOptions, NO_REQUEST_OPTIONS},
};

use super::{
    connection::{ConnectionStatus, TunnelConnectionBase},
    connector::{connect_session, NoopRetryObserver},
    errors::TunnelError,
    forwarder::{forward, spawn_channel_io, ForwardChannel},
    listener::create_retry_listener,
    port_forward_messages,
    registry::{RemoteForwarderRegistry, SessionPortKey},
    relay_connection::{
        protocol_from_subprotocol, protocol_version_override, subprotocols_for, ConnectionProtocol,
        ConnectionRole, TunnelRelayConnectionOptions,
    },
    relay_stream::connect_relay_stream,
    secure_stream::SecureStream,
    ws::{AsyncRWWebSocket, AsyncRWWebSocketOptions},
};

/// A single forwarded port the client is listening for locally (C9).
struct ForwardedPort {
    local_port: u16,
    listener_task: tokio::task::JoinHandle<()>,
}

/// Connects to a tunnel's relay as a client and forwards its ports to local
/// TCP listeners (C9). One `TunnelClient` corresponds to one host endpoint;
/// `MultiModeTunnelClient` (C11) fans out across every endpoint a tunnel
/// publishes.
pub struct TunnelClient {
    locator: TunnelLocator,
    mgmt: TunnelManagementClient,
    options: TunnelRelayConnectionOptions,
    conn: Arc<TunnelConnectionBase>,
    forwarders: Arc<RemoteForwarderRegistry<ForwardedPort>>,
    ports: Mutex<HashMap<u16, u16>>, // remote port -> local bound port
}

#[allow(dead_code)]
impl TunnelClient {
    pub fn new(locator: TunnelLocator, mgmt: TunnelManagementClient) -> Self {
        Self::with_options(locator, mgmt, TunnelRelayConnectionOptions::default())
    }

    pub fn with_options(
        locator: TunnelLocator,
        mgmt: TunnelManagementClient,
        options: TunnelRelayConnectionOptions,
    ) -> Self {
        TunnelClient {
            locator,
            mgmt,
            options,
            conn: Arc::new(TunnelConnectionBase::new()),
            forwarders: Arc::new(RemoteForwarderRegistry::new()),
            ports: Mutex::new(HashMap::new()),
        }
    }

    pub async fn status(&self) -> ConnectionStatus {
        self.conn.status().await
    }

    pub fn subscribe_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.conn.subscribe_status()
    }

    pub fn accept_local_connections_for_forwarded_ports(&self) -> bool {
        self.options.accept_local_connections_for_forwarded_ports
    }

    /// Used by `MultiModeTunnelClient` to propagate the flag across every
    /// wrapped client (spec §4.11). Only meaningful before `connect`: once a
    /// listener is bound in `wait_for_forwarded_port`, flipping this does not
    /// retroactively tear it down.
    pub fn set_accept_local_connections_for_forwarded_ports(&mut self, value: bool) {
        self.options.accept_local_connections_for_forwarded_ports = value;
    }

    /// Connects to the tunnel's first `TunnelRelay` client endpoint whose
    /// published `host_public_keys` this process accepts. Picking among
    /// several simultaneously-hosting endpoints is `MultiModeTunnelClient`'s
    /// job (C11); a bare `TunnelClient` always binds to one.
    pub async fn connect(&self, access_token: &str) -> Result<ClientHandle, TunnelError> {
        self.conn.set_status(ConnectionStatus::Connecting).await;

        let tunnel = self.fetch_tunnel(access_token).await?;
        self.conn.assign_tunnel(tunnel.clone()).await;

        let endpoint = tunnel
            .endpoints
            .iter()
            .find(|e| {
                matches!(
                    e.connection_mode,
                    crate::contracts::TunnelConnectionMode::TunnelRelay
                )
            })
            .cloned()
            .ok_or(TunnelError::MissingHostEndpoint)?;

        let relay_uri = endpoint
            .client_relay_uri
            .clone()
            .ok_or(TunnelError::MissingHostEndpoint)?;

        let locator = self.locator.clone();
        let mgmt = self.mgmt.clone();
        let enable_retry = self.options.enable_retry;
        let token = access_token.to_string();
        let host_public_keys = endpoint.host_public_keys.clone();
        let enable_e2e_encryption = self.options.enable_e2e_encryption;

        let result = connect_session(
            enable_retry,
            &NoopRetryObserver,
            || {
                let locator = locator.clone();
                let mgmt = mgmt.clone();
                Box::pin(async move {
                    // At most once per ConnectSession call (spec §4.6 step 3): re-fetch
                    // the tunnel so a freshly rotated access token or host key is picked up.
                    mgmt.get_tunnel(&locator, NO_REQUEST_OPTIONS).await.is_ok()
                })
            },
            || {
                let token = token.clone();
                let host_public_keys = host_public_keys.clone();
                let mgmt = mgmt.clone();
                let relay_uri = relay_uri.clone();
                Box::pin(async move { connect_once(&mgmt, &relay_uri, &token, &host_public_keys).await })
            },
        )
        .await;

        match result {
            Ok((session, negotiated)) => {
                self.conn.set_status(ConnectionStatus::Connected).await;
                Ok(ClientHandle {
                    session,
                    negotiated,
                    forwarders: self.forwarders.clone(),
                    access_token: access_token.to_string(),
                    expected_host_keys: host_public_keys,
                    enable_e2e_encryption,
                })
            }
            Err(e) => {
                self.conn.set_status(ConnectionStatus::Disconnected).await;
                Err(e)
            }
        }
    }

    async fn fetch_tunnel(&self, access_token: &str) -> Result<Tunnel, TunnelError> {
        self.mgmt
            .get_tunnel(
                &self.locator,
                &TunnelRequestOptions {
                    authorization: Some(Authorization::Tunnel(access_token.to_string())),
                    include_ports: true,
                    ..TunnelRequestOptions::default()
                },
            )
            .await
            .map_err(|e| TunnelError::HttpError {
                error: e,
                reason: "failed to fetch tunnel before connecting",
            })
    }

    /// Binds a local listener for `port` and starts forwarding connections
    /// made to it over the relay (spec §4.3/§4.4). Returns the local port
    /// actually bound, which may differ from the requested one if it was
    /// taken and `can_change_port` allows a walk.
    pub async fn wait_for_forwarded_port(
        &self,
        handle: &ClientHandle,
        port: &TunnelPort,
        can_change_port: bool,
    ) -> Result<u16, TunnelError> {
        if !self.options.accept_local_connections_for_forwarded_ports {
            return Ok(port.port_number);
        }

        let key = SessionPortKey::new(handle.session_id(), port.port_number);
        let listener = create_retry_listener(
            port.port_number,
            can_change_port,
            self.options.local_forwarding_host_address,
        )
        .await?;
        let local_port = listener.local_addr().map(|a| a.port()).unwrap_or(port.port_number);

        let context = handle.channel_context();
        let remote_port = port.port_number;
        let task = tokio::spawn(async move {
            accept_loop(listener, context, remote_port).await;
        });

        if !self
            .forwarders
            .try_insert(key, Arc::new(ForwardedPort { local_port, listener_task: task }))
        {
            return Err(TunnelError::PortAlreadyExists(port.port_number as u32));
        }

        self.ports.lock().await.insert(port.port_number, local_port);
        Ok(local_port)
    }

    /// Opens a single forwarded connection to a remote port without binding a
    /// local listener, for callers that want the stream directly (spec
    /// §4.4's "ConnectToForwardedPort").
    pub async fn connect_to_forwarded_port(
        &self,
        handle: &ClientHandle,
        remote_port: u16,
    ) -> Result<impl ForwardChannel, TunnelError> {
        handle.open_channel(remote_port, ("127.0.0.1", 0)).await
    }

    /// Stops forwarding a port previously started with
    /// `wait_for_forwarded_port`.
    pub async fn stop_forwarding(&self, handle: &ClientHandle, remote_port: u16) {
        let key = SessionPortKey::new(handle.session_id(), remote_port);
        if let Some(forwarder) = self.forwarders.remove(&key) {
            forwarder.listener_task.abort();
        }
        self.ports.lock().await.remove(&remote_port);
    }

    pub async fn local_port_for(&self, remote_port: u16) -> Option<u16> {
        self.ports.lock().await.get(&remote_port).copied()
    }

    pub async fn dispose(&self) -> Result<(), TunnelError> {
        self.conn.dispose().await
    }
}

async fn connect_once(
    mgmt: &TunnelManagementClient,
    relay_uri: &str,
    access_token: &str,
    expected_host_keys: &[String],
) -> Result<(Arc<russh::client::Handle<ClientSshHandler>>, ConnectionProtocol), TunnelError> {
    let pin = protocol_version_override();
    let subprotocols = subprotocols_for(ConnectionRole::Client, pin);

    let (stream, negotiated) = connect_relay_stream(
        relay_uri,
        &Authorization::Tunnel(access_token.to_string()),
        &subprotocols,
        mgmt.user_agent.to_str().unwrap_or(""),
    )
    .await?;

    let protocol = protocol_from_subprotocol(&negotiated)
        .ok_or_else(|| TunnelError::ProtocolError(format!("unrecognized subprotocol {negotiated}")))?;

    let rw = AsyncRWWebSocket::new(AsyncRWWebSocketOptions {
        websocket: stream,
        ping_interval: Duration::from_secs(60),
        ping_timeout: Duration::from_secs(10),
    });

    let config = match protocol {
        ConnectionProtocol::V2 => Arc::new(russh::client::Config {
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
        }),
        ConnectionProtocol::V1 => Arc::new(russh::client::Config {
            anonymous: true,
            window_size: 1024 * 1024 * 64,
            ..Default::default()
        }),
    };

    let handler = ClientSshHandler {
        expected_host_keys: expected_host_keys.to_vec(),
        key_mismatch: Arc::new(std::sync::atomic::AtomicBool::new(false)),
    };
    let key_mismatch = handler.key_mismatch.clone();
    let session = russh::client::connect_stream(config, rw, handler)
        .await
        .map_err(TunnelError::TunnelRelayDisconnected)?;

    if key_mismatch.load(std::sync::atomic::Ordering::SeqCst) {
        return Err(TunnelError::HostKeyMismatch);
    }

    Ok((Arc::new(session), protocol))
}

/// The client-side SSH handler (v1's nested session, or v2's shared session).
/// Its only job is host-key verification; actual forwarding is driven through
/// `Handle::channel_open_forwarded_tcpip` calls from `ClientHandle`, not
/// through handler callbacks.
struct ClientSshHandler {
    expected_host_keys: Vec<String>,
    key_mismatch: Arc<std::sync::atomic::AtomicBool>,
}

impl russh::client::Handler for ClientSshHandler {
    type Error = russh::Error;
    type FutureUnit = futures::future::Ready<Result<(Self, russh::client::Session), russh::Error>>;
    type FutureBool = futures::future::Ready<Result<(Self, bool), russh::Error>>;

    fn finished_bool(self, b: bool) -> Self::FutureBool {
        futures::future::ready(Ok((self, b)))
    }
    fn finished(self, session: russh::client::Session) -> Self::FutureUnit {
        futures::future::ready(Ok((self, session)))
    }

    /// Verifies the presented key against the tunnel's published
    /// `host_public_keys` (spec §4.9). An empty list means v2's `none` kex, or
    /// a brand new endpoint with no keys published yet; either way there is
    /// nothing to compare, so the key is accepted.
    fn check_server_key(self, server_public_key: &russh_keys::key::PublicKey) -> Self::FutureBool {
        use russh_keys::PublicKeyBase64;
        if self.expected_host_keys.is_empty() {
            return self.finished_bool(true);
        }
        let presented = server_public_key.public_key_base64();
        let ok = self.expected_host_keys.iter().any(|k| k == &presented);
        if !ok {
            self.key_mismatch.store(true, std::sync::atomic::Ordering::SeqCst);
        }
        self.finished_bool(ok)
    }
}

/// Wraps a connected SSH session the client is forwarding through.
pub struct ClientHandle {
    session: Arc<russh::client::Handle<ClientSshHandler>>,
    negotiated: ConnectionProtocol,
    forwarders: Arc<RemoteForwarderRegistry<ForwardedPort>>,
    /// Sent on every forwarded channel's open, per spec §4.10 -- the host
    /// checks it before bridging the connection to a local service.
    access_token: String,
    expected_host_keys: Vec<String>,
    enable_e2e_encryption: bool,
}

impl ClientHandle {
    pub fn protocol(&self) -> ConnectionProtocol {
        self.negotiated
    }

    fn session_id(&self) -> Option<Vec<u8>> {
        // v2 typically has no real key exchange to derive a session id from;
        // v1's does, but russh doesn't expose the raw exchange hash through
        // this handle, so forwarders are keyed by port alone within a single
        // `ClientHandle` (one session per handle already makes the session_id
        // component redundant for disambiguation purposes).
        None
    }

    fn channel_context(&self) -> ChannelOpenContext {
        ChannelOpenContext {
            session: self.session.clone(),
            access_token: self.access_token.clone(),
            expected_host_keys: self.expected_host_keys.clone(),
            enable_e2e_encryption: self.enable_e2e_encryption,
        }
    }

    /// Opens a channel back to the host for `remote_port`. The host issues
    /// `tcpip-forward` for each port it hosts and only ever answers
    /// `channel_open_forwarded_tcpip` on its side, so the client has to open
    /// that same channel type, never `direct-tcpip`.
    async fn open_channel(&self, remote_port: u16, originator: (&str, u16)) -> Result<Box<dyn ForwardChannel>, TunnelError> {
        self.channel_context().open(remote_port, originator).await
    }

    pub async fn close(self) -> Result<(), TunnelError> {
        for key in self.forwarders.keys() {
            if let Some(f) = self.forwarders.remove(&key) {
                f.listener_task.abort();
            }
        }
        self.session
            .disconnect(russh::Disconnect::ByApplication, "disconnect", "en")
            .await
            .map_err(TunnelError::TunnelRelayDisconnected)
    }
}

struct SshForwardChannel {
    channel: russh::Channel<russh::client::Msg>,
}

#[async_trait::async_trait]
impl ForwardChannel for SshForwardChannel {
    async fn send(&mut self, data: &[u8]) -> Result<(), ()> {
        self.channel.data(data).await.map_err(|_| ())
    }

    async fn recv(&mut self) -> Option<Vec<u8>> {
        loop {
            match self.channel.wait().await? {
                russh::ChannelMsg::Data { data } => return Some(data.to_vec()),
                russh::ChannelMsg::Eof | russh::ChannelMsg::Close => return None,
                _ => continue,
            }
        }
    }

    async fn close_gracefully(&mut self) {
        self.channel.eof().await.ok();
        self.channel.close().await.ok();
    }

    async fn abort(&mut self, reason: &str) {
        log::debug!("aborting forwarded channel: {}", reason);
        self.channel.close().await.ok();
    }
}

/// Everything `open_channel` needs, cloned out of a `ClientHandle` so
/// `accept_loop`'s spawned per-connection tasks don't have to hold the whole
/// handle (which owns the forwarders registry, not just the session).
#[derive(Clone)]
struct ChannelOpenContext {
    session: Arc<russh::client::Handle<ClientSshHandler>>,
    access_token: String,
    expected_host_keys: Vec<String>,
    enable_e2e_encryption: bool,
}

impl ChannelOpenContext {
    /// Opens a `forwarded-tcpip` channel to the host for `remote_port`,
    /// appends the access token (and E2E request flag) the host's
    /// `channel_open_forwarded_tcpip` handler expects, and upgrades to a
    /// per-channel encrypted stream if the host's confirmation says it
    /// enabled E2EE.
    async fn open(&self, remote_port: u16, originator: (&str, u16)) -> Result<Box<dyn ForwardChannel>, TunnelError> {
        let mut channel = self
            .session
            .channel_open_forwarded_tcpip("127.0.0.1", remote_port as u32, originator.0, originator.1 as u32)
            .await
            .map_err(TunnelError::TunnelRelayDisconnected)?;

        channel
            .data(&port_forward_messages::encode_channel_open(Some(&self.access_token), self.enable_e2e_encryption)[..])
            .await
            .map_err(TunnelError::TunnelRelayDisconnected)?;

        let confirmation = loop {
            match channel
                .wait()
                .await
                .ok_or_else(|| TunnelError::ProtocolError("channel closed before open confirmation".into()))?
            {
                russh::ChannelMsg::Data { data } => break port_forward_messages::decode_channel_open_confirmation(&data)?,
                russh::ChannelMsg::Eof | russh::ChannelMsg::Close => {
                    return Err(TunnelError::ProtocolError("channel closed before open confirmation".into()))
                }
                _ => continue,
            }
        };

        let plain = SshForwardChannel { channel };
        if confirmation {
            let io = spawn_channel_io(plain);
            let secure = SecureStream::wrap_client(io, self.expected_host_keys.clone()).await?;
            Ok(Box::new(secure))
        } else {
            Ok(Box::new(plain))
        }
    }
}

async fn accept_loop(listener: TcpListener, context: ChannelOpenContext, remote_port: u16) {
    loop {
        let (socket, addr) = match listener.accept().await {
            Ok(pair) => pair,
            Err(e) => {
                log::debug!("local listener for port {} closed: {}", remote_port, e);
                return;
            }
        };

        let context = context.clone();
        tokio::spawn(async move {
            let originator = addr.ip().to_string();
            let channel = match context.open(remote_port, (&originator, addr.port())).await {
                Ok(c) => c,
                Err(e) => {
                    log::info!("failed to open forwarded channel for port {}: {}", remote_port, e);
                    return;
                }
            };

            forward(channel, socket).await;
        });
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use russh::client::Handler as _;

    #[tokio::test]
    async fn check_server_key_accepts_unlisted_when_no_keys_published() {
        let handler = ClientSshHandler {
            expected_host_keys: Vec::new(),
            key_mismatch: Arc::new(std::sync::atomic::AtomicBool::new(false)),
        };
        let mismatch = handler.key_mismatch.clone();
        let key = russh_keys::key::KeyPair::generate_ed25519()
            .expect("generate ed25519 keypair")
            .clone_public_key()
            .expect("derive public key");
        let (_, accepted) = handler.check_server_key(&key).await.unwrap();
        assert!(accepted);
        assert!(!mismatch.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[tokio::test]
    async fn check_server_key_rejects_key_not_in_published_list() {
        let other = russh_keys::key::KeyPair::generate_ed25519()
            .expect("generate ed25519 keypair")
            .clone_public_key()
            .expect("derive public key");
        let handler = ClientSshHandler {
            expected_host_keys: vec!["not-the-right-key".to_string()],
            key_mismatch: Arc::new(std::sync::atomic::AtomicBool::new(false)),
        };
        let mismatch = handler.key_mismatch.clone();
        let (_, accepted) = handler.check_server_key(&other).await.unwrap();
        assert!(!accepted);
        assert!(mismatch.load(std::sync::atomic::Ordering::SeqCst));
    }
}
