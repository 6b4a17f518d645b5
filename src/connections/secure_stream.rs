// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use std::sync::Arc;

use futures::FutureExt;
use tokio::io::{AsyncRead, AsyncWrite};

use super::errors::TunnelError;

/// Per-channel end-to-end encryption (spec §4.10): a real SSH key exchange run
/// *inside* an already-open `forwarded-tcpip` channel, on top of whatever that
/// channel's own transport security (or lack of it, in v2) provides. This is
/// the same "run a nested SSH session over something that's merely
/// `AsyncRead + AsyncWrite`" trick the v1 host uses for
/// `client-ssh-session-stream`, just applied per forwarded connection instead
/// of per client session.
///
/// Negotiation is carried in the `is_e2e_encryption_requested` /
/// `is_e2e_encryption_enabled` fields appended to the channel-open and
/// channel-open-confirmation messages (`port_forward_messages`); this module
/// only runs the nested handshake once both sides have already agreed to it.
pub(crate) struct SecureStream;

impl SecureStream {
    /// Host side: runs a nested SSH *server* handshake over `inner`, using the
    /// host's own keypair so the client can verify it the same way it would
    /// the outer v1 session. Returns a transport that reads/writes the
    /// decrypted application bytes.
    pub async fn wrap_host(
        inner: impl AsyncRead + AsyncWrite + Unpin + Send + 'static,
        host_keypair: russh_keys::key::KeyPair,
    ) -> Result<SecureChannel, TunnelError> {
        let config = Arc::new(russh::server::Config {
            keys: vec![host_keypair],
            ..Default::default()
        });

        let (handler, mut opened_rx, data_rx) = SecureHandler::new();
        let session = russh::server::run_stream(config, inner, handler)
            .await
            .map_err(TunnelError::TunnelRelayDisconnected)?;

        let channel_id = opened_rx
            .recv()
            .await
            .ok_or_else(|| TunnelError::ProtocolError("secure stream closed before opening a channel".into()))?;

        Ok(SecureChannel {
            handle: SecureHandle::Server(session.handle()),
            channel_id,
            incoming: data_rx,
        })
    }

    /// Client side: runs a nested SSH *client* handshake over `inner`,
    /// verifying the server key against the tunnel's published host keys
    /// (spec §4.9's host-key verification, reapplied at the per-channel
    /// level).
    pub async fn wrap_client(
        inner: impl AsyncRead + AsyncWrite + Unpin + Send + 'static,
        expected_host_keys: Vec<String>,
    ) -> Result<SecureChannel, TunnelError> {
        let config = Arc::new(russh::client::Config::default());
        let (handler, rx) = SecureClientHandler::new(expected_host_keys);
        let mut session = russh::client::connect_stream(config, inner, handler)
            .await
            .map_err(TunnelError::TunnelRelayDisconnected)?;

        let channel = session
            .channel_open_session()
            .await
            .map_err(TunnelError::TunnelRelayDisconnected)?;

        Ok(SecureChannel {
            handle: SecureHandle::Client(Arc::new(session)),
            channel_id: channel.id(),
            incoming: rx,
        })
    }
}

enum SecureHandle {
    Server(russh::server::Handle),
    Client(Arc<russh::client::Handle<SecureClientHandler>>),
}

/// The decrypted byte stream once a per-channel E2EE handshake completes.
/// Implements neither `AsyncRead` nor `AsyncWrite` directly -- callers drive
/// it through `send`/`recv`, matching the `ForwardChannel` trait's shape so it
/// can feed the same `forward()` loop as any other channel.
pub(crate) struct SecureChannel {
    handle: SecureHandle,
    channel_id: russh::ChannelId,
    incoming: tokio::sync::mpsc::UnboundedReceiver<Vec<u8>>,
}

#[async_trait::async_trait]
impl super::forwarder::ForwardChannel for SecureChannel {
    async fn send(&mut self, data: &[u8]) -> Result<(), ()> {
        let result = match &self.handle {
            SecureHandle::Server(h) => h.data(self.channel_id, russh::CryptoVec::from_slice(data)).await,
            SecureHandle::Client(h) => h.data(self.channel_id, russh::CryptoVec::from_slice(data)).await,
        };
        result.map_err(|_| ())
    }

    async fn recv(&mut self) -> Option<Vec<u8>> {
        self.incoming.recv().await
    }

    async fn close_gracefully(&mut self) {
        match &self.handle {
            SecureHandle::Server(h) => {
                h.close(self.channel_id).await.ok();
            }
            SecureHandle::Client(h) => {
                h.close(self.channel_id).await.ok();
            }
        };
    }

    async fn abort(&mut self, reason: &str) {
        log::debug!("aborting secure stream channel: {}", reason);
        self.close_gracefully().await;
    }
}

struct SecureHandler {
    opened: tokio::sync::mpsc::UnboundedSender<russh::ChannelId>,
    data: tokio::sync::mpsc::UnboundedSender<Vec<u8>>,
}

impl SecureHandler {
    fn new() -> (
        Self,
        tokio::sync::mpsc::UnboundedReceiver<russh::ChannelId>,
        tokio::sync::mpsc::UnboundedReceiver<Vec<u8>>,
    ) {
        let (opened_tx, opened_rx) = tokio::sync::mpsc::unbounded_channel();
        let (data_tx, data_rx) = tokio::sync::mpsc::unbounded_channel();
        (
            SecureHandler {
                opened: opened_tx,
                data: data_tx,
            },
            opened_rx,
            data_rx,
        )
    }
}

impl russh::server::Handler for SecureHandler {
    type Error = russh::Error;
    type FutureAuth = futures::future::Ready<Result<(Self, russh::server::Auth), Self::Error>>;
    type FutureUnit = futures::future::Ready<Result<(Self, russh::server::Session), Self::Error>>;
    type FutureBool = futures::future::Ready<Result<(Self, russh::server::Session, bool), Self::Error>>;

    fn finished_auth(self, auth: russh::server::Auth) -> Self::FutureAuth {
        futures::future::ready(Ok((self, auth)))
    }
    fn finished_bool(self, b: bool, s: russh::server::Session) -> Self::FutureBool {
        futures::future::ready(Ok((self, s, b)))
    }
    fn finished(self, s: russh::server::Session) -> Self::FutureUnit {
        futures::future::ready(Ok((self, s)))
    }

    fn auth_none(self, _user: &str) -> Self::FutureAuth {
        self.finished_auth(russh::server::Auth::Accept)
    }

    fn channel_open_session(mut self, channel: russh::Channel<russh::server::Msg>, session: russh::server::Session) -> Self::FutureBool {
        self.opened.send(channel.id()).ok();
        self.finished_bool(true, session)
    }

    fn data(mut self, channel: russh::ChannelId, data: &[u8], session: russh::server::Session) -> Self::FutureUnit {
        self.data.send(data.to_vec()).ok();
        let _ = channel;
        self.finished(session)
    }
}

struct SecureClientHandler {
    expected_host_keys: Vec<String>,
    data: tokio::sync::mpsc::UnboundedSender<Vec<u8>>,
}

impl SecureClientHandler {
    fn new(expected_host_keys: Vec<String>) -> (Self, tokio::sync::mpsc::UnboundedReceiver<Vec<u8>>) {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        (
            SecureClientHandler {
                expected_host_keys,
                data: tx,
            },
            rx,
        )
    }
}

impl russh::client::Handler for SecureClientHandler {
    type Error = russh::Error;
    type FutureUnit = futures::future::Ready<Result<(Self, russh::client::Session), russh::Error>>;
    type FutureBool = futures::future::Ready<Result<(Self, bool), russh::Error>>;

    fn finished_bool(self, b: bool) -> Self::FutureBool {
        futures::future::ready(Ok((self, b)))
    }
    fn finished(self, session: russh::client::Session) -> Self::FutureUnit {
        futures::future::ready(Ok((self, session)))
    }

    /// Verifies the nested handshake's key against the tunnel's published
    /// host keys, same as the outer v1 session would (spec §4.9).
    fn check_server_key(self, server_public_key: &russh_keys::key::PublicKey) -> Self::FutureBool {
        use russh_keys::PublicKeyBase64;
        let presented = server_public_key.public_key_base64();
        let ok = self.expected_host_keys.is_empty() || self.expected_host_keys.iter().any(|k| k == &presented);
        self.finished_bool(ok)
    }

    fn data(self, channel: russh::ChannelId, data: &[u8], session: russh::client::Session) -> Self::FutureUnit {
        self.data.send(data.to_vec()).ok();
        let _ = channel;
        self.finished(session)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn host_key_check_accepts_empty_allowlist() {
        // Mirrors the "no endpoint keys published yet" case -- first connect
        // has nothing to compare against, so anything is provisionally
        // accepted and the check happens again after a tunnel refresh.
        let (handler, _rx) = SecureClientHandler::new(vec![]);
        assert!(handler.expected_host_keys.is_empty());
    }
}
