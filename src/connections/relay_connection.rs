// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use std::time::Duration;

use super::errors::SshDisconnectReason;

/// Negotiated tunnel wire protocol (spec §3, §6). Selected by the relay during
/// WebSocket subprotocol negotiation out of the client-offered list, or pinned
/// locally via `DEVTUNNELS_PROTOCOL_VERSION`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ConnectionProtocol {
    V1,
    V2,
}

/// Which side of the tunnel a connection is playing (spec §3's "connection role").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ConnectionRole {
    Client,
    Host,
}

impl ConnectionRole {
    /// The tunnel access scope this role's bearer token must carry.
    pub fn scope(self) -> &'static str {
        match self {
            ConnectionRole::Client => "connect",
            ConnectionRole::Host => "host",
        }
    }
}

const CLIENT_V1: &str = "tunnel-relay-client";
const CLIENT_V2: &str = "tunnel-relay-client-v2-dev";
const HOST_V1: &str = "tunnel-relay-host";
const HOST_V2: &str = "tunnel-relay-host-v2-dev";

/// Reads `DEVTUNNELS_PROTOCOL_VERSION` and returns the protocol it pins to, if
/// any (spec §6: `"1"` or `"2"`; any other value, or absent, means no pin).
pub(crate) fn protocol_version_override() -> Option<ConnectionProtocol> {
    match std::env::var("DEVTUNNELS_PROTOCOL_VERSION").as_deref() {
        Ok("1") => Some(ConnectionProtocol::V1),
        Ok("2") => Some(ConnectionProtocol::V2),
        _ => None,
    }
}

/// Builds the ordered list of subprotocols to offer the relay for `role`,
/// honoring `DEVTUNNELS_PROTOCOL_VERSION` when set (spec §4.8, §6). Default
/// preference order is v2 before v1.
pub(crate) fn subprotocols_for(role: ConnectionRole, pin: Option<ConnectionProtocol>) -> Vec<&'static str> {
    let (v1, v2) = match role {
        ConnectionRole::Client => (CLIENT_V1, CLIENT_V2),
        ConnectionRole::Host => (HOST_V1, HOST_V2),
    };

    match pin {
        Some(ConnectionProtocol::V1) => vec![v1],
        Some(ConnectionProtocol::V2) => vec![v2],
        None => vec![v2, v1],
    }
}

/// Maps a negotiated subprotocol string back to the protocol version it
/// implies, for either role.
pub(crate) fn protocol_from_subprotocol(subprotocol: &str) -> Option<ConnectionProtocol> {
    match subprotocol {
        CLIENT_V1 | HOST_V1 => Some(ConnectionProtocol::V1),
        CLIENT_V2 | HOST_V2 => Some(ConnectionProtocol::V2),
        _ => None,
    }
}

/// Key-exchange algorithm names, in preference order, for a v2 session (spec
/// §6): `none` is prepended and preferred because the relay's TLS already
/// protects the outer transport. v1 sessions use whatever the SSH library's
/// own default list is and are not affected by this function.
pub(crate) const V2_KEY_EXCHANGES: &[&str] = &[
    "none",
    "ecdh-sha2-nistp384",
    "ecdh-sha2-nistp256",
    "diffie-hellman-group16-sha512",
    "diffie-hellman-group14-sha256",
];

/// Options shared by `TunnelClient` and `TunnelHost` (spec §4.8, §7.2). Plain
/// struct with a `Default` impl, following the teacher's
/// `TunnelRequestOptions` convention -- this is a library, not a CLI, so there
/// is no on-disk config format.
#[derive(Clone, Debug)]
pub(crate) struct TunnelRelayConnectionOptions {
    /// Whether the retry engine (C6) retries at all; forced `Retry=false`
    /// when disabled (spec §4.6 step 4).
    pub enable_retry: bool,
    /// Whether a `ConnectionLost` SSH disconnect schedules a reconnect task
    /// (spec §4.8 "reconnect decision").
    pub enable_reconnect: bool,
    /// SSH keep-alive timeout; `0` disables keep-alive entirely.
    pub keep_alive_interval_seconds: u32,
    /// Overrides the SSH-requested local bind address for forwarded ports.
    pub local_forwarding_host_address: Option<std::net::IpAddr>,
    /// Client: whether a local TCP listener is bound per forwarded port.
    pub accept_local_connections_for_forwarded_ports: bool,
    /// Host: whether `ForwardedPortConnecting` results in a local TCP
    /// connection, or only the event.
    pub forward_connections_to_local_ports: bool,
    /// Whether this side offers/accepts per-channel E2E encryption.
    pub enable_e2e_encryption: bool,
}

impl Default for TunnelRelayConnectionOptions {
    fn default() -> Self {
        TunnelRelayConnectionOptions {
            enable_retry: true,
            enable_reconnect: true,
            keep_alive_interval_seconds: 0,
            local_forwarding_host_address: None,
            accept_local_connections_for_forwarded_ports: true,
            forward_connections_to_local_ports: true,
            enable_e2e_encryption: false,
        }
    }
}

impl TunnelRelayConnectionOptions {
    pub fn keep_alive_timeout(&self) -> Option<Duration> {
        if self.keep_alive_interval_seconds > 0 {
            Some(Duration::from_secs(self.keep_alive_interval_seconds as u64))
        } else {
            None
        }
    }
}

/// Tracks consecutive keep-alive failures/successes so repeated identical
/// events can be reported with an occurrence count rather than spamming one
/// event per keep-alive probe (spec §4.8 "each carrying a count of same-state
/// messages").
#[derive(Default)]
pub(crate) struct KeepAliveTracker {
    last_failed: Option<bool>,
    streak: u32,
}

pub(crate) enum KeepAliveReport {
    Failed(u32),
    Succeeded(u32),
}

impl KeepAliveTracker {
    pub fn new() -> Self {
        KeepAliveTracker::default()
    }

    pub fn record(&mut self, failed: bool) -> KeepAliveReport {
        if self.last_failed == Some(failed) {
            self.streak += 1;
        } else {
            self.last_failed = Some(failed);
            self.streak = 1;
        }

        if failed {
            KeepAliveReport::Failed(self.streak)
        } else {
            KeepAliveReport::Succeeded(self.streak)
        }
    }
}

/// Maps an SSH session close into the disconnect reason recorded on the
/// connection (spec §4.8 "disconnect cause"). `was_dispose` distinguishes a
/// caller-initiated close from one the peer/transport initiated.
pub(crate) fn disconnect_reason_for_close(
    was_dispose: bool,
    too_many_connections: bool,
    service_unavailable: bool,
    connection_lost: bool,
) -> SshDisconnectReason {
    if was_dispose {
        SshDisconnectReason::ByApplication
    } else if too_many_connections {
        SshDisconnectReason::TooManyConnections
    } else if service_unavailable {
        SshDisconnectReason::ServiceNotAvailable
    } else if connection_lost {
        SshDisconnectReason::ConnectionLost
    } else {
        SshDisconnectReason::ProtocolError
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_offer_order_is_v2_then_v1() {
        assert_eq!(
            subprotocols_for(ConnectionRole::Client, None),
            vec!["tunnel-relay-client-v2-dev", "tunnel-relay-client"]
        );
        assert_eq!(
            subprotocols_for(ConnectionRole::Host, None),
            vec!["tunnel-relay-host-v2-dev", "tunnel-relay-host"]
        );
    }

    #[test]
    fn pinned_protocol_offers_only_that_version() {
        assert_eq!(
            subprotocols_for(ConnectionRole::Client, Some(ConnectionProtocol::V1)),
            vec!["tunnel-relay-client"]
        );
        assert_eq!(
            subprotocols_for(ConnectionRole::Host, Some(ConnectionProtocol::V2)),
            vec!["tunnel-relay-host-v2-dev"]
        );
    }

    #[test]
    fn subprotocol_round_trips_to_protocol_version() {
        assert_eq!(
            protocol_from_subprotocol("tunnel-relay-client-v2-dev"),
            Some(ConnectionProtocol::V2)
        );
        assert_eq!(
            protocol_from_subprotocol("tunnel-relay-host"),
            Some(ConnectionProtocol::V1)
        );
        assert_eq!(protocol_from_subprotocol("unknown"), None);
    }

    #[test]
    fn keep_alive_tracker_counts_streaks() {
        let mut tracker = KeepAliveTracker::new();
        assert!(matches!(tracker.record(true), KeepAliveReport::Failed(1)));
        assert!(matches!(tracker.record(true), KeepAliveReport::Failed(2)));
        assert!(matches!(
            tracker.record(false),
            KeepAliveReport::Succeeded(1)
        ));
        assert!(matches!(
            tracker.record(false),
            KeepAliveReport::Succeeded(2)
        ));
    }

    #[test]
    fn disconnect_reason_prioritizes_dispose_then_too_many_connections() {
        assert_eq!(
            disconnect_reason_for_close(true, true, true, true),
            SshDisconnectReason::ByApplication
        );
        assert_eq!(
            disconnect_reason_for_close(false, true, true, true),
            SshDisconnectReason::TooManyConnections
        );
        assert_eq!(
            disconnect_reason_for_close(false, false, false, true),
            SshDisconnectReason::ConnectionLost
        );
        assert_eq!(
            disconnect_reason_for_close(false, false, false, false),
            SshDisconnectReason::ProtocolError
        );
    }
}
