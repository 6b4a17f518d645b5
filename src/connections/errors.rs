// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use reqwest::StatusCode;
use thiserror::Error;

/// Type of error returned from tunnel operations.
#[derive(Debug, Error)]
pub enum TunnelError {
    #[error("{reason}: {error}")]
    HttpError {
        error: crate::management::HttpError,
        reason: &'static str,
    },

    #[error("the tunnel relay was disconnected: {0}")]
    TunnelRelayDisconnected(#[from] russh::Error),

    #[error("the tunnel host relay endpoint URI is missing")]
    MissingHostEndpoint,

    #[error("invalid host relay uri: {0}")]
    InvalidHostEndpoint(String),

    #[error("websocket error: {0}")]
    WebSocketError(#[from] tungstenite::Error),

    #[error("port {0} already exists in the relay")]
    PortAlreadyExists(u32),

    #[error("proxy connection failed: {0}")]
    ProxyConnectionFailed(std::io::Error),

    #[error("proxy address invalid: {0}")]
    ProxyAddressInvalid(url::ParseError),

    #[error("proxy handshake failed: {0}")]
    ProxyHandshakeFailed(hyper::Error),

    #[error("proxy connect request failed: {0}")]
    ProxyConnectRequestFailed(hyper::Error),

    /// The access token is missing, invalid, or expired. Recoverable exactly once
    /// per `ConnectSession` attempt, via a token refresh.
    #[error("unauthorized{}", status_suffix(*.status))]
    Unauthorized { status: Option<StatusCode> },

    /// The tunnel or port does not exist. Fatal.
    #[error("not found{}", status_suffix(*.status))]
    NotFound { status: Option<StatusCode> },

    /// The caller's token doesn't carry the required scope. Fatal.
    #[error("forbidden{}", status_suffix(*.status))]
    Forbidden { status: Option<StatusCode> },

    /// The relay asked us to slow down (429), or is temporarily down (502/503).
    /// Recoverable with a long, capped backoff.
    #[error("service busy or unavailable{}", status_suffix(*.status))]
    ServiceNotAvailable { status: Option<StatusCode> },

    /// The transport dropped mid-session. Recoverable if reconnect is enabled.
    #[error("connection lost: {0}")]
    ConnectionLost(String),

    /// Malformed SSH or WebSocket behavior that retrying cannot fix. Fatal.
    #[error("protocol error: {0}")]
    ProtocolError(String),

    /// Another host connected for the same tunnel (host side), or too many
    /// clients connected (client side). Fatal for the losing side.
    #[error("too many connections: {0}")]
    TooManyConnections(String),

    /// The host's presented public key didn't match the endpoint's published
    /// keys, even after refreshing the tunnel. Fatal.
    #[error("host key mismatch: presented key not recognized for this tunnel")]
    HostKeyMismatch,

    /// The caller canceled the operation.
    #[error("operation canceled")]
    Canceled,

    /// The connection (or a dependency of it) has already been disposed.
    #[error("object disposed")]
    Disposed,

    /// Any other invalid-usage condition (bad arguments, calling an API twice
    /// that only supports being called once, etc). Never retried.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
}

fn status_suffix(status: Option<StatusCode>) -> String {
    match status {
        Some(s) => format!(" (HTTP {})", s.as_u16()),
        None => String::new(),
    }
}

impl TunnelError {
    /// The HTTP status code associated with this error, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            TunnelError::Unauthorized { status } => *status,
            TunnelError::NotFound { status } => *status,
            TunnelError::Forbidden { status } => *status,
            TunnelError::ServiceNotAvailable { status } => *status,
            TunnelError::HttpError { error, .. } => match error {
                crate::management::HttpError::ResponseError(r) => Some(r.status_code),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Disconnect reasons recorded by the relay connection base (C8) and surfaced
/// through `ConnectionStatusChanged`/telemetry. Mirrors `SshDisconnectReason`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SshDisconnectReason {
    #[default]
    None,
    ConnectionLost,
    ByApplication,
    TooManyConnections,
    ServiceNotAvailable,
    ProtocolError,
}

/// The retry engine's classification of a failed connect attempt (spec.md
/// §4.6, §7). Kept as plain data so the classification rules are unit-testable
/// without any actual I/O.
#[derive(Debug, PartialEq, Eq)]
pub enum ErrorClassification {
    /// Refresh the tunnel access token and retry immediately (at most once per
    /// `ConnectSession` call).
    RefreshTokenAndRetry,
    /// Retry after the connector's normal exponential backoff.
    RetryWithBackoff,
    /// Retry after at least `min_delay_ms`, and stop after `max_attempts` total
    /// attempts (429/502/503 handling).
    RetryWithMinDelay { min_delay_ms: u64, max_attempts: u32 },
    /// Fall back from an SSH-reconnect attempt to a fresh connect, retrying
    /// immediately.
    FallBackToFreshConnect,
    /// Stop retrying and surface the error to the caller.
    Fatal,
}

/// Classifies an error from one connect attempt into a retry decision, per
/// spec.md §4.6 step 3. `token_already_refreshed` models "at most once per
/// `ConnectSession` call" (testable property 2).
pub fn classify(error: &TunnelError, token_already_refreshed: bool) -> ErrorClassification {
    match error {
        TunnelError::Unauthorized { .. } => {
            if token_already_refreshed {
                ErrorClassification::Fatal
            } else {
                ErrorClassification::RefreshTokenAndRetry
            }
        }
        TunnelError::Forbidden { .. } => ErrorClassification::Fatal,
        TunnelError::NotFound { .. } => ErrorClassification::Fatal,
        TunnelError::ServiceNotAvailable { .. } => ErrorClassification::RetryWithMinDelay {
            min_delay_ms: 6_400,
            max_attempts: 3,
        },
        TunnelError::ConnectionLost(_) => ErrorClassification::RetryWithBackoff,
        TunnelError::ProtocolError(_) => ErrorClassification::Fatal,
        TunnelError::TooManyConnections(_) => ErrorClassification::Fatal,
        TunnelError::HostKeyMismatch => ErrorClassification::Fatal,
        TunnelError::Canceled => ErrorClassification::Fatal,
        TunnelError::Disposed => ErrorClassification::Fatal,
        TunnelError::InvalidOperation(_) => ErrorClassification::Fatal,
        // Anything else we don't have a specific classification for (e.g. a raw
        // websocket hiccup, or an SSH error whose reason we couldn't
        // subdivide) is treated as recoverable, matching "anything else:
        // recoverable".
        _ => ErrorClassification::RetryWithBackoff,
    }
}

/// Maps a websocket upgrade failure's HTTP status to a `TunnelError`, per
/// spec.md §4.6 ("NotAWebSocket with HTTP status").
pub fn classify_websocket_status(status: StatusCode) -> TunnelError {
    match status.as_u16() {
        401 => TunnelError::Unauthorized {
            status: Some(status),
        },
        403 => TunnelError::Forbidden {
            status: Some(status),
        },
        404 => TunnelError::NotFound {
            status: Some(status),
        },
        429 | 502 | 503 => TunnelError::ServiceNotAvailable {
            status: Some(status),
        },
        _ => TunnelError::ProtocolError(format!("unexpected websocket upgrade status {status}")),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn unauthorized_refreshes_once() {
        let err = TunnelError::Unauthorized { status: None };
        assert_eq!(
            classify(&err, false),
            ErrorClassification::RefreshTokenAndRetry
        );
        assert_eq!(classify(&err, true), ErrorClassification::Fatal);
    }

    #[test]
    fn service_unavailable_has_long_capped_backoff() {
        let err = TunnelError::ServiceNotAvailable { status: None };
        assert_eq!(
            classify(&err, false),
            ErrorClassification::RetryWithMinDelay {
                min_delay_ms: 6_400,
                max_attempts: 3,
            }
        );
    }

    #[test]
    fn connection_lost_retries_with_backoff() {
        let err = TunnelError::ConnectionLost("blip".into());
        assert_eq!(classify(&err, false), ErrorClassification::RetryWithBackoff);
    }

    #[test]
    fn protocol_errors_are_fatal() {
        assert_eq!(
            classify(&TunnelError::ProtocolError("bad frame".into()), false),
            ErrorClassification::Fatal
        );
        assert_eq!(
            classify(&TunnelError::HostKeyMismatch, false),
            ErrorClassification::Fatal
        );
    }

    #[test]
    fn websocket_status_mapping() {
        assert!(matches!(
            classify_websocket_status(StatusCode::UNAUTHORIZED),
            TunnelError::Unauthorized { .. }
        ));
        assert!(matches!(
            classify_websocket_status(StatusCode::TOO_MANY_REQUESTS),
            TunnelError::ServiceNotAvailable { .. }
        ));
        assert!(matches!(
            classify_websocket_status(StatusCode::IM_A_TEAPOT),
            TunnelError::ProtocolError(_)
        ));
    }
}
