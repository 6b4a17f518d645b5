// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::management::Authorization;

use super::{
    errors::{classify_websocket_status, TunnelError},
    ws::build_websocket_request,
};

/// Opens a websocket to a relay endpoint, offering `subprotocols` in priority
/// order and authenticating with `authorization`. Returns the raw stream
/// together with whichever subprotocol the relay selected, so the caller
/// (the relay connection base, C8) can pick its v1/v2 behavior off of it.
///
/// HTTP-level upgrade failures are classified into the same `TunnelError`
/// variants a normal REST call would produce (401/403/404/429/502/503), so
/// callers can feed them through the same retry classification as any other
/// request.
pub(crate) async fn connect_relay_stream(
    url: &str,
    authorization: &Authorization,
    subprotocols: &[&str],
    user_agent: &str,
) -> Result<(WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>, String), TunnelError> {
    let offered = subprotocols.join(", ");
    let mut headers = vec![
        ("Sec-WebSocket-Protocol", offered.as_str()),
        ("User-Agent", user_agent),
    ];

    let auth_header = authorization.as_header();
    if let Some(auth_header) = &auth_header {
        headers.push(("Authorization", auth_header.as_str()));
    }

    let req = build_websocket_request(url, &headers)?;

    let (stream, response) = match connect_async(req).await {
        Ok(r) => r,
        Err(tungstenite::Error::Http(resp)) => {
            let status = reqwest::StatusCode::from_u16(resp.status().as_u16())
                .unwrap_or(reqwest::StatusCode::INTERNAL_SERVER_ERROR);
            return Err(classify_websocket_status(status));
        }
        Err(e) => return Err(TunnelError::WebSocketError(e)),
    };

    let negotiated = response
        .headers()
        .get("sec-websocket-protocol")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .ok_or_else(|| {
            TunnelError::ProtocolError("relay did not negotiate a websocket subprotocol".into())
        })?;

    Ok((stream, negotiated))
}

#[cfg(test)]
mod test {
    use tokio::net::TcpListener;
    use tokio_tungstenite::tungstenite::handshake::server::{Request, Response};

    use super::connect_relay_stream;
    use crate::{connections::errors::TunnelError, management::Authorization};

    #[tokio::test]
    async fn negotiates_highest_priority_supported_subprotocol() {
        let server = TcpListener::bind("127.0.0.1:0").await.expect("listen");
        let addr = server.local_addr().unwrap();

        tokio::spawn(async move {
            let (cnx, _) = server.accept().await.expect("accept");
            let callback = |req: &Request, mut resp: Response| {
                let offered = req
                    .headers()
                    .get("sec-websocket-protocol")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default();
                assert!(offered.contains("tunnel-relay-client-v2-dev"));
                resp.headers_mut().insert(
                    "sec-websocket-protocol",
                    "tunnel-relay-client-v2-dev".parse().unwrap(),
                );
                Ok(resp)
            };
            tokio_tungstenite::accept_hdr_async(cnx, callback)
                .await
                .expect("handshake");
        });

        let (_stream, negotiated) = connect_relay_stream(
            &format!("ws://{addr}"),
            &Authorization::Tunnel("tok".into()),
            &["tunnel-relay-client-v2-dev", "tunnel-relay-client"],
            "test-agent",
        )
        .await
        .expect("connect");

        assert_eq!(negotiated, "tunnel-relay-client-v2-dev");
    }

    #[tokio::test]
    async fn classifies_http_upgrade_failures() {
        let server = TcpListener::bind("127.0.0.1:0").await.expect("listen");
        let addr = server.local_addr().unwrap();

        tokio::spawn(async move {
            use tokio::io::AsyncWriteExt;
            let (mut cnx, _) = server.accept().await.expect("accept");
            cnx.write_all(b"HTTP/1.1 429 Too Many Requests\r\ncontent-length: 0\r\n\r\n")
                .await
                .ok();
        });

        let err = connect_relay_stream(
            &format!("ws://{addr}"),
            &Authorization::Anonymous,
            &["tunnel-relay-client"],
            "test-agent",
        )
        .await
        .expect_err("expected upgrade failure");

        assert!(matches!(err, TunnelError::ServiceNotAvailable { .. }));
    }
}
