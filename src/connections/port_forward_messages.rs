// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use super::errors::TunnelError;

/// Builds and parses the tunnel-specific fields appended after the base SSH
/// `tcpip-forward` / `direct-tcpip` / `forwarded-tcpip` message bodies (C5).
/// This module only ever touches the extension tail: the base fields
/// themselves are read and written by the SSH library.

fn write_string(out: &mut Vec<u8>, s: &str) {
    out.extend_from_slice(&(s.len() as u32).to_be_bytes());
    out.extend_from_slice(s.as_bytes());
}

fn read_string(buf: &[u8]) -> Result<(String, &[u8]), TunnelError> {
    if buf.len() < 4 {
        return Err(TunnelError::ProtocolError(
            "truncated port-forward message: missing string length".into(),
        ));
    }
    let len = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;
    let rest = &buf[4..];
    if rest.len() < len {
        return Err(TunnelError::ProtocolError(
            "truncated port-forward message: string shorter than declared length".into(),
        ));
    }
    let s = String::from_utf8(rest[..len].to_vec())
        .map_err(|e| TunnelError::ProtocolError(format!("invalid utf-8 in message: {e}")))?;
    Ok((s, &rest[len..]))
}

fn read_bool(buf: &[u8]) -> Result<(bool, &[u8]), TunnelError> {
    match buf.first() {
        Some(b) => Ok((*b != 0, &buf[1..])),
        None => Err(TunnelError::ProtocolError(
            "truncated port-forward message: missing boolean".into(),
        )),
    }
}

/// Extension tail of a `tcpip-forward` request: `string access_token`.
pub(crate) fn encode_port_forward_request(access_token: Option<&str>) -> Vec<u8> {
    let mut out = Vec::new();
    write_string(&mut out, access_token.unwrap_or(""));
    out
}

pub(crate) fn decode_port_forward_request(buf: &[u8]) -> Result<Option<String>, TunnelError> {
    let (token, _) = read_string(buf)?;
    Ok(if token.is_empty() { None } else { Some(token) })
}

/// Extension tail of a client-initiated channel open:
/// `string access_token, bool is_e2e_encryption_requested`.
pub(crate) fn encode_channel_open(access_token: Option<&str>, is_e2e_requested: bool) -> Vec<u8> {
    let mut out = Vec::new();
    write_string(&mut out, access_token.unwrap_or(""));
    out.push(is_e2e_requested as u8);
    out
}

pub(crate) fn decode_channel_open(buf: &[u8]) -> Result<(Option<String>, bool), TunnelError> {
    let (token, rest) = read_string(buf)?;
    let (requested, _) = read_bool(rest)?;
    Ok((if token.is_empty() { None } else { Some(token) }, requested))
}

/// Extension tail of the host's channel-open confirmation:
/// `bool is_e2e_encryption_enabled`.
pub(crate) fn encode_channel_open_confirmation(is_e2e_enabled: bool) -> Vec<u8> {
    vec![is_e2e_enabled as u8]
}

pub(crate) fn decode_channel_open_confirmation(buf: &[u8]) -> Result<bool, TunnelError> {
    let (enabled, _) = read_bool(buf)?;
    Ok(enabled)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn port_forward_request_round_trips() {
        let encoded = encode_port_forward_request(Some("tok-123"));
        assert_eq!(
            decode_port_forward_request(&encoded).unwrap(),
            Some("tok-123".to_string())
        );
    }

    #[test]
    fn empty_access_token_decodes_to_none() {
        let encoded = encode_port_forward_request(None);
        assert_eq!(decode_port_forward_request(&encoded).unwrap(), None);
    }

    #[test]
    fn channel_open_round_trips_token_and_flag() {
        let encoded = encode_channel_open(Some("abc"), true);
        let (token, requested) = decode_channel_open(&encoded).unwrap();
        assert_eq!(token, Some("abc".to_string()));
        assert!(requested);

        let encoded = encode_channel_open(None, false);
        let (token, requested) = decode_channel_open(&encoded).unwrap();
        assert_eq!(token, None);
        assert!(!requested);
    }

    #[test]
    fn channel_open_confirmation_round_trips() {
        assert!(decode_channel_open_confirmation(&encode_channel_open_confirmation(true)).unwrap());
        assert!(!decode_channel_open_confirmation(&encode_channel_open_confirmation(false)).unwrap());
    }

    #[test]
    fn truncated_string_length_is_a_protocol_error() {
        assert!(decode_port_forward_request(&[0, 0]).is_err());
    }

    #[test]
    fn truncated_string_body_is_a_protocol_error() {
        let mut buf = Vec::new();
        write_string(&mut buf, "hello");
        buf.truncate(buf.len() - 2);
        assert!(decode_port_forward_request(&buf).is_err());
    }

    #[test]
    fn missing_boolean_is_a_protocol_error() {
        let mut buf = Vec::new();
        write_string(&mut buf, "tok");
        assert!(decode_channel_open(&buf).is_err());
    }
}
