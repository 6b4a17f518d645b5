// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.
// Generated from ../../../cs/src/Contracts/TunnelRelayTunnelEndpoint.cs

use crate::contracts::TunnelEndpoint;
use serde::{Deserialize, Serialize};

// Parameters for connecting to a tunnel via the tunnel service's built-in relay function.
//
// `host_relay_uri`/`client_relay_uri` live on the flattened `base` (see
// `TunnelEndpoint`) rather than as separate fields here, so the same two JSON
// properties are reachable whether a caller holds this type or the base one.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all(serialize = "camelCase", deserialize = "camelCase"))]
pub struct TunnelRelayTunnelEndpoint {
    #[serde(flatten)]
    pub base: TunnelEndpoint,
}

impl TunnelRelayTunnelEndpoint {
    pub fn host_relay_uri(&self) -> Option<&str> {
        self.base.host_relay_uri.as_deref()
    }

    pub fn client_relay_uri(&self) -> Option<&str> {
        self.base.client_relay_uri.as_deref()
    }
}
