// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

mod client;
mod connection;
mod connector;
mod errors;
mod forwarder;
mod host;
mod io;
mod listener;
mod multi_mode;
mod port_forward_messages;
mod registry;
mod relay_connection;
mod relay_stream;
mod secure_stream;
mod ws;

pub use client::{ClientHandle, TunnelClient};
pub use connection::ConnectionStatus;
pub use errors::{SshDisconnectReason, TunnelError};
pub use host::{ForwardedPortConnection, ForwardedPortRW, ForwardedPortReader, ForwardedPortWriter, Host, RelayHandle};
pub use multi_mode::{MultiModeClientHandle, MultiModeHostHandle, MultiModeTunnelClient, MultiModeTunnelHost};
pub use relay_connection::TunnelRelayConnectionOptions;
