// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use std::sync::OnceLock;

use futures::future::join_all;
use uuid::Uuid;

use crate::{
    contracts::TunnelPort,
    management::{TunnelLocator, TunnelManagementClient},
};

use super::{
    client::{ClientHandle, TunnelClient},
    errors::TunnelError,
    forwarder::ForwardChannel,
    host::{Host, RelayHandle},
    relay_connection::TunnelRelayConnectionOptions,
};

/// `MultiModeTunnelHost.HostId` (spec §9 "Global state"): a single GUID
/// shared by every `Host` this process creates, assigned lazily on first use
/// and never torn down.
fn process_host_id() -> Uuid {
    static HOST_ID: OnceLock<Uuid> = OnceLock::new();
    *HOST_ID.get_or_init(Uuid::new_v4)
}

/// Fans `connect`/`dispose`/`refresh_ports` out across every wrapped `Host`
/// in parallel (C11, spec §4.11). Used when one tunnel is hosted from several
/// relay endpoints at once -- e.g. one host process serving both a v1 and a
/// v2 endpoint, or several regional relays.
pub struct MultiModeTunnelHost {
    hosts: Vec<Host>,
}

impl MultiModeTunnelHost {
    pub fn new() -> Self {
        MultiModeTunnelHost { hosts: Vec::new() }
    }

    /// Adds a host for `locator`, sharing this process's host id with every
    /// other host already added.
    pub fn add_host(&mut self, locator: TunnelLocator, mgmt: TunnelManagementClient, options: TunnelRelayConnectionOptions) {
        self.hosts.push(Host::with_host_id(locator, mgmt, options, process_host_id()));
    }

    pub fn hosts(&self) -> &[Host] {
        &self.hosts
    }

    /// Connects every wrapped host in parallel. Succeeds if at least one
    /// host connects; the first failure is returned only if all of them
    /// failed (spec §4.11 "joins failures").
    pub async fn connect(&mut self, host_token: &str) -> Result<MultiModeHostHandle, TunnelError> {
        let results = join_all(self.hosts.iter_mut().map(|h| h.connect(host_token))).await;

        let mut handles = Vec::new();
        let mut first_error = None;
        for result in results {
            match result {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        if handles.is_empty() {
            return Err(first_error.unwrap_or(TunnelError::MissingHostEndpoint));
        }

        Ok(MultiModeHostHandle { handles })
    }

    /// Re-fetches and reconciles ports on every wrapped host in parallel.
    pub async fn refresh_ports(&self) -> Result<(), TunnelError> {
        let results = join_all(self.hosts.iter().map(|h| h.refresh_ports())).await;
        results.into_iter().collect::<Result<Vec<()>, _>>().map(|_| ())
    }

    pub async fn dispose(&self) -> Result<(), TunnelError> {
        join_all(self.hosts.iter().map(|h| h.dispose())).await;
        Ok(())
    }
}

impl Default for MultiModeTunnelHost {
    fn default() -> Self {
        Self::new()
    }
}

/// The joined result of [`MultiModeTunnelHost::connect`]: one [`RelayHandle`]
/// per host that connected successfully.
pub struct MultiModeHostHandle {
    handles: Vec<RelayHandle>,
}

impl MultiModeHostHandle {
    pub fn endpoints(&self) -> impl Iterator<Item = &crate::contracts::TunnelRelayTunnelEndpoint> {
        self.handles.iter().map(|h| h.endpoint())
    }

    pub async fn close(self) -> Result<(), TunnelError> {
        let results = join_all(self.handles.into_iter().map(|h| h.close())).await;
        results.into_iter().collect::<Result<Vec<()>, _>>().map(|_| ())
    }
}

/// Fans `connect`/`dispose` out across every wrapped `TunnelClient` in
/// parallel; `wait_for_forwarded_port`/`connect_to_forwarded_port` race
/// across the wrapped clients' handles instead of broadcasting, since a
/// forwarded connection is served by exactly one of them (spec §9 open
/// question: the original leaves these three unimplemented, so this mirrors
/// the host-side aggregator's fan-out rather than guessing new semantics).
pub struct MultiModeTunnelClient {
    clients: Vec<TunnelClient>,
}

impl MultiModeTunnelClient {
    pub fn new() -> Self {
        MultiModeTunnelClient { clients: Vec::new() }
    }

    pub fn add_client(&mut self, client: TunnelClient) {
        self.clients.push(client);
    }

    pub fn clients(&self) -> &[TunnelClient] {
        &self.clients
    }

    /// True if any wrapped client accepts local connections for forwarded
    /// ports (spec §4.11).
    pub fn accept_local_connections_for_forwarded_ports(&self) -> bool {
        self.clients
            .iter()
            .any(|c| c.accept_local_connections_for_forwarded_ports())
    }

    /// Propagates the flag to every wrapped client.
    pub fn set_accept_local_connections_for_forwarded_ports(&mut self, value: bool) {
        for client in &mut self.clients {
            client.set_accept_local_connections_for_forwarded_ports(value);
        }
    }

    pub async fn connect(&self, access_token: &str) -> Result<MultiModeClientHandle, TunnelError> {
        let results = join_all(self.clients.iter().map(|c| c.connect(access_token))).await;

        let mut handles = Vec::new();
        let mut first_error = None;
        for (index, result) in results.into_iter().enumerate() {
            match result {
                Ok(handle) => handles.push((index, handle)),
                Err(e) => {
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        if handles.is_empty() {
            return Err(first_error.unwrap_or(TunnelError::MissingHostEndpoint));
        }

        Ok(MultiModeClientHandle { handles })
    }

    /// Tries `wait_for_forwarded_port` against each connected client in turn,
    /// returning the first success.
    pub async fn wait_for_forwarded_port(
        &self,
        handle: &MultiModeClientHandle,
        port: &TunnelPort,
        can_change_port: bool,
    ) -> Result<u16, TunnelError> {
        let mut last_error = None;
        for (client, client_handle) in self.matched(handle) {
            match client.wait_for_forwarded_port(client_handle, port, can_change_port).await {
                Ok(local_port) => return Ok(local_port),
                Err(e) => last_error = Some(e),
            }
        }
        Err(last_error.unwrap_or(TunnelError::MissingHostEndpoint))
    }

    /// Tries `connect_to_forwarded_port` against each connected client in
    /// turn, returning the first success.
    pub async fn connect_to_forwarded_port(
        &self,
        handle: &MultiModeClientHandle,
        remote_port: u16,
    ) -> Result<impl ForwardChannel, TunnelError> {
        let mut last_error = None;
        for (client, client_handle) in self.matched(handle) {
            match client.connect_to_forwarded_port(client_handle, remote_port).await {
                Ok(channel) => return Ok(channel),
                Err(e) => last_error = Some(e),
            }
        }
        Err(last_error.unwrap_or(TunnelError::MissingHostEndpoint))
    }

    pub async fn dispose(&self) -> Result<(), TunnelError> {
        join_all(self.clients.iter().map(|c| c.dispose())).await;
        Ok(())
    }

    /// Pairs each client that owns one of `handle`'s handles back up with it.
    /// `MultiModeClientHandle` only keeps the client's index into `self.clients`
    /// (not a borrow) since `ClientHandle` itself isn't `Clone`.
    fn matched<'a>(&'a self, handle: &'a MultiModeClientHandle) -> impl Iterator<Item = (&'a TunnelClient, &'a ClientHandle)> {
        handle
            .handles
            .iter()
            .filter_map(move |(index, h)| self.clients.get(*index).map(|client| (client, h)))
    }
}

impl Default for MultiModeTunnelClient {
    fn default() -> Self {
        Self::new()
    }
}

/// The joined result of [`MultiModeTunnelClient::connect`]: one
/// [`ClientHandle`] per client that connected successfully, paired with the
/// client it came from so later calls can route back to the right one.
pub struct MultiModeClientHandle {
    handles: Vec<(usize, ClientHandle)>,
}

impl MultiModeClientHandle {
    pub async fn close(self) -> Result<(), TunnelError> {
        let results = join_all(self.handles.into_iter().map(|(_, h)| h.close())).await;
        results.into_iter().collect::<Result<Vec<()>, _>>().map(|_| ())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn process_host_id_is_stable_across_calls() {
        assert_eq!(process_host_id(), process_host_id());
    }

    #[test]
    fn new_aggregates_start_empty() {
        assert!(MultiModeTunnelHost::new().hosts().is_empty());
        assert!(MultiModeTunnelClient::new().clients().is_empty());
    }

    #[test]
    fn accept_local_connections_is_false_with_no_clients() {
        assert!(!MultiModeTunnelClient::new().accept_local_connections_for_forwarded_ports());
    }
}
