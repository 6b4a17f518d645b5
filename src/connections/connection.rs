// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use std::sync::Arc;

use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
};

use crate::contracts::Tunnel;

use super::errors::{SshDisconnectReason, TunnelError};

/// Connection status (spec §3): five-valued, with `Disconnected` terminal
/// once reached after dispose.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    None,
    Connecting,
    RefreshingTunnelAccessToken,
    RefreshingTunnelHostPublicKey,
    Connected,
    Disconnected,
}

struct Inner {
    status: ConnectionStatus,
    disconnect_cause: Option<SshDisconnectReason>,
    tunnel: Option<Tunnel>,
    disposed: bool,
}

/// Owns connection status, disconnect cause, the assigned tunnel, and the
/// singleton reconnect task (C7). Status transitions are serialized under
/// the same lock that guards disposal, so the dispose flag can never flip
/// mid-assignment (spec §4.7/§5).
pub(crate) struct TunnelConnectionBase {
    inner: Mutex<Inner>,
    status_tx: watch::Sender<ConnectionStatus>,
    reconnect_task: Mutex<Option<JoinHandle<()>>>,
}

impl TunnelConnectionBase {
    pub fn new() -> Self {
        let (status_tx, _) = watch::channel(ConnectionStatus::None);
        TunnelConnectionBase {
            inner: Mutex::new(Inner {
                status: ConnectionStatus::None,
                disconnect_cause: None,
                tunnel: None,
                disposed: false,
            }),
            status_tx,
            reconnect_task: Mutex::new(None),
        }
    }

    pub async fn status(&self) -> ConnectionStatus {
        self.inner.lock().await.status
    }

    pub async fn disconnect_cause(&self) -> Option<SshDisconnectReason> {
        self.inner.lock().await.disconnect_cause
    }

    pub fn subscribe_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status_tx.subscribe()
    }

    /// Sets a new status, unless the connection is disposed, in which case
    /// any attempted transition collapses back to `Disconnected` (testable
    /// property 3). Entering `Connected` clears the stored disconnect cause.
    pub async fn set_status(&self, new_status: ConnectionStatus) {
        let mut inner = self.inner.lock().await;
        let resolved = if inner.disposed {
            ConnectionStatus::Disconnected
        } else {
            new_status
        };

        if resolved == ConnectionStatus::Connected {
            inner.disconnect_cause = None;
        }

        if inner.status != resolved {
            log::info!("tunnel connection status: {:?} -> {:?}", inner.status, resolved);
            inner.status = resolved;
            self.status_tx.send_replace(resolved);
        }
    }

    pub async fn set_disconnect_cause(&self, cause: SshDisconnectReason) {
        self.inner.lock().await.disconnect_cause = Some(cause);
    }

    pub async fn assign_tunnel(&self, tunnel: Tunnel) {
        self.inner.lock().await.tunnel = Some(tunnel);
    }

    pub async fn tunnel(&self) -> Option<Tunnel> {
        self.inner.lock().await.tunnel.clone()
    }

    pub async fn had_tunnel_before(&self) -> bool {
        self.inner.lock().await.tunnel.is_some()
    }

    /// Schedules `task` as the reconnect task, unless disposed or one is
    /// already running (spec §4.7/testable property 4: at most one reconnect
    /// task exists per connection at any instant).
    pub async fn start_reconnect_task_if_not_disposed<F>(
        self: &Arc<Self>,
        spawn: impl FnOnce() -> F,
    ) where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let disposed = self.inner.lock().await.disposed;
        if disposed {
            return;
        }

        let mut slot = self.reconnect_task.lock().await;
        if let Some(existing) = slot.as_ref() {
            if !existing.is_finished() {
                return;
            }
        }

        *slot = Some(tokio::spawn(spawn()));
    }

    /// Cancels any in-flight reconnect task and terminally transitions to
    /// `Disconnected`. Idempotent.
    pub async fn dispose(&self) -> Result<(), TunnelError> {
        {
            let mut inner = self.inner.lock().await;
            inner.disposed = true;
            inner.status = ConnectionStatus::Disconnected;
            self.status_tx.send_replace(ConnectionStatus::Disconnected);
        }

        let task = self.reconnect_task.lock().await.take();
        if let Some(task) = task {
            task.abort();
            task.await.ok();
        }

        Ok(())
    }

    pub async fn is_disposed(&self) -> bool {
        self.inner.lock().await.disposed
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn status_monotonicity_after_dispose() {
        let conn = TunnelConnectionBase::new();
        conn.set_status(ConnectionStatus::Connected).await;
        conn.dispose().await.unwrap();

        assert_eq!(conn.status().await, ConnectionStatus::Disconnected);

        conn.set_status(ConnectionStatus::Connecting).await;
        assert_eq!(conn.status().await, ConnectionStatus::Disconnected);
    }

    #[tokio::test]
    async fn entering_connected_clears_disconnect_cause() {
        let conn = TunnelConnectionBase::new();
        conn.set_disconnect_cause(SshDisconnectReason::ConnectionLost).await;
        conn.set_status(ConnectionStatus::Connected).await;
        assert_eq!(conn.disconnect_cause().await, None);
    }

    #[tokio::test]
    async fn only_one_reconnect_task_at_a_time() {
        let conn = Arc::new(TunnelConnectionBase::new());
        let runs = Arc::new(std::sync::atomic::AtomicU32::new(0));

        for _ in 0..3 {
            let runs = runs.clone();
            conn.start_reconnect_task_if_not_disposed(|| async move {
                runs.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(50)).await;
            })
            .await;
        }

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(runs.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn does_not_schedule_reconnect_after_dispose() {
        let conn = Arc::new(TunnelConnectionBase::new());
        conn.dispose().await.unwrap();

        let ran = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let ran2 = ran.clone();
        conn.start_reconnect_task_if_not_disposed(|| async move {
            ran2.store(true, std::sync::atomic::Ordering::SeqCst);
        })
        .await;

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!ran.load(std::sync::atomic::Ordering::SeqCst));
    }
}
