// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

/// Identifies a forwarded port within an SSH session (C12). `session_id` is
/// the SSH key-exchange-derived identifier; it may be absent in v2 when
/// encryption is off and all clients share one session.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub(crate) struct SessionPortKey {
    pub session_id: Option<Vec<u8>>,
    pub port: u16,
}

impl SessionPortKey {
    pub fn new(session_id: Option<Vec<u8>>, port: u16) -> Self {
        SessionPortKey { session_id, port }
    }
}

/// Holds `SecureStream`s whose underlying SSH channel was lost but whose
/// cryptographic session is still reconnect-capable, keyed by local port.
/// List operations are atomic under a single mutex (spec §5's
/// "disconnected-stream registry is guarded by a mutex").
#[derive(Default)]
pub(crate) struct DisconnectedStreamRegistry<S> {
    streams: Mutex<HashMap<u16, Vec<S>>>,
}

impl<S> DisconnectedStreamRegistry<S> {
    pub fn new() -> Self {
        DisconnectedStreamRegistry {
            streams: Mutex::new(HashMap::new()),
        }
    }

    /// Appends a detached stream for later reattachment.
    pub fn insert(&self, port: u16, stream: S) {
        self.streams.lock().unwrap().entry(port).or_default().push(stream);
    }

    /// Removes and returns one disconnected stream for the port, if any.
    /// Matching is "pick any one" per spec §4.9 (the host matches by SSH
    /// session ID, not by which stream was taken first).
    pub fn take_one(&self, port: u16) -> Option<S> {
        let mut streams = self.streams.lock().unwrap();
        let entry = streams.get_mut(&port)?;
        let stream = entry.pop();
        if entry.is_empty() {
            streams.remove(&port);
        }
        stream
    }

    /// Removes and returns every disconnected stream for the port, e.g. when
    /// the host has stopped accepting it and they must all be disposed.
    pub fn take_all(&self, port: u16) -> Vec<S> {
        self.streams.lock().unwrap().remove(&port).unwrap_or_default()
    }
}

/// A single-writer-per-key, concurrent-across-keys store of active remote
/// forwarders (C12). Removing an entry implies disposing the forwarder,
/// tearing down the remote connector; callers are expected to dispose the
/// value they got back from `remove`/`compare_and_remove`.
#[derive(Default)]
pub(crate) struct RemoteForwarderRegistry<F> {
    forwarders: Mutex<HashMap<SessionPortKey, Arc<F>>>,
}

impl<F> RemoteForwarderRegistry<F> {
    pub fn new() -> Self {
        RemoteForwarderRegistry {
            forwarders: Mutex::new(HashMap::new()),
        }
    }

    /// Inserts a new forwarder for `key`, returning `false` (and not
    /// inserting) if one already exists, matching "exactly one entry while
    /// the port is being forwarded on a session".
    pub fn try_insert(&self, key: SessionPortKey, forwarder: Arc<F>) -> bool {
        let mut forwarders = self.forwarders.lock().unwrap();
        if forwarders.contains_key(&key) {
            return false;
        }
        forwarders.insert(key, forwarder);
        true
    }

    pub fn contains(&self, key: &SessionPortKey) -> bool {
        self.forwarders.lock().unwrap().contains_key(key)
    }

    pub fn remove(&self, key: &SessionPortKey) -> Option<Arc<F>> {
        self.forwarders.lock().unwrap().remove(key)
    }

    /// Snapshot of all keys currently forwarded, used by `RefreshPorts` to
    /// diff against the tunnel's current port list.
    pub fn keys(&self) -> Vec<SessionPortKey> {
        self.forwarders.lock().unwrap().keys().cloned().collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn session_port_key_equality_is_sequence_equality_plus_port() {
        let a = SessionPortKey::new(Some(vec![1, 2, 3]), 8080);
        let b = SessionPortKey::new(Some(vec![1, 2, 3]), 8080);
        let c = SessionPortKey::new(Some(vec![1, 2, 4]), 8080);
        let d = SessionPortKey::new(Some(vec![1, 2, 3]), 9090);
        let e = SessionPortKey::new(None, 8080);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
        assert_ne!(a, e);
    }

    #[test]
    fn disconnected_stream_registry_take_one_is_atomic() {
        let registry: DisconnectedStreamRegistry<u32> = DisconnectedStreamRegistry::new();
        registry.insert(8080, 1);
        registry.insert(8080, 2);

        assert_eq!(registry.take_one(8080), Some(2));
        assert_eq!(registry.take_one(8080), Some(1));
        assert_eq!(registry.take_one(8080), None);
    }

    #[test]
    fn take_all_drains_and_removes_the_port() {
        let registry: DisconnectedStreamRegistry<u32> = DisconnectedStreamRegistry::new();
        registry.insert(8080, 1);
        registry.insert(8080, 2);

        let mut all = registry.take_all(8080);
        all.sort();
        assert_eq!(all, vec![1, 2]);
        assert_eq!(registry.take_all(8080), Vec::<u32>::new());
    }

    #[test]
    fn remote_forwarder_registry_allows_exactly_one_entry_per_key() {
        let registry: RemoteForwarderRegistry<u32> = RemoteForwarderRegistry::new();
        let key = SessionPortKey::new(None, 8080);

        assert!(registry.try_insert(key.clone(), Arc::new(1)));
        assert!(!registry.try_insert(key.clone(), Arc::new(2)));
        assert!(registry.contains(&key));

        assert_eq!(*registry.remove(&key).unwrap(), 1);
        assert!(!registry.contains(&key));
        assert!(registry.try_insert(key, Arc::new(3)));
    }
}
