//! Subscriber registry: the one piece of shared mutable state.
//!
//! The connection handler and the broadcast dispatcher mutate the registry
//! concurrently, so the map is never exposed raw. Removal must be
//! idempotent: the outbound path (delivery failure) and the inbound path
//! (receive-side close) can race to remove the same subscriber.

use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use dashmap::DashMap;
use tokio::sync::mpsc;

/// Identity of a connected subscriber within the registry.
pub type SubscriberId = u64;

/// A single connected delivery target.
///
/// Holds the sending half of the subscriber's delivery channel; the
/// receiving half is drained by that connection's forward task, which owns
/// the actual WebSocket sink. A closed channel means the connection is gone.
#[derive(Debug, Clone)]
pub struct Subscriber {
    pub id: SubscriberId,
    tx: mpsc::UnboundedSender<Bytes>,
}

impl Subscriber {
    pub fn new(id: SubscriberId, tx: mpsc::UnboundedSender<Bytes>) -> Self {
        Self { id, tx }
    }

    /// Hand a message body to this subscriber's connection. Returns false
    /// when the connection has gone away.
    pub fn deliver(&self, body: Bytes) -> bool {
        self.tx.send(body).is_ok()
    }
}

/// Thread-safe set of currently connected subscribers.
#[derive(Debug, Default)]
pub struct Registry {
    inner: DashMap<SubscriberId, Subscriber>,
    next_id: AtomicU64,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh subscriber id.
    pub fn next_id(&self) -> SubscriberId {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Insert a subscriber if absent; a no-op when the id is already
    /// registered.
    pub fn add(&self, subscriber: Subscriber) {
        self.inner.entry(subscriber.id).or_insert(subscriber);
    }

    /// Remove a subscriber. Removing an id that is already gone is a no-op.
    pub fn remove(&self, id: SubscriberId) {
        self.inner.remove(&id);
    }

    /// Point-in-time copy of the current membership, safe to iterate while
    /// concurrent `add`/`remove` calls proceed.
    pub fn snapshot(&self) -> Vec<Subscriber> {
        self.inner.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Number of currently registered subscribers.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
