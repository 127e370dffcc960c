//! Subscriber fan-out.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{debug, warn};

use vrcbridge_core::ServerMessage;

use crate::metrics::{BROADCASTS_TOTAL, SUBSCRIBER_PRUNES_TOTAL, SUBSCRIBERS_ACTIVE};
use crate::subscriber::Subscriber;

/// The live subscriber set.
///
/// Owned by the dispatch loop, so no lock guards it. The shared counter is
/// a read-only mirror for status reporting from other tasks.
pub struct BroadcastHub {
    subscribers: Vec<Arc<dyn Subscriber>>,
    count: Arc<AtomicUsize>,
}

impl BroadcastHub {
    /// Create a hub mirroring its size into `count`.
    pub fn new(count: Arc<AtomicUsize>) -> Self {
        count.store(0, Ordering::Relaxed);
        Self {
            subscribers: Vec::new(),
            count,
        }
    }

    /// Add a subscriber. A subscriber with the same id is replaced.
    pub fn add(&mut self, subscriber: Arc<dyn Subscriber>) {
        let id = subscriber.id().to_owned();
        self.subscribers.retain(|s| s.id() != id);
        self.subscribers.push(subscriber);
        self.sync_count();
        debug!(conn_id = %id, subscribers = self.subscribers.len(), "subscriber added");
    }

    /// Remove a subscriber by id. Returns whether it was present.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id() != id);
        let removed = self.subscribers.len() != before;
        if removed {
            self.sync_count();
            debug!(conn_id = %id, subscribers = self.subscribers.len(), "subscriber removed");
        }
        removed
    }

    /// Number of live subscribers.
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// Whether no subscribers are connected.
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Ids of the live subscribers, in connection order.
    pub fn ids(&self) -> Vec<String> {
        self.subscribers.iter().map(|s| s.id().to_owned()).collect()
    }

    /// Deliver `message` to every subscriber in turn.
    ///
    /// Failed deliveries never stop the pass; the failed subscribers are
    /// removed once every delivery has been attempted. Returns the number of
    /// successful deliveries.
    pub async fn broadcast(&mut self, message: &ServerMessage) -> usize {
        let Some(payload) = encode(message) else {
            return 0;
        };
        metrics::counter!(BROADCASTS_TOTAL, "type" => message.kind()).increment(1);

        let mut failed = Vec::new();
        for subscriber in &self.subscribers {
            if !subscriber.deliver(Arc::clone(&payload)).await {
                failed.push(subscriber.id().to_owned());
            }
        }

        let delivered = self.subscribers.len() - failed.len();
        debug!(kind = message.kind(), delivered, failed = failed.len(), "broadcast");
        if !failed.is_empty() {
            for id in &failed {
                warn!(conn_id = %id, "delivery failed, pruning subscriber");
            }
            self.subscribers.retain(|s| !failed.iter().any(|id| id == s.id()));
            metrics::counter!(SUBSCRIBER_PRUNES_TOTAL).increment(failed.len() as u64);
            self.sync_count();
        }
        delivered
    }

    fn sync_count(&self) {
        self.count.store(self.subscribers.len(), Ordering::Relaxed);
        metrics::gauge!(SUBSCRIBERS_ACTIVE).set(self.subscribers.len() as f64);
    }
}

/// Deliver `message` to a single subscriber outside the live set.
pub async fn send_to(subscriber: &dyn Subscriber, message: &ServerMessage) -> bool {
    match encode(message) {
        Some(payload) => subscriber.deliver(payload).await,
        None => false,
    }
}

fn encode(message: &ServerMessage) -> Option<Arc<String>> {
    match serde_json::to_string(message) {
        Ok(json) => Some(Arc::new(json)),
        Err(error) => {
            warn!(kind = message.kind(), %error, "failed to serialize message");
            None
        }
    }
}

impl std::fmt::Debug for BroadcastHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BroadcastHub")
            .field("subscribers", &self.ids())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
