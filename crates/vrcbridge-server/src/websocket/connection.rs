//! WebSocket client connection state.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use vrcbridge_runtime::Subscriber;

/// A connected control panel.
///
/// Frames queued here are written to the socket by the session's writer
/// task. Once the writer exits the channel closes and every later delivery
/// fails, which is how the broadcast hub learns the panel is gone.
pub struct ClientConnection {
    /// Unique connection ID.
    pub id: String,
    tx: mpsc::Sender<Arc<String>>,
    /// When this connection was established.
    pub connected_at: Instant,
    is_alive: AtomicBool,
    last_pong: Mutex<Instant>,
}

impl ClientConnection {
    /// Create a new connection.
    pub fn new(id: String, tx: mpsc::Sender<Arc<String>>) -> Self {
        let now = Instant::now();
        Self {
            id,
            tx,
            connected_at: now,
            is_alive: AtomicBool::new(true),
            last_pong: Mutex::new(now),
        }
    }

    /// Mark the connection as alive (pong or any frame received).
    pub fn mark_alive(&self) {
        self.is_alive.store(true, Ordering::Relaxed);
        *self.last_pong.lock() = Instant::now();
    }

    /// Check and reset the alive flag.
    ///
    /// Returns `true` if the client was heard from since the last check.
    pub fn check_alive(&self) -> bool {
        self.is_alive.swap(false, Ordering::Relaxed)
    }

    /// Time since the client was last heard from.
    pub fn last_pong_elapsed(&self) -> Duration {
        self.last_pong.lock().elapsed()
    }

    /// Connection age.
    pub fn age(&self) -> Duration {
        self.connected_at.elapsed()
    }
}

#[async_trait]
impl Subscriber for ClientConnection {
    fn id(&self) -> &str {
        &self.id
    }

    /// Waits for buffer space when the writer is behind.
    async fn deliver(&self, payload: Arc<String>) -> bool {
        self.tx.send(payload).await.is_ok()
    }
}

impl std::fmt::Debug for ClientConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConnection")
            .field("id", &self.id)
            .field("age", &self.age())
            .finish_non_exhaustive()
    }
}
