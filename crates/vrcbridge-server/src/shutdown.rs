//! Graceful shutdown coordination via `CancellationToken`.
//!
//! One token is shared by the dispatch loop, the HTTP server, and every
//! WebSocket session. Cancelling it stops new work from starting; work
//! already in progress (a broadcast pass, an in-flight HTTP response) is
//! allowed to finish.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// How long [`ShutdownCoordinator::drain`] waits by default.
const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Owns the process-wide shutdown token.
#[derive(Clone, Debug, Default)]
pub struct ShutdownCoordinator {
    token: CancellationToken,
}

impl ShutdownCoordinator {
    /// Create a coordinator with a fresh token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing token.
    pub fn from_token(token: CancellationToken) -> Self {
        Self { token }
    }

    /// A clone of the token for a task to watch.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Signal every watcher.
    pub fn shutdown(&self) {
        self.token.cancel();
    }

    /// Whether [`ShutdownCoordinator::shutdown`] has been called.
    pub fn is_shutting_down(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancel, then wait up to `timeout` for `handles` to finish.
    ///
    /// Tasks still running after the timeout are left to be dropped with the
    /// runtime.
    pub async fn drain(&self, handles: Vec<JoinHandle<()>>, timeout: Option<Duration>) {
        let timeout = timeout.unwrap_or(DEFAULT_DRAIN_TIMEOUT);
        self.shutdown();
        info!(
            tasks = handles.len(),
            timeout_ms = timeout.as_millis() as u64,
            "draining tasks"
        );
        if tokio::time::timeout(timeout, futures::future::join_all(handles))
            .await
            .is_err()
        {
            warn!(?timeout, "shutdown drain timed out");
        }
    }
}
