//! `/health` endpoint.

use serde::Serialize;
use std::time::Instant;

/// Health check response body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// `"ok"` while the dispatch loop answers, `"stopping"` otherwise.
    pub status: &'static str,
    /// Seconds since the server started.
    pub uptime_secs: u64,
    /// Live subscribers.
    pub connections: usize,
    /// Display name of the active avatar session.
    pub active_avatar: Option<String>,
}

/// Build a health response from live counters.
pub fn health_check(
    start_time: Instant,
    running: bool,
    connections: usize,
    active_avatar: Option<String>,
) -> HealthResponse {
    HealthResponse {
        status: if running { "ok" } else { "stopping" },
        uptime_secs: start_time.elapsed().as_secs(),
        connections,
        active_avatar,
    }
}
