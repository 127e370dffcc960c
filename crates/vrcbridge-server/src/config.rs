//! Gateway configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use vrcbridge_settings::WebSettings;

/// Configuration for the web gateway.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind (default `"127.0.0.1"`).
    pub host: String,
    /// Port to bind (default `0` for auto-assign).
    pub port: u16,
    /// Directory holding `index.html` and the panel's assets.
    pub static_dir: PathBuf,
    /// Per-connection outbound frame buffer.
    pub outbound_buffer: usize,
    /// Max WebSocket message size in bytes.
    pub max_message_size: usize,
    /// Heartbeat interval in seconds.
    pub heartbeat_interval_secs: u64,
    /// Disconnect a client that has not answered a ping for this long.
    pub heartbeat_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            static_dir: PathBuf::from("static"),
            outbound_buffer: 1024,
            max_message_size: 1024 * 1024,
            heartbeat_interval_secs: 30,
            heartbeat_timeout_secs: 60,
        }
    }
}

impl From<&WebSettings> for ServerConfig {
    fn from(web: &WebSettings) -> Self {
        Self {
            host: web.host.clone(),
            port: web.port,
            static_dir: web.static_dir.clone(),
            outbound_buffer: web.outbound_buffer,
            max_message_size: web.max_message_size,
            heartbeat_interval_secs: web.heartbeat_interval_secs,
            heartbeat_timeout_secs: web.heartbeat_interval_secs.saturating_mul(2),
        }
    }
}
