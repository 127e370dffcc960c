//! # vrcbridge-server
//!
//! Axum HTTP + `WebSocket` gateway for browser control panels.
//!
//! - `GET /ws`: one control panel per connection; frames are forwarded to
//!   the dispatch loop, updates come back through the broadcast hub
//! - `GET /`, `GET /static/*`: the panel's static files
//! - `GET /health`, `GET /metrics`: liveness and Prometheus text
//! - Graceful shutdown via a shared `CancellationToken`

#![deny(unsafe_code)]

pub mod config;
pub mod health;
pub mod metrics;
pub mod server;
pub mod shutdown;
pub mod websocket;

pub use config::ServerConfig;
pub use server::{AppState, BridgeServer};
pub use shutdown::ShutdownCoordinator;
