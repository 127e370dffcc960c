//! WebSocket connection state, frame decoding, and the per-panel session.

pub mod connection;
pub mod handler;
pub mod session;
