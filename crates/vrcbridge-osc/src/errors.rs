//! Transport error types.

use thiserror::Error;

use vrcbridge_core::PatternError;

/// Errors raised by the OSC transport.
#[derive(Debug, Error)]
pub enum OscError {
    /// Socket bind, connect, or send failed.
    #[error("osc socket error: {0}")]
    Io(#[from] std::io::Error),
    /// A packet could not be encoded.
    #[error("failed to encode osc packet: {0}")]
    Encode(String),
    /// A datagram is not a valid OSC packet.
    #[error("failed to decode osc packet: {0}")]
    Decode(String),
    /// A route pattern is malformed.
    #[error(transparent)]
    Pattern(#[from] PatternError),
}

/// Result type for transport operations.
pub type Result<T> = std::result::Result<T, OscError>;
