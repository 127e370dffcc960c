//! # vrcbridge-runtime
//!
//! The parameter synchronization engine.
//!
//! - [`Registry`]: built-in and avatar-scoped parameters with their live values
//! - [`avatar`]: definition discovery, parsing, and the per-identity loader
//! - [`inbound`]: classification of raw OSC callbacks into queued events
//! - [`Bridge`]: the single-owner dispatch loop; everything that mutates the
//!   registry, the avatar session, or the subscriber set runs here
//! - [`BroadcastHub`]: best-effort fan-out with post-pass pruning
//! - [`commands`]: subscriber-issued `set` / `chatbox` handling
//!
//! Other threads and tasks talk to the loop only through a [`BridgeHandle`].

#![deny(unsafe_code)]

pub mod avatar;
pub mod bridge;
pub mod commands;
pub mod errors;
pub mod hub;
pub mod inbound;
pub mod metrics;
pub mod registry;
pub mod subscriber;

#[cfg(test)]
pub(crate) mod testutil;

pub use avatar::{AvatarLoader, AvatarSession, LoadPhase, ReconcileOutcome};
pub use bridge::{Bridge, BridgeHandle, BridgeMessage, BridgeStatus};
pub use commands::CommandOutcome;
pub use errors::{AvatarError, DiscoveryError, ParseError};
pub use hub::BroadcastHub;
pub use inbound::{EventKind, InboundEvent};
pub use registry::{Registry, Snapshot};
pub use subscriber::Subscriber;
