//! Avatar-scoped parameters.
//!
//! VRChat writes one JSON definition per avatar under
//! `<OSC dir>/usr_<user id>/Avatars/<avatar id>.json`. When the worn avatar
//! changes, [`AvatarLoader`] tears down the previous avatar's parameters,
//! locates and parses the new definition, and merges what it can into the
//! registry.

pub mod discovery;
pub mod loader;
pub mod parser;

pub use loader::{AvatarLoader, AvatarSession, LoadPhase, ReconcileOutcome};
pub use parser::AvatarDefinition;
