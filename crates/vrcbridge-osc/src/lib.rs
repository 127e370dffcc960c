//! # vrcbridge-osc
//!
//! UDP transport for VRChat's OSC interface.
//!
//! - [`OscSender`]: fire-and-forget `send(address, args)`; [`UdpOscSender`]
//!   is the socket-backed implementation
//! - [`OscRouter`]: ordered pattern → handler table with a default handler
//! - [`OscListener`]: background receive thread feeding a router
//!
//! Wire encoding and decoding are delegated to `rosc`; this crate only maps
//! between OSC argument types and [`vrcbridge_core::ParamValue`].

#![deny(unsafe_code)]

pub mod convert;
pub mod errors;
pub mod listener;
pub mod router;
pub mod sender;

pub use errors::{OscError, Result};
pub use convert::OscArgs;
pub use listener::OscListener;
pub use router::{Handler, OscRouter};
pub use sender::{OscSender, UdpOscSender, resolve};
