//! # vrcbridge-core
//!
//! Foundation types shared by every bridge crate.
//!
//! - **Values**: [`ParamType`] / [`ParamValue`] and the coercion rules between them
//! - **Parameters**: [`Parameter`] with category, direction flags, advisory bounds,
//!   and the optional pose component slot
//! - **Addresses**: [`AddressPattern`], a segment-wise wildcard matcher
//! - **Catalog**: the built-in parameter set seeded into every registry
//! - **Protocol**: [`ServerMessage`] / [`ClientMessage`], the JSON frames exchanged
//!   with control panels
//! - **Logging**: `tracing` subscriber bootstrap

#![deny(unsafe_code)]

pub mod catalog;
pub mod constants;
pub mod errors;
pub mod logging;
pub mod parameter;
pub mod pattern;
pub mod protocol;
pub mod value;

pub use errors::{CoercionError, PatternError, RegistryError};
pub use parameter::{Bounds, Category, Direction, DisplayMeta, Parameter, ParameterView};
pub use pattern::AddressPattern;
pub use protocol::{ClientMessage, ServerMessage};
pub use value::{ParamType, ParamValue};
