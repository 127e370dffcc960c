//! Error types for value coercion, address patterns, and registry seeding.

use thiserror::Error;

/// A value could not be converted to a parameter's declared type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoercionError {
    /// A string that does not parse as a number was supplied for a numeric parameter.
    #[error("value {value:?} is not numeric")]
    NotNumeric {
        /// The offending input.
        value: String,
    },
    /// NaN or infinity cannot become an integer.
    #[error("value {value} is not a finite number")]
    NonFinite {
        /// The offending input.
        value: f64,
    },
    /// JSON null, arrays, and objects have no parameter representation.
    #[error("unsupported JSON value of kind {kind}")]
    Unsupported {
        /// JSON kind name (`null`, `array`, `object`).
        kind: &'static str,
    },
}

/// An address pattern string is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// Patterns must start with `/`.
    #[error("pattern {pattern:?} must start with '/'")]
    NotAbsolute {
        /// The rejected pattern.
        pattern: String,
    },
    /// `//` or a trailing `/`.
    #[error("pattern {pattern:?} contains an empty segment")]
    EmptySegment {
        /// The rejected pattern.
        pattern: String,
    },
    /// Wildcards must span a whole segment (`foo*` is not supported).
    #[error("pattern {pattern:?} has a partial wildcard segment {segment:?}")]
    PartialWildcard {
        /// The rejected pattern.
        pattern: String,
        /// The segment mixing literal text and `*`.
        segment: String,
    },
}

/// The base parameter set violates a registry invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Two parameters share a name.
    #[error("duplicate parameter name {name:?}")]
    DuplicateName {
        /// The repeated name.
        name: String,
    },
    /// Two parameters outside a pose composite share an address.
    #[error("address {address:?} claimed by both {first:?} and {second:?}")]
    AddressConflict {
        /// The shared address.
        address: String,
        /// Parameter registered first.
        first: String,
        /// Parameter that collided.
        second: String,
    },
}
