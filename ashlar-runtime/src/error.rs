use thiserror::Error;

use crate::value::ValueType;

/// Errors raised by the throwing surfaces of the core.
///
/// Ordinary property-operation failures never take this path; they are
/// reported through the [`crate::bind::BindStatus`] algebra. What throws is
/// what the host bytecode cannot recover from locally: bad coercions, bad
/// arguments to a native invocation, and parse errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A coercion between types with no defined conversion.
    #[error("cannot convert {from} to {to}")]
    Cast {
        /// The source type.
        from: ValueType,
        /// The destination type.
        to: ValueType,
    },
    /// An invocation with fewer arguments than the method requires.
    #[error("expected at least {min} arguments, got {got}")]
    TooFewArguments {
        /// Required argument count.
        min: usize,
        /// Supplied argument count.
        got: usize,
    },
    /// An invocation with more arguments than the method declares.
    #[error("expected at most {max} arguments, got {got}")]
    TooManyArguments {
        /// Declared argument count.
        max: usize,
        /// Supplied argument count.
        got: usize,
    },
    /// A radix outside 2..=36.
    #[error("radix {0} out of range")]
    InvalidRadix(i64),
    /// A formatting precision outside the method's allowed range.
    #[error("precision {0} out of range")]
    InvalidPrecision(i64),
    /// A property operation on undefined or null.
    #[error("property access on null or undefined")]
    NullAccess,
    /// An XML parse error.
    #[error(transparent)]
    Xml(#[from] crate::xml::Error),
}

/// Result type for the runtime core.
pub type Result<T> = std::result::Result<T, Error>;
