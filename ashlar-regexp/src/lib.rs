#![warn(missing_docs)]

//! Transpiles the ActionScript 3 regular expression dialect into a pattern
//! the host regex engine (fancy-regex) accepts, preserving the source
//! dialect's match semantics.
//!
//! The transpiler is a single forward pass over the pattern. Constructs the
//! host engine shares with the source dialect pass through; everything else
//! is rewritten:
//!
//! - octal escapes become hex escapes, removing the octal/backreference
//!   ambiguity
//! - `\N` escapes that cannot be classified yet are parked as forward
//!   references and resolved once the total group count is known
//! - `.`, `^`, `$`, `\b`, `\s` and friends expand to explicit classes and
//!   look-arounds so host defaults cannot change what they match
//! - named groups are tracked, stripped from the output, and returned as a
//!   dense group-number table

mod char_set;
mod error;
mod transpile;

pub use error::{Error, Result};
pub use transpile::{transpile, Flags, Transpiled};
