//! ECMAScript/AS3 number formatting and parsing.
//!
//! Formatting covers the shortest round-trip decimal form with the
//! scientific switch at 1e-6 and 1e21, the `toFixed`/`toExponential`/
//! `toPrecision` family, and radix conversion for integers and floats.
//! Parsing covers the permissive string-to-number rules (whitespace set,
//! sign, hex, exponent) and the allocation-free array-index check.

mod format;
mod parse;
mod radix;

pub use format::{to_exponential, to_fixed, to_precision, to_string};
pub use parse::{is_number_whitespace, parse, parse_array_index};
pub use radix::{f64_to_radix, int_to_radix};
