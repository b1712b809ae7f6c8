use std::sync::Arc;

use crate::number;
use crate::value::Any;

/// The AS3 `ToInt32` rule: truncate toward zero, then wrap modulo 2^32.
pub fn f64_to_int32(value: f64) -> i32 {
    f64_to_uint32(value) as i32
}

/// The AS3 `ToUint32` rule.
pub fn f64_to_uint32(value: f64) -> u32 {
    if !value.is_finite() {
        return 0;
    }
    let truncated = value.trunc();
    const MODULUS: f64 = 4294967296.0;
    // fmod of integral doubles is exact
    let mut remainder = truncated % MODULUS;
    if remainder < 0.0 {
        remainder += MODULUS;
    }
    remainder as u32
}

impl Any {
    /// ECMAScript ToBoolean; total.
    pub fn to_boolean(&self) -> bool {
        match self {
            Any::Undefined | Any::Null => false,
            Any::Boolean(b) => *b,
            Any::Int(i) => *i != 0,
            Any::Uint(u) => *u != 0,
            Any::Number(n) => *n != 0.0 && !n.is_nan(),
            Any::String(s) => !s.is_empty(),
            Any::Object(_) => true,
        }
    }

    /// ECMAScript ToNumber; total. Strings that do not denote a number
    /// (after whitespace trimming, sign, hex, exponent handling) yield NaN.
    pub fn to_number(&self) -> f64 {
        match self {
            Any::Undefined => f64::NAN,
            Any::Null => 0.0,
            Any::Boolean(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Any::Int(i) => *i as f64,
            Any::Uint(u) => *u as f64,
            Any::Number(n) => *n,
            Any::String(s) => number::parse(s, true).unwrap_or(f64::NAN),
            Any::Object(_) => f64::NAN,
        }
    }

    /// ToInt32; total.
    pub fn to_int32(&self) -> i32 {
        match self {
            Any::Int(i) => *i,
            // int <-> uint converts by bit reinterpretation
            Any::Uint(u) => *u as i32,
            _ => f64_to_int32(self.to_number()),
        }
    }

    /// ToUint32; total.
    pub fn to_uint32(&self) -> u32 {
        match self {
            Any::Int(i) => *i as u32,
            Any::Uint(u) => *u,
            _ => f64_to_uint32(self.to_number()),
        }
    }

    /// The canonical string form; total. Numbers use the shortest
    /// round-trip representation and negative zero prints as `0`.
    pub fn to_string_value(&self) -> Arc<str> {
        match self {
            Any::Undefined => "undefined".into(),
            Any::Null => "null".into(),
            Any::Boolean(b) => if *b { "true" } else { "false" }.into(),
            Any::Int(i) => i.to_string().into(),
            Any::Uint(u) => u.to_string().into(),
            Any::Number(n) => number::to_string(*n).into(),
            Any::String(s) => s.clone(),
            Any::Object(_) => "[object Object]".into(),
        }
    }
}

impl From<bool> for Any {
    fn from(value: bool) -> Any {
        Any::Boolean(value)
    }
}

impl From<i32> for Any {
    fn from(value: i32) -> Any {
        Any::Int(value)
    }
}

impl From<u32> for Any {
    fn from(value: u32) -> Any {
        Any::Uint(value)
    }
}

impl From<f64> for Any {
    fn from(value: f64) -> Any {
        Any::Number(value)
    }
}

impl From<&str> for Any {
    fn from(value: &str) -> Any {
        Any::String(value.into())
    }
}

impl From<String> for Any {
    fn from(value: String) -> Any {
        Any::String(value.into())
    }
}
