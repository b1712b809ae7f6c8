//! The dynamic value universe.
//!
//! [`Any`] is the tagged union every dynamic operation traffics in;
//! [`Object`] is `Any` without the undefined value. Conversions between
//! `Any` and the concrete primitives are total and follow the
//! ECMAScript/AS3 rules.

mod conversion;
mod equality;
mod object;
mod value_core;

pub use conversion::{f64_to_int32, f64_to_uint32};
pub use object::{NativeFn, ObjectKind, ObjectValue};
pub use value_core::{Any, Object, ValueType};
