use std::sync::Arc;

use crate::value::Any;

impl Any {
    /// Strict equality: same tag, same bits or same reference.
    ///
    /// Undefined is strictly equal only to undefined. NaN is not equal to
    /// itself; positive and negative zero are equal.
    pub fn strict_equals(&self, other: &Any) -> bool {
        match (self, other) {
            (Any::Undefined, Any::Undefined) => true,
            (Any::Null, Any::Null) => true,
            (Any::Boolean(a), Any::Boolean(b)) => a == b,
            (Any::Int(a), Any::Int(b)) => a == b,
            (Any::Uint(a), Any::Uint(b)) => a == b,
            (Any::Number(a), Any::Number(b)) => a == b,
            (Any::String(a), Any::String(b)) => a == b,
            (Any::Object(a), Any::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Loose equality: strict equality widened with numeric coercion
    /// across the numeric tags, and undefined equal to null.
    pub fn loose_equals(&self, other: &Any) -> bool {
        if self.is_numeric() && other.is_numeric() {
            return self.to_number() == other.to_number();
        }
        match (self, other) {
            (Any::Undefined | Any::Null, Any::Undefined | Any::Null) => true,
            _ => self.strict_equals(other),
        }
    }
}

// PartialEq is strict equality; loose equality is always a named call.
impl PartialEq for Any {
    fn eq(&self, other: &Self) -> bool {
        self.strict_equals(other)
    }
}
