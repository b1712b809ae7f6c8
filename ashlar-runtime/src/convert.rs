//! Per-(source, destination) type converters.
//!
//! [`Coercion::get`] returns the converter for a pair of static types out
//! of the closed set; the same pair always yields the same converter.
//! Unsupported pairs yield a converter that raises on use (passing null
//! through when the destination is a reference type).

use crate::class::ClassId;
use crate::error::{Error, Result};
use crate::runtime::Runtime;
use crate::value::{Any, ValueType};

/// A converter between two static types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    /// The value passes through unchanged (includes boxing into `Any`).
    Identity,
    /// ECMAScript ToBoolean.
    ToBoolean,
    /// The AS3 ToInt32 rule; int and uint reinterpret bits.
    ToInt,
    /// The AS3 ToUint32 rule.
    ToUint,
    /// ECMAScript ToNumber; exact widening from the integer tags.
    ToNumber,
    /// The canonical string form.
    ToString,
    /// Undefined narrows to null; everything else passes.
    ToObject,
    /// Checked cast to a class; null (and undefined, as null) pass.
    Cast(ClassId),
    /// No conversion exists; raises on every input.
    Invalid(ValueType, ValueType),
    /// No conversion exists, but the destination is a reference type, so
    /// null passes.
    InvalidExceptNull(ValueType, ValueType),
}

impl Coercion {
    /// The converter for a (source, destination) pair.
    pub fn get(src: ValueType, dst: ValueType) -> Coercion {
        if src == dst {
            return Coercion::Identity;
        }
        match dst {
            ValueType::Any => Coercion::Identity,
            ValueType::Object => Coercion::ToObject,
            ValueType::Boolean => Coercion::ToBoolean,
            ValueType::Int => Coercion::ToInt,
            ValueType::Uint => Coercion::ToUint,
            ValueType::Number => Coercion::ToNumber,
            ValueType::String => Coercion::ToString,
            // nothing converts into the unit types
            ValueType::Undefined | ValueType::Null => Coercion::Invalid(src, dst),
            ValueType::Class(id) => match src {
                ValueType::Any
                | ValueType::Object
                | ValueType::Null
                | ValueType::Undefined
                | ValueType::Class(_) => Coercion::Cast(id),
                // a string-typed slot can hold null, which may pass
                ValueType::String => Coercion::InvalidExceptNull(src, dst),
                ValueType::Boolean | ValueType::Int | ValueType::Uint | ValueType::Number => {
                    Coercion::Invalid(src, dst)
                }
            },
        }
    }

    /// Convert one value.
    pub fn convert(&self, runtime: &Runtime, value: &Any) -> Result<Any> {
        match self {
            Coercion::Identity => Ok(value.clone()),
            Coercion::ToBoolean => Ok(Any::Boolean(value.to_boolean())),
            Coercion::ToInt => Ok(Any::Int(value.to_int32())),
            Coercion::ToUint => Ok(Any::Uint(value.to_uint32())),
            Coercion::ToNumber => Ok(Any::Number(value.to_number())),
            Coercion::ToString => Ok(Any::String(value.to_string_value())),
            Coercion::ToObject => Ok(match value {
                Any::Undefined => Any::Null,
                other => other.clone(),
            }),
            Coercion::Cast(target) => match value {
                Any::Undefined | Any::Null => Ok(Any::Null),
                _ => {
                    let class = runtime.class_of(value);
                    if runtime.is_subclass(class, *target) {
                        Ok(value.clone())
                    } else {
                        Err(Error::Cast {
                            from: value.value_type(),
                            to: ValueType::Class(*target),
                        })
                    }
                }
            },
            Coercion::Invalid(from, to) => Err(Error::Cast {
                from: *from,
                to: *to,
            }),
            Coercion::InvalidExceptNull(from, to) => {
                if value.is_null() {
                    Ok(Any::Null)
                } else {
                    Err(Error::Cast {
                        from: *from,
                        to: *to,
                    })
                }
            }
        }
    }

    /// Convert a span element-wise into a destination of the same length.
    pub fn convert_slice(&self, runtime: &Runtime, src: &[Any], dst: &mut [Any]) -> Result<()> {
        assert_eq!(src.len(), dst.len(), "span lengths must match");
        for (value, out) in src.iter().zip(dst.iter_mut()) {
            *out = self.convert(runtime, value)?;
        }
        Ok(())
    }

    /// Convert a span into a fresh vector.
    pub fn convert_vec(&self, runtime: &Runtime, src: &[Any]) -> Result<Vec<Any>> {
        src.iter()
            .map(|value| self.convert(runtime, value))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_always_yields_same_converter() {
        assert_eq!(
            Coercion::get(ValueType::Any, ValueType::Int),
            Coercion::get(ValueType::Any, ValueType::Int)
        );
    }

    #[test]
    fn test_identity_when_types_match() {
        assert_eq!(
            Coercion::get(ValueType::Number, ValueType::Number),
            Coercion::Identity
        );
        assert_eq!(
            Coercion::get(ValueType::Int, ValueType::Any),
            Coercion::Identity
        );
    }

    #[test]
    fn test_numeric_matrix() {
        let rt = Runtime::new();
        let to_int = Coercion::get(ValueType::Number, ValueType::Int);
        assert_eq!(
            to_int.convert(&rt, &Any::Number(3.7)).unwrap(),
            Any::Int(3)
        );
        let to_uint = Coercion::get(ValueType::Int, ValueType::Uint);
        assert_eq!(
            to_uint.convert(&rt, &Any::Int(-1)).unwrap(),
            Any::Uint(u32::MAX)
        );
        let to_number = Coercion::get(ValueType::Boolean, ValueType::Number);
        assert_eq!(
            to_number.convert(&rt, &Any::Boolean(true)).unwrap(),
            Any::Number(1.0)
        );
    }

    #[test]
    fn test_string_to_number_never_raises() {
        let rt = Runtime::new();
        let c = Coercion::get(ValueType::String, ValueType::Number);
        let nan = c.convert(&rt, &Any::from("not a number")).unwrap();
        match nan {
            Any::Number(n) => assert!(n.is_nan()),
            other => panic!("expected NaN, got {:?}", other),
        }
        assert_eq!(
            c.convert(&rt, &Any::from("  0x1f ")).unwrap(),
            Any::Number(31.0)
        );
    }

    #[test]
    fn test_invalid_pair_raises_on_non_null() {
        let rt = Runtime::new();
        let target = rt.class_of(&Any::from("x"));
        let c = Coercion::get(ValueType::String, ValueType::Class(target));
        assert!(matches!(c, Coercion::InvalidExceptNull(..)));
        assert!(c.convert(&rt, &Any::from("x")).is_err());
        assert_eq!(c.convert(&rt, &Any::Null).unwrap(), Any::Null);

        let c = Coercion::get(ValueType::Int, ValueType::Class(target));
        assert!(c.convert(&rt, &Any::Null).is_err());
    }

    #[test]
    fn test_convert_slice_matches_convert() {
        let rt = Runtime::new();
        let c = Coercion::get(ValueType::Any, ValueType::Int);
        let src = [Any::Number(1.9), Any::from("42"), Any::Boolean(true)];
        let out = c.convert_vec(&rt, &src).unwrap();
        for (i, value) in src.iter().enumerate() {
            assert_eq!(out[i], c.convert(&rt, value).unwrap());
        }
    }

    #[test]
    fn test_identity_slice_copies() {
        let rt = Runtime::new();
        let c = Coercion::get(ValueType::Any, ValueType::Any);
        let src = [Any::Int(1), Any::from("a")];
        let mut dst = [Any::Undefined, Any::Undefined];
        c.convert_slice(&rt, &src, &mut dst).unwrap();
        assert_eq!(dst[0], src[0]);
        assert_eq!(dst[1], src[1]);
    }
}
