use std::any::TypeId;
use std::sync::Arc;

use ashlar_name::QName;

use crate::class::{Class, ClassBuilder, ClassId, ClassRegistry, MethodInfo, ParamInfo};
use crate::error::{Error, Result};
use crate::number;
use crate::runtime::Runtime;
use crate::value::{Any, ValueType};

pub(super) fn register(registry: &ClassRegistry, parent: &Class) -> ClassId {
    registry.get_or_register(TypeId::of::<f64>(), |id| {
        ClassBuilder::new(QName::public("Number"))
            .parent(parent)
            .constant(QName::public("MAX_VALUE"), Any::Number(f64::MAX))
            .constant(QName::public("MIN_VALUE"), Any::Number(5e-324))
            .constant(QName::public("NaN"), Any::Number(f64::NAN))
            .constant(
                QName::public("POSITIVE_INFINITY"),
                Any::Number(f64::INFINITY),
            )
            .constant(
                QName::public("NEGATIVE_INFINITY"),
                Any::Number(f64::NEG_INFINITY),
            )
            .method(
                QName::public("toFixed"),
                MethodInfo::new(
                    vec![ParamInfo::optional(ValueType::Int, Some(Any::Int(0)))],
                    Some(ValueType::String),
                    Arc::new(to_fixed),
                ),
            )
            .method(
                QName::public("toExponential"),
                MethodInfo::new(
                    vec![ParamInfo::optional(ValueType::Int, Some(Any::Int(0)))],
                    Some(ValueType::String),
                    Arc::new(to_exponential),
                ),
            )
            .method(
                QName::public("toPrecision"),
                MethodInfo::new(
                    vec![ParamInfo::required(ValueType::Int)],
                    Some(ValueType::String),
                    Arc::new(to_precision),
                ),
            )
            .method(
                QName::public("toString"),
                MethodInfo::new(
                    vec![ParamInfo::optional(ValueType::Int, Some(Any::Int(10)))],
                    Some(ValueType::String),
                    Arc::new(to_string_radix),
                ),
            )
            .build(id)
    })
}

fn precision(arg: &Any) -> Result<usize> {
    let p = arg.to_int32();
    usize::try_from(p).map_err(|_| Error::InvalidPrecision(p as i64))
}

fn to_fixed(_rt: &Runtime, receiver: &Any, args: &[Any]) -> Result<Any> {
    Ok(number::to_fixed(receiver.to_number(), precision(&args[0])?)?.into())
}

fn to_exponential(_rt: &Runtime, receiver: &Any, args: &[Any]) -> Result<Any> {
    Ok(number::to_exponential(receiver.to_number(), precision(&args[0])?)?.into())
}

fn to_precision(_rt: &Runtime, receiver: &Any, args: &[Any]) -> Result<Any> {
    Ok(number::to_precision(receiver.to_number(), precision(&args[0])?)?.into())
}

fn to_string_radix(_rt: &Runtime, receiver: &Any, args: &[Any]) -> Result<Any> {
    let radix = args[0].to_int32();
    if !(2..=36).contains(&radix) {
        return Err(Error::InvalidRadix(radix as i64));
    }
    Ok(number::f64_to_radix(receiver.to_number(), radix as u32)?.into())
}
