use std::any::TypeId;
use std::sync::Arc;

use ashlar_name::QName;

use crate::class::{Class, ClassBuilder, ClassId, ClassRegistry, MethodInfo, ParamInfo};
use crate::error::Result;
use crate::runtime::Runtime;
use crate::value::{Any, ValueType};

pub(super) fn register(registry: &ClassRegistry, parent: &Class) -> ClassId {
    registry.get_or_register(TypeId::of::<String>(), |id| {
        ClassBuilder::new(QName::public("String"))
            .parent(parent)
            .property(
                QName::public("length"),
                Some(MethodInfo::new(
                    vec![],
                    Some(ValueType::Int),
                    Arc::new(length),
                )),
                None,
            )
            .method(
                QName::public("charAt"),
                MethodInfo::new(
                    vec![ParamInfo::optional(ValueType::Int, Some(Any::Int(0)))],
                    Some(ValueType::String),
                    Arc::new(char_at),
                ),
            )
            .build(id)
    })
}

// length counts UTF-16 units, as the source language does
fn length(_rt: &Runtime, receiver: &Any, _args: &[Any]) -> Result<Any> {
    let count = receiver.to_string_value().encode_utf16().count();
    Ok(Any::Int(count as i32))
}

fn char_at(_rt: &Runtime, receiver: &Any, args: &[Any]) -> Result<Any> {
    let s = receiver.to_string_value();
    let index = args[0].to_int32();
    if index < 0 {
        return Ok(Any::from(""));
    }
    match s.encode_utf16().nth(index as usize) {
        Some(unit) => Ok(Any::from(String::from_utf16_lossy(&[unit]))),
        None => Ok(Any::from("")),
    }
}
