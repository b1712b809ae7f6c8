use std::any::TypeId;
use std::sync::Arc;

use ashlar_name::QName;

use crate::class::{Class, ClassBuilder, ClassId, ClassRegistry, MethodInfo};
use crate::error::Result;
use crate::runtime::Runtime;
use crate::value::{Any, ObjectKind, ValueType};

pub(super) fn register(registry: &ClassRegistry, parent: &Class) -> ClassId {
    registry.get_or_register(TypeId::of::<Vec<Any>>(), |id| {
        ClassBuilder::new(QName::public("Array"))
            .parent(parent)
            .dynamic()
            .property(
                QName::public("length"),
                Some(MethodInfo::new(
                    vec![],
                    Some(ValueType::Uint),
                    Arc::new(length),
                )),
                None,
            )
            .method(
                QName::public("push"),
                MethodInfo::new(vec![], Some(ValueType::Uint), Arc::new(push)).with_rest(),
            )
            .build(id)
    })
}

fn length(_rt: &Runtime, receiver: &Any, _args: &[Any]) -> Result<Any> {
    let len = match receiver.as_object().map(|o| o.kind()) {
        Some(ObjectKind::Array(items)) => items.read().unwrap().len(),
        _ => 0,
    };
    Ok(Any::Uint(len as u32))
}

// the stub hands the pushed values over as the rest array
fn push(_rt: &Runtime, receiver: &Any, args: &[Any]) -> Result<Any> {
    let pushed: Vec<Any> = match args[0].as_object().map(|o| o.kind()) {
        Some(ObjectKind::Array(items)) => items.read().unwrap().clone(),
        _ => Vec::new(),
    };
    let len = match receiver.as_object().map(|o| o.kind()) {
        Some(ObjectKind::Array(items)) => {
            let mut items = items.write().unwrap();
            items.extend(pushed);
            items.len()
        }
        _ => 0,
    };
    Ok(Any::Uint(len as u32))
}
