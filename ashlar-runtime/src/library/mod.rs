//! The builtin classes: the classes the primitive tags dispatch through,
//! plus Object, Class, Function, Array and XML.

mod array;
mod number;
mod string;

use std::any::TypeId;

use ashlar_name::QName;

use crate::class::{ClassBuilder, ClassId, ClassRegistry};
use crate::value::Any;
use crate::xml::XmlNode;

#[derive(Debug, Clone, Copy)]
pub(crate) struct Builtins {
    pub(crate) object: ClassId,
    pub(crate) class: ClassId,
    pub(crate) function: ClassId,
    pub(crate) boolean: ClassId,
    pub(crate) int: ClassId,
    pub(crate) uint: ClassId,
    pub(crate) number: ClassId,
    pub(crate) string: ClassId,
    pub(crate) array: ClassId,
    pub(crate) xml: ClassId,
}

// marker types for builtins with no natural host type
struct ObjectMarker;
struct ClassMarker;
struct FunctionMarker;

pub(crate) fn register(registry: &ClassRegistry) -> Builtins {
    // Object must be registered first; the missing sentinel and the
    // undefined/null receivers rely on its id
    let object = registry.get_or_register(TypeId::of::<ObjectMarker>(), |id| {
        ClassBuilder::new(QName::public("Object")).dynamic().build(id)
    });
    let object_class = registry.get(object);
    let class = registry.get_or_register(TypeId::of::<ClassMarker>(), |id| {
        ClassBuilder::new(QName::public("Class"))
            .parent(&object_class)
            .build(id)
    });
    let function = registry.get_or_register(TypeId::of::<FunctionMarker>(), |id| {
        ClassBuilder::new(QName::public("Function"))
            .parent(&object_class)
            .build(id)
    });
    let boolean = registry.get_or_register(TypeId::of::<bool>(), |id| {
        ClassBuilder::new(QName::public("Boolean"))
            .parent(&object_class)
            .build(id)
    });
    let number = number::register(registry, &object_class);
    let int = registry.get_or_register(TypeId::of::<i32>(), |id| {
        ClassBuilder::new(QName::public("int"))
            .parent(&object_class)
            .constant(QName::public("MAX_VALUE"), Any::Int(i32::MAX))
            .constant(QName::public("MIN_VALUE"), Any::Int(i32::MIN))
            .build(id)
    });
    let uint = registry.get_or_register(TypeId::of::<u32>(), |id| {
        ClassBuilder::new(QName::public("uint"))
            .parent(&object_class)
            .constant(QName::public("MAX_VALUE"), Any::Uint(u32::MAX))
            .constant(QName::public("MIN_VALUE"), Any::Uint(0))
            .build(id)
    });
    let string = string::register(registry, &object_class);
    let array = array::register(registry, &object_class);
    let xml = registry.get_or_register(TypeId::of::<XmlNode>(), |id| {
        ClassBuilder::new(QName::public("XML"))
            .parent(&object_class)
            .build(id)
    });
    Builtins {
        object,
        class,
        function,
        boolean,
        int,
        uint,
        number,
        string,
        array,
        xml,
    }
}
