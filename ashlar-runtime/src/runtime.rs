use std::sync::{Arc, RwLock};

use crate::class::{Class, ClassId, ClassRegistry};
use crate::error::{Error, Result};
use crate::library::{self, Builtins};
use crate::value::{Any, NativeFn, ObjectKind, ObjectValue, ValueType};
use crate::xml::XmlNode;

/// The runtime: the class registry plus the pre-registered builtin
/// classes for the primitive tags.
///
/// A runtime is shared across host threads; everything it hands out is
/// `Send + Sync`.
#[derive(Debug)]
pub struct Runtime {
    registry: ClassRegistry,
    builtins: Builtins,
}

impl Runtime {
    /// A runtime with the builtin classes registered.
    pub fn new() -> Self {
        let registry = ClassRegistry::new();
        let builtins = library::register(&registry);
        Runtime { registry, builtins }
    }

    /// The class registry.
    pub fn registry(&self) -> &ClassRegistry {
        &self.registry
    }

    /// The base object class.
    pub fn object_class(&self) -> ClassId {
        self.builtins.object
    }

    /// The class a value dispatches through.
    pub fn class_of(&self, value: &Any) -> ClassId {
        match value {
            Any::Undefined | Any::Null => self.builtins.object,
            Any::Boolean(_) => self.builtins.boolean,
            Any::Int(_) => self.builtins.int,
            Any::Uint(_) => self.builtins.uint,
            Any::Number(_) => self.builtins.number,
            Any::String(_) => self.builtins.string,
            Any::Object(object) => object.class(),
        }
    }

    /// Whether `class` is `ancestor` or derives from it, through the
    /// parent chain or an implemented interface.
    pub fn is_subclass(&self, class: ClassId, ancestor: ClassId) -> bool {
        if ancestor == self.builtins.object {
            return true;
        }
        let mut current = Some(class);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            let c = self.registry.get(id);
            for interface in c.interfaces() {
                if self.is_subclass(*interface, ancestor) {
                    return true;
                }
            }
            current = c.parent();
        }
        false
    }

    pub(crate) fn new_instance_of(&self, class: &Arc<Class>) -> Any {
        Any::Object(Arc::new(ObjectValue::new(
            class.id(),
            ObjectKind::Plain,
            class.instance_slot_count(),
            class.is_dynamic(),
        )))
    }

    /// A fresh instance of the class, slots undefined, constructor not
    /// run; see [`Runtime::construct`] for full construction.
    pub fn new_instance(&self, class_id: ClassId) -> Any {
        self.new_instance_of(&self.registry.get(class_id))
    }

    /// A dense array object; also the rest-parameter container.
    pub fn new_array(&self, items: Vec<Any>) -> Any {
        Any::Object(Arc::new(ObjectValue::new(
            self.builtins.array,
            ObjectKind::Array(RwLock::new(items)),
            0,
            true,
        )))
    }

    /// A callable wrapping a native function.
    pub fn new_function(&self, native: NativeFn) -> Any {
        Any::Object(Arc::new(ObjectValue::new(
            self.builtins.function,
            ObjectKind::Function(native),
            0,
            false,
        )))
    }

    /// The class object for a class: the receiver for static access and
    /// the target of construction.
    pub fn new_class_object(&self, class: ClassId) -> Any {
        Any::Object(Arc::new(ObjectValue::new(
            self.builtins.class,
            ObjectKind::Class(class),
            0,
            false,
        )))
    }

    /// An XML object wrapping a parsed node.
    pub fn new_xml(&self, node: XmlNode) -> Any {
        Any::Object(Arc::new(ObjectValue::new(
            self.builtins.xml,
            ObjectKind::Xml(node),
            0,
            false,
        )))
    }

    /// Invoke a function object directly.
    pub fn call_function(&self, function: &Any, receiver: &Any, args: &[Any]) -> Result<Any> {
        match function.as_object().map(|o| o.kind()) {
            Some(ObjectKind::Function(native)) => native(self, receiver, args),
            _ => Err(Error::Cast {
                from: function.value_type(),
                to: ValueType::Class(self.builtins.function),
            }),
        }
    }

    // the declared type a class stands for; primitive classes map back
    // to their primitive types so class calls coerce correctly
    pub(crate) fn class_value_type(&self, id: ClassId) -> ValueType {
        let b = &self.builtins;
        if id == b.boolean {
            ValueType::Boolean
        } else if id == b.int {
            ValueType::Int
        } else if id == b.uint {
            ValueType::Uint
        } else if id == b.number {
            ValueType::Number
        } else if id == b.string {
            ValueType::String
        } else if id == b.object {
            ValueType::Object
        } else {
            ValueType::Class(id)
        }
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Runtime::new()
    }
}
