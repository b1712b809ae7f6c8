use std::fmt;
use std::sync::{Arc, LazyLock, RwLock};

use ahash::{HashMap, HashMapExt};
use ashlar_name::QName;

use crate::class::ClassId;
use crate::error;
use crate::runtime::Runtime;
use crate::value::Any;
use crate::xml::XmlNode;

/// A native function: the uniform callable everything dispatches through.
pub type NativeFn = Arc<dyn Fn(&Runtime, &Any, &[Any]) -> error::Result<Any> + Send + Sync>;

/// What a heap object is, beyond its class.
pub enum ObjectKind {
    /// An ordinary instance.
    Plain,
    /// A class object; the target of construction.
    Class(ClassId),
    /// A callable.
    Function(NativeFn),
    /// A densely stored array; also the rest-parameter container.
    Array(RwLock<Vec<Any>>),
    /// An E4X node.
    Xml(XmlNode),
    /// The missing-optional-parameter sentinel; one exists per process.
    Missing,
}

impl fmt::Debug for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKind::Plain => write!(f, "Plain"),
            ObjectKind::Class(id) => f.debug_tuple("Class").field(id).finish(),
            ObjectKind::Function(_) => write!(f, "Function"),
            ObjectKind::Array(items) => f.debug_tuple("Array").field(&items.read().unwrap().len()).finish(),
            ObjectKind::Xml(node) => f.debug_tuple("Xml").field(node).finish(),
            ObjectKind::Missing => write!(f, "Missing"),
        }
    }
}

/// A heap object: a class reference, slot storage for the class's fields,
/// and (for dynamic classes) a property bag.
#[derive(Debug)]
pub struct ObjectValue {
    class: ClassId,
    kind: ObjectKind,
    slots: RwLock<Vec<Any>>,
    bag: Option<RwLock<HashMap<QName, Any>>>,
}

impl ObjectValue {
    pub(crate) fn new(class: ClassId, kind: ObjectKind, slot_count: usize, dynamic: bool) -> Self {
        ObjectValue {
            class,
            kind,
            slots: RwLock::new(vec![Any::Undefined; slot_count]),
            bag: dynamic.then(|| RwLock::new(HashMap::new())),
        }
    }

    /// The object's class.
    #[inline]
    pub fn class(&self) -> ClassId {
        self.class
    }

    /// What kind of object this is.
    #[inline]
    pub fn kind(&self) -> &ObjectKind {
        &self.kind
    }

    /// Whether the object accepts dynamic properties.
    pub fn is_dynamic(&self) -> bool {
        self.bag.is_some()
    }

    pub(crate) fn slot(&self, index: usize) -> Any {
        self.slots.read().unwrap()[index].clone()
    }

    pub(crate) fn set_slot(&self, index: usize, value: Any) {
        self.slots.write().unwrap()[index] = value;
    }

    /// Read a dynamic property; `None` when absent or the object is sealed.
    pub fn dynamic_property(&self, name: &QName) -> Option<Any> {
        let bag = self.bag.as_ref()?;
        bag.read().unwrap().get(name).cloned()
    }

    /// Whether a dynamic property exists.
    pub fn has_dynamic_property(&self, name: &QName) -> bool {
        match &self.bag {
            Some(bag) => bag.read().unwrap().contains_key(name),
            None => false,
        }
    }

    /// Create or overwrite a dynamic property. Fails silently on sealed
    /// objects; callers check [`ObjectValue::is_dynamic`] first.
    pub fn set_dynamic_property(&self, name: QName, value: Any) {
        if let Some(bag) = &self.bag {
            bag.write().unwrap().insert(name, value);
        }
    }
}

static MISSING: LazyLock<Any> = LazyLock::new(|| {
    // the sentinel's class is never consulted
    Any::Object(Arc::new(ObjectValue::new(
        ClassId::object(),
        ObjectKind::Missing,
        0,
        false,
    )))
});

pub(crate) fn missing_sentinel() -> Any {
    MISSING.clone()
}
