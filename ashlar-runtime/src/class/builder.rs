use std::sync::Arc;

use ashlar_name::QName;

use crate::class::{
    Class, ClassId, FieldInfo, MetadataTag, MetadataTagCollection, MethodInfo, Trait, TraitKind,
    TraitTable,
};
use crate::value::{Any, ValueType};

/// Builds an immutable [`Class`]: traits are declared in order, field
/// slots are assigned at build time, and the lookup indexes are frozen.
pub struct ClassBuilder {
    name: QName,
    parent: Option<ClassId>,
    // field slots continue the parent's numbering
    base_instance_slots: usize,
    interfaces: Vec<ClassId>,
    is_dynamic: bool,
    metadata: MetadataTagCollection,
    pending: Vec<Pending>,
    constructor: Option<Arc<MethodInfo>>,
}

struct Pending {
    name: QName,
    is_static: bool,
    metadata: MetadataTagCollection,
    kind: PendingKind,
}

enum PendingKind {
    Field { value_type: ValueType, writable: bool },
    Constant(Any),
    Method(Arc<MethodInfo>),
    Property {
        getter: Option<Arc<MethodInfo>>,
        setter: Option<Arc<MethodInfo>>,
    },
}

impl ClassBuilder {
    /// Start a class with the given qualified name.
    pub fn new(name: QName) -> Self {
        ClassBuilder {
            name,
            parent: None,
            base_instance_slots: 0,
            interfaces: Vec::new(),
            is_dynamic: false,
            metadata: MetadataTagCollection::new(),
            pending: Vec::new(),
            constructor: None,
        }
    }

    /// Set the superclass; the new class's field slots are laid out after
    /// the parent's.
    pub fn parent(mut self, parent: &Class) -> Self {
        self.parent = Some(parent.id());
        self.base_instance_slots = parent.instance_slot_count();
        self
    }

    /// Declare an implemented interface.
    pub fn implements(mut self, interface: ClassId) -> Self {
        self.interfaces.push(interface);
        self
    }

    /// Give instances a dynamic property bag.
    pub fn dynamic(mut self) -> Self {
        self.is_dynamic = true;
        self
    }

    /// Attach a metadata tag to the class itself.
    pub fn metadata(mut self, tag: MetadataTag) -> Self {
        self.metadata.push(tag);
        self
    }

    /// Declare a writable instance field.
    pub fn field(self, name: QName, value_type: ValueType) -> Self {
        self.push_field(name, value_type, true, false)
    }

    /// Declare a read-only instance field.
    pub fn read_only_field(self, name: QName, value_type: ValueType) -> Self {
        self.push_field(name, value_type, false, false)
    }

    /// Declare a writable static field.
    pub fn static_field(self, name: QName, value_type: ValueType) -> Self {
        self.push_field(name, value_type, true, true)
    }

    fn push_field(
        mut self,
        name: QName,
        value_type: ValueType,
        writable: bool,
        is_static: bool,
    ) -> Self {
        self.pending.push(Pending {
            name,
            is_static,
            metadata: MetadataTagCollection::new(),
            kind: PendingKind::Field {
                value_type,
                writable,
            },
        });
        self
    }

    /// Declare a constant; the value is inlined into the trait.
    pub fn constant(mut self, name: QName, value: Any) -> Self {
        self.pending.push(Pending {
            name,
            is_static: true,
            metadata: MetadataTagCollection::new(),
            kind: PendingKind::Constant(value),
        });
        self
    }

    /// Declare an instance method.
    pub fn method(self, name: QName, method: MethodInfo) -> Self {
        self.push_method(name, method, false)
    }

    /// Declare a static method.
    pub fn static_method(self, name: QName, method: MethodInfo) -> Self {
        self.push_method(name, method, true)
    }

    fn push_method(mut self, name: QName, method: MethodInfo, is_static: bool) -> Self {
        self.pending.push(Pending {
            name,
            is_static,
            metadata: MetadataTagCollection::new(),
            kind: PendingKind::Method(Arc::new(method)),
        });
        self
    }

    /// Declare an accessor property; either side may be absent.
    pub fn property(
        mut self,
        name: QName,
        getter: Option<MethodInfo>,
        setter: Option<MethodInfo>,
    ) -> Self {
        self.pending.push(Pending {
            name,
            is_static: false,
            metadata: MetadataTagCollection::new(),
            kind: PendingKind::Property {
                getter: getter.map(Arc::new),
                setter: setter.map(Arc::new),
            },
        });
        self
    }

    /// Attach a metadata tag to the most recently declared trait.
    pub fn tag(mut self, tag: MetadataTag) -> Self {
        if let Some(last) = self.pending.last_mut() {
            last.metadata.push(tag);
        }
        self
    }

    /// Set the class constructor; at most one per class.
    pub fn constructor(mut self, method: MethodInfo) -> Self {
        self.constructor = Some(Arc::new(method));
        self
    }

    /// Freeze into a class living at the given registry id.
    pub fn build(self, id: ClassId) -> Class {
        let mut instance_slots = self.base_instance_slots;
        let mut static_slots = 0;
        let traits: Vec<Trait> = self
            .pending
            .into_iter()
            .map(|pending| {
                let kind = match pending.kind {
                    PendingKind::Field {
                        value_type,
                        writable,
                    } => {
                        let slot = if pending.is_static {
                            let slot = static_slots;
                            static_slots += 1;
                            slot
                        } else {
                            let slot = instance_slots;
                            instance_slots += 1;
                            slot
                        };
                        TraitKind::Field(FieldInfo {
                            slot,
                            value_type,
                            writable,
                        })
                    }
                    PendingKind::Constant(value) => TraitKind::Constant(value),
                    PendingKind::Method(method) => TraitKind::Method(method),
                    PendingKind::Property { getter, setter } => {
                        TraitKind::Property { getter, setter }
                    }
                };
                Trait::new(pending.name, id, pending.is_static, pending.metadata, kind)
            })
            .collect();
        Class::new(
            id,
            self.name,
            self.parent,
            self.interfaces,
            self.is_dynamic,
            TraitTable::build(traits),
            self.constructor,
            instance_slots,
            static_slots,
            self.metadata,
        )
    }
}
