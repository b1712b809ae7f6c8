use std::sync::{Arc, OnceLock, RwLock};

use ahash::{HashMap, HashMapExt};
use ashlar_name::QName;

use crate::class::{MetadataTagCollection, MethodInfo, Trait};
use crate::stub::MethodStub;
use crate::value::Any;

/// A class handle: an index into the owning registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassId(u32);

impl ClassId {
    pub(crate) fn new(index: usize) -> ClassId {
        ClassId(index as u32)
    }

    /// The position in the registry.
    pub fn index(&self) -> usize {
        self.0 as usize
    }

    // the base object class is always registered first
    pub(crate) const fn object() -> ClassId {
        ClassId(0)
    }
}

/// The ordered trait table of one class, with lookup indexes by exact
/// qualified name and by local name.
#[derive(Debug, Default)]
pub struct TraitTable {
    traits: Vec<Arc<Trait>>,
    by_qname: HashMap<QName, usize>,
    by_local: HashMap<String, Vec<usize>>,
}

impl TraitTable {
    pub(crate) fn build(traits: Vec<Trait>) -> Self {
        let traits: Vec<Arc<Trait>> = traits.into_iter().map(Arc::new).collect();
        let mut by_qname = HashMap::with_capacity(traits.len());
        let mut by_local: HashMap<String, Vec<usize>> = HashMap::new();
        for (index, t) in traits.iter().enumerate() {
            // a redeclared name shadows the earlier declaration
            by_qname.insert(t.name().clone(), index);
            by_local
                .entry(t.name().local_name().to_string())
                .or_default()
                .push(index);
        }
        TraitTable {
            traits,
            by_qname,
            by_local,
        }
    }

    /// The trait with exactly this qualified name.
    pub fn get(&self, name: &QName) -> Option<&Arc<Trait>> {
        self.by_qname.get(name).map(|index| &self.traits[*index])
    }

    /// Indexes of every trait sharing a local name, in declaration order.
    pub fn locals(&self, local_name: &str) -> &[usize] {
        self.by_local
            .get(local_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The trait at a declaration-order index.
    pub fn by_index(&self, index: usize) -> &Arc<Trait> {
        &self.traits[index]
    }

    /// All traits in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Arc<Trait>> {
        self.traits.iter()
    }

    /// The number of declared traits.
    pub fn len(&self) -> usize {
        self.traits.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.traits.is_empty()
    }
}

/// A class: name, ancestry, trait table, optional constructor, storage
/// layout for its fields. Immutable once built.
#[derive(Debug)]
pub struct Class {
    id: ClassId,
    name: QName,
    parent: Option<ClassId>,
    interfaces: Vec<ClassId>,
    is_dynamic: bool,
    traits: TraitTable,
    constructor: Option<Arc<MethodInfo>>,
    constructor_stub: OnceLock<Arc<MethodStub>>,
    instance_slot_count: usize,
    static_slots: Vec<RwLock<Any>>,
    metadata: MetadataTagCollection,
}

impl Class {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: ClassId,
        name: QName,
        parent: Option<ClassId>,
        interfaces: Vec<ClassId>,
        is_dynamic: bool,
        traits: TraitTable,
        constructor: Option<Arc<MethodInfo>>,
        instance_slot_count: usize,
        static_slot_count: usize,
        metadata: MetadataTagCollection,
    ) -> Self {
        Class {
            id,
            name,
            parent,
            interfaces,
            is_dynamic,
            traits,
            constructor,
            constructor_stub: OnceLock::new(),
            instance_slot_count,
            static_slots: (0..static_slot_count)
                .map(|_| RwLock::new(Any::Undefined))
                .collect(),
            metadata,
        }
    }

    /// The registry id of this class.
    pub fn id(&self) -> ClassId {
        self.id
    }

    /// The class's qualified name.
    pub fn name(&self) -> &QName {
        &self.name
    }

    /// The superclass, if any.
    pub fn parent(&self) -> Option<ClassId> {
        self.parent
    }

    /// Implemented interfaces.
    pub fn interfaces(&self) -> &[ClassId] {
        &self.interfaces
    }

    /// Whether instances accept dynamic properties.
    pub fn is_dynamic(&self) -> bool {
        self.is_dynamic
    }

    /// The trait table.
    pub fn traits(&self) -> &TraitTable {
        &self.traits
    }

    /// The class constructor; owned by the class, not in the trait table.
    pub fn constructor(&self) -> Option<&Arc<MethodInfo>> {
        self.constructor.as_ref()
    }

    /// Class-level metadata tags.
    pub fn metadata(&self) -> &MetadataTagCollection {
        &self.metadata
    }

    /// How many instance field slots an instance carries.
    pub fn instance_slot_count(&self) -> usize {
        self.instance_slot_count
    }

    pub(crate) fn static_slot(&self, index: usize) -> Any {
        self.static_slots[index].read().unwrap().clone()
    }

    pub(crate) fn set_static_slot(&self, index: usize, value: Any) {
        *self.static_slots[index].write().unwrap() = value;
    }

    /// The constructor's dispatch stub, emitted on first construction.
    pub(crate) fn constructor_stub(&self) -> Option<&Arc<MethodStub>> {
        let constructor = self.constructor.as_ref()?;
        Some(
            self.constructor_stub
                .get_or_init(|| Arc::new(MethodStub::for_method(constructor.clone()))),
        )
    }
}
