use std::fmt;
use std::sync::{Arc, OnceLock};

use ashlar_name::QName;

use crate::class::{ClassId, MetadataTagCollection};
use crate::stub::Stub;
use crate::value::{Any, NativeFn, ValueType};

/// A declared member of a class.
#[derive(Debug)]
pub struct Trait {
    name: QName,
    declaring_class: ClassId,
    is_static: bool,
    metadata: MetadataTagCollection,
    kind: TraitKind,
    stub: OnceLock<Arc<Stub>>,
}

impl Trait {
    pub(crate) fn new(
        name: QName,
        declaring_class: ClassId,
        is_static: bool,
        metadata: MetadataTagCollection,
        kind: TraitKind,
    ) -> Self {
        Trait {
            name,
            declaring_class,
            is_static,
            metadata,
            kind,
            stub: OnceLock::new(),
        }
    }

    /// The trait's qualified name.
    pub fn name(&self) -> &QName {
        &self.name
    }

    /// The class that declared this trait, by id.
    pub fn declaring_class(&self) -> ClassId {
        self.declaring_class
    }

    /// Whether the trait lives on the class rather than its instances.
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// The trait's metadata tags.
    pub fn metadata(&self) -> &MetadataTagCollection {
        &self.metadata
    }

    /// Which kind of member this is.
    pub fn kind(&self) -> &TraitKind {
        &self.kind
    }

    /// The dispatch stub for this trait, emitted on first use.
    ///
    /// Concurrent first calls may race; the one stub that survives in the
    /// cell is what every dispatch from then on uses.
    pub(crate) fn stub(&self) -> &Arc<Stub> {
        self.stub.get_or_init(|| Arc::new(Stub::for_trait(self)))
    }
}

/// The trait variants.
#[derive(Debug)]
pub enum TraitKind {
    /// A typed, slot-backed field.
    Field(FieldInfo),
    /// An immutable value, inlined into the trait.
    Constant(Any),
    /// A method.
    Method(Arc<MethodInfo>),
    /// An accessor pair; either side may be absent.
    Property {
        /// The getter, if the property is readable.
        getter: Option<Arc<MethodInfo>>,
        /// The setter, if the property is writable.
        setter: Option<Arc<MethodInfo>>,
    },
}

/// The shape of a field trait.
#[derive(Debug, Clone, Copy)]
pub struct FieldInfo {
    pub(crate) slot: usize,
    pub(crate) value_type: ValueType,
    pub(crate) writable: bool,
}

impl FieldInfo {
    /// The field's declared type.
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Whether the field accepts writes.
    pub fn writable(&self) -> bool {
        self.writable
    }
}

/// The shape of a native method: parameters, rest flag, return type and
/// the function itself.
pub struct MethodInfo {
    params: Vec<ParamInfo>,
    has_rest: bool,
    // None is a void return: the stub always yields undefined
    return_type: Option<ValueType>,
    native: NativeFn,
}

impl fmt::Debug for MethodInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodInfo")
            .field("params", &self.params)
            .field("has_rest", &self.has_rest)
            .field("return_type", &self.return_type)
            .finish()
    }
}

impl MethodInfo {
    /// A method with the given parameters and return type.
    pub fn new(params: Vec<ParamInfo>, return_type: Option<ValueType>, native: NativeFn) -> Self {
        MethodInfo {
            params,
            has_rest: false,
            return_type,
            native,
        }
    }

    /// Accept trailing arguments beyond the declared parameters, collected
    /// into a rest array.
    pub fn with_rest(mut self) -> Self {
        self.has_rest = true;
        self
    }

    /// The declared parameters.
    pub fn params(&self) -> &[ParamInfo] {
        &self.params
    }

    /// Whether trailing arguments are collected into a rest array.
    pub fn has_rest(&self) -> bool {
        self.has_rest
    }

    /// The declared return type; `None` for void.
    pub fn return_type(&self) -> Option<ValueType> {
        self.return_type
    }

    /// How many arguments a caller must supply.
    pub fn required_count(&self) -> usize {
        self.params.iter().take_while(|p| !p.optional).count()
    }

    pub(crate) fn native(&self) -> &NativeFn {
        &self.native
    }
}

/// One declared parameter.
#[derive(Debug, Clone)]
pub struct ParamInfo {
    pub(crate) value_type: ValueType,
    pub(crate) optional: bool,
    // an optional parameter without a default gets the missing sentinel
    pub(crate) default: Option<Any>,
}

impl ParamInfo {
    /// A required parameter.
    pub fn required(value_type: ValueType) -> Self {
        ParamInfo {
            value_type,
            optional: false,
            default: None,
        }
    }

    /// An optional parameter, with or without a default value.
    pub fn optional(value_type: ValueType, default: Option<Any>) -> Self {
        ParamInfo {
            value_type,
            optional: true,
            default,
        }
    }

    /// The parameter's declared type.
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }
}
