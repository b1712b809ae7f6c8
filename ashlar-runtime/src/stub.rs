//! Dispatch stubs: per-trait thunks of uniform shape.
//!
//! A stub is a compact coercion program built once per trait (cached in
//! the trait's once-cell) and interpreted by a small driver on every
//! dispatch. Field stubs are `(receiver, value, set) -> Any`; method and
//! constructor stubs are `(receiver, args) -> Any`. The stub absorbs
//! arity checking, per-parameter coercion, default and rest handling, and
//! boxing of the result; errors from the underlying native invocation
//! propagate unchanged.

use std::sync::Arc;

use crate::class::{ClassId, MethodInfo, Trait, TraitKind};
use crate::convert::Coercion;
use crate::error::{Error, Result};
use crate::runtime::Runtime;
use crate::value::{Any, NativeFn, ValueType};

/// The emitted stub for one trait.
#[derive(Debug)]
pub enum Stub {
    /// A slot load/store with coercion.
    Field(FieldStub),
    /// A method invocation.
    Method(Arc<MethodStub>),
    /// An accessor pair.
    Property {
        /// Getter thunk, when readable.
        getter: Option<Arc<MethodStub>>,
        /// Setter thunk, when writable.
        setter: Option<Arc<MethodStub>>,
    },
    /// Constants need no code; reads are served from the trait itself.
    Constant,
}

impl Stub {
    pub(crate) fn for_trait(t: &Trait) -> Stub {
        match t.kind() {
            TraitKind::Field(info) => Stub::Field(FieldStub {
                slot: info.slot,
                is_static: t.is_static(),
                declaring_class: t.declaring_class(),
                coerce: Coercion::get(ValueType::Any, info.value_type),
                writable: info.writable,
            }),
            TraitKind::Method(method) => {
                Stub::Method(Arc::new(MethodStub::for_method(method.clone())))
            }
            TraitKind::Property { getter, setter } => Stub::Property {
                getter: getter
                    .as_ref()
                    .map(|m| Arc::new(MethodStub::for_method(m.clone()))),
                setter: setter
                    .as_ref()
                    .map(|m| Arc::new(MethodStub::for_method(m.clone()))),
            },
            TraitKind::Constant(_) => Stub::Constant,
        }
    }
}

/// Field access thunk: load when `set` is false, store coerced otherwise.
#[derive(Debug)]
pub struct FieldStub {
    slot: usize,
    is_static: bool,
    declaring_class: ClassId,
    coerce: Coercion,
    writable: bool,
}

impl FieldStub {
    pub(crate) fn writable(&self) -> bool {
        self.writable
    }

    /// The uniform field operation: store `value` when `set`, returning
    /// undefined; load and box otherwise.
    pub fn invoke(&self, runtime: &Runtime, receiver: &Any, value: Any, set: bool) -> Result<Any> {
        if self.is_static {
            let class = runtime.registry().get(self.declaring_class);
            if set {
                let value = self.coerce.convert(runtime, &value)?;
                class.set_static_slot(self.slot, value);
                Ok(Any::Undefined)
            } else {
                Ok(class.static_slot(self.slot))
            }
        } else {
            let object = receiver.as_object().ok_or(Error::NullAccess)?;
            if set {
                let value = self.coerce.convert(runtime, &value)?;
                object.set_slot(self.slot, value);
                Ok(Any::Undefined)
            } else {
                Ok(object.slot(self.slot))
            }
        }
    }
}

// one step of the coercion program
#[derive(Debug)]
struct ParamPlan {
    coerce: Coercion,
    optional: bool,
    default: Option<Any>,
}

/// Method/constructor thunk: `(receiver, args) -> Any`.
pub struct MethodStub {
    required: usize,
    plans: Vec<ParamPlan>,
    has_rest: bool,
    // None is void: the call always yields undefined
    return_coerce: Option<Coercion>,
    native: NativeFn,
}

impl std::fmt::Debug for MethodStub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodStub")
            .field("required", &self.required)
            .field("arity", &self.plans.len())
            .field("has_rest", &self.has_rest)
            .finish()
    }
}

impl MethodStub {
    pub(crate) fn for_method(method: Arc<MethodInfo>) -> MethodStub {
        let plans = method
            .params()
            .iter()
            .map(|param| ParamPlan {
                coerce: Coercion::get(ValueType::Any, param.value_type),
                optional: param.optional,
                default: param.default.clone(),
            })
            .collect();
        MethodStub {
            required: method.required_count(),
            plans,
            has_rest: method.has_rest(),
            return_coerce: method
                .return_type()
                .map(|t| Coercion::get(ValueType::Any, t)),
            native: method.native().clone(),
        }
    }

    /// Invoke through the coercion program.
    pub fn call(&self, runtime: &Runtime, receiver: &Any, args: &[Any]) -> Result<Any> {
        if args.len() < self.required {
            return Err(Error::TooFewArguments {
                min: self.required,
                got: args.len(),
            });
        }
        if !self.has_rest && args.len() > self.plans.len() {
            return Err(Error::TooManyArguments {
                max: self.plans.len(),
                got: args.len(),
            });
        }
        let mut coerced = Vec::with_capacity(self.plans.len() + usize::from(self.has_rest));
        for (index, plan) in self.plans.iter().enumerate() {
            if index < args.len() {
                coerced.push(plan.coerce.convert(runtime, &args[index])?);
            } else {
                debug_assert!(plan.optional);
                match &plan.default {
                    Some(default) => coerced.push(default.clone()),
                    None => coerced.push(Any::missing()),
                }
            }
        }
        if self.has_rest {
            let rest = if args.len() > self.plans.len() {
                args[self.plans.len()..].to_vec()
            } else {
                Vec::new()
            };
            coerced.push(runtime.new_array(rest));
        }
        let result = (self.native)(runtime, receiver, &coerced)?;
        match &self.return_coerce {
            Some(coerce) => coerce.convert(runtime, &result),
            None => Ok(Any::Undefined),
        }
    }
}
