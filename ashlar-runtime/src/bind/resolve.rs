use std::sync::Arc;

use ashlar_name::{Namespace, NamespaceSet, QName};

use crate::bind::{BindOptions, BindResult, BindStatus};
use crate::class::{Class, ClassId, Trait, TraitKind, TraitTable};
use crate::convert::Coercion;
use crate::error::{Error, Result};
use crate::runtime::Runtime;
use crate::stub::Stub;
use crate::value::{Any, ObjectKind, ValueType};
use crate::xml::{Element, XmlNode};

// what a name resolved to, before the operation is applied
enum Resolved {
    Trait(Arc<Trait>),
    DynamicValue(QName, Any),
    Ambiguous,
    Miss,
}

enum Lookup {
    Hit(Arc<Trait>),
    Ambiguous,
    Miss,
}

impl Runtime {
    fn receiver_class(&self, receiver: &Any) -> Result<Arc<Class>> {
        if receiver.is_undefined() || receiver.is_null() {
            return Err(Error::NullAccess);
        }
        Ok(self.registry().get(self.class_of(receiver)))
    }

    // trait search: the class chain derived-first, then interface-declared
    // traits, walking each interface's own chain
    fn resolve_qname(&self, class: &Arc<Class>, name: &QName) -> Option<Arc<Trait>> {
        let mut current = Some(class.clone());
        while let Some(c) = current {
            if let Some(t) = c.traits().get(name) {
                return Some(t.clone());
            }
            current = c.parent().map(|id| self.registry().get(id));
        }
        let mut current = Some(class.clone());
        while let Some(c) = current {
            for interface in c.interfaces() {
                let mut iface = Some(self.registry().get(*interface));
                while let Some(i) = iface {
                    if let Some(t) = i.traits().get(name) {
                        return Some(t.clone());
                    }
                    iface = i.parent().map(|id| self.registry().get(id));
                }
            }
            current = c.parent().map(|id| self.registry().get(id));
        }
        None
    }

    // namespace-set search: within one derivation level the set is walked
    // in declared order, and a second hit in a different namespace is
    // ambiguous; a hit on a more-derived class shadows base classes
    fn resolve_ns_set(&self, class: &Arc<Class>, local: &str, set: &NamespaceSet) -> Lookup {
        let mut current = Some(class.clone());
        while let Some(c) = current {
            match table_lookup_set(c.traits(), local, set) {
                Lookup::Miss => {}
                other => return other,
            }
            current = c.parent().map(|id| self.registry().get(id));
        }
        let mut current = Some(class.clone());
        while let Some(c) = current {
            for interface in c.interfaces() {
                let mut iface = Some(self.registry().get(*interface));
                while let Some(i) = iface {
                    match table_lookup_set(i.traits(), local, set) {
                        Lookup::Miss => {}
                        other => return other,
                    }
                    iface = i.parent().map(|id| self.registry().get(id));
                }
            }
            current = c.parent().map(|id| self.registry().get(id));
        }
        Lookup::Miss
    }

    fn resolve_value(&self, receiver: &Any, name: &QName) -> Result<Resolved> {
        let class = self.receiver_class(receiver)?;
        if let Some(t) = self.resolve_qname(&class, name) {
            return Ok(Resolved::Trait(t));
        }
        if let Some(object) = receiver.as_object() {
            if let Some(value) = object.dynamic_property(name) {
                return Ok(Resolved::DynamicValue(name.clone(), value));
            }
        }
        Ok(Resolved::Miss)
    }

    fn resolve_value_in_set(
        &self,
        receiver: &Any,
        local: &str,
        set: &NamespaceSet,
    ) -> Result<Resolved> {
        let class = self.receiver_class(receiver)?;
        match self.resolve_ns_set(&class, local, set) {
            Lookup::Hit(t) => return Ok(Resolved::Trait(t)),
            Lookup::Ambiguous => return Ok(Resolved::Ambiguous),
            Lookup::Miss => {}
        }
        if let Some(object) = receiver.as_object() {
            let mut found: Option<(QName, Any)> = None;
            for ns in set {
                let name = QName::new(ns.clone(), local);
                if let Some(value) = object.dynamic_property(&name) {
                    if let Some((prev, _)) = &found {
                        if prev.namespace() != name.namespace() {
                            return Ok(Resolved::Ambiguous);
                        }
                    } else {
                        found = Some((name, value));
                    }
                }
            }
            if let Some((name, value)) = found {
                return Ok(Resolved::DynamicValue(name, value));
            }
        }
        Ok(Resolved::Miss)
    }

    /// Resolve a get by qualified name.
    pub fn get_property(&self, receiver: &Any, name: &QName) -> Result<BindResult> {
        match self.resolve_value(receiver, name)? {
            Resolved::Trait(t) => self.get_trait(receiver, &t),
            Resolved::DynamicValue(_, value) => Ok(BindResult::found(value)),
            Resolved::Ambiguous => Ok(BindResult::status(BindStatus::Ambiguous)),
            Resolved::Miss => Ok(self.miss_result(receiver)),
        }
    }

    /// Resolve a get by local name over a namespace set.
    pub fn get_property_in_set(
        &self,
        receiver: &Any,
        local: &str,
        set: &NamespaceSet,
    ) -> Result<BindResult> {
        match self.resolve_value_in_set(receiver, local, set)? {
            Resolved::Trait(t) => self.get_trait(receiver, &t),
            Resolved::DynamicValue(_, value) => Ok(BindResult::found(value)),
            Resolved::Ambiguous => Ok(BindResult::status(BindStatus::Ambiguous)),
            Resolved::Miss => Ok(self.miss_result(receiver)),
        }
    }

    // a failed get on a dynamic receiver is found-as-undefined
    fn miss_result(&self, receiver: &Any) -> BindResult {
        match receiver.as_object() {
            Some(object) if object.is_dynamic() => BindResult::soft(Any::Undefined),
            _ => BindResult::status(BindStatus::NotFound),
        }
    }

    fn get_trait(&self, receiver: &Any, t: &Arc<Trait>) -> Result<BindResult> {
        match t.kind() {
            TraitKind::Constant(value) => Ok(BindResult::found(value.clone())),
            TraitKind::Field(_) => match &**t.stub() {
                Stub::Field(stub) => Ok(BindResult::found(stub.invoke(
                    self,
                    receiver,
                    Any::Undefined,
                    false,
                )?)),
                _ => unreachable!("field trait without field stub"),
            },
            TraitKind::Method(_) => Ok(BindResult::found(self.bind_method(receiver, t))),
            TraitKind::Property { .. } => match &**t.stub() {
                Stub::Property {
                    getter: Some(getter),
                    ..
                } => Ok(BindResult::found(getter.call(self, receiver, &[])?)),
                Stub::Property { getter: None, .. } => {
                    Ok(BindResult::status(BindStatus::FailedWriteOnly))
                }
                _ => unreachable!("property trait without property stub"),
            },
        }
    }

    // reading a method trait yields a function closed over the receiver
    fn bind_method(&self, receiver: &Any, t: &Arc<Trait>) -> Any {
        let stub = match &**t.stub() {
            Stub::Method(stub) => stub.clone(),
            _ => unreachable!("method trait without method stub"),
        };
        let bound = receiver.clone();
        self.new_function(Arc::new(move |rt: &Runtime, _this: &Any, args: &[Any]| {
            stub.call(rt, &bound, args)
        }))
    }

    /// Resolve a set by qualified name.
    pub fn set_property(&self, receiver: &Any, name: &QName, value: Any) -> Result<BindStatus> {
        match self.resolve_value(receiver, name)? {
            Resolved::Trait(t) => self.set_trait(receiver, &t, value),
            Resolved::DynamicValue(name, _) => {
                self.set_dynamic(receiver, name, value);
                Ok(BindStatus::Success)
            }
            Resolved::Ambiguous => Ok(BindStatus::Ambiguous),
            Resolved::Miss => Ok(self.set_miss(receiver, name.clone(), value)),
        }
    }

    /// Resolve a set by local name over a namespace set; creation of a new
    /// dynamic slot uses the public namespace when the set carries it.
    pub fn set_property_in_set(
        &self,
        receiver: &Any,
        local: &str,
        set: &NamespaceSet,
        value: Any,
    ) -> Result<BindStatus> {
        match self.resolve_value_in_set(receiver, local, set)? {
            Resolved::Trait(t) => self.set_trait(receiver, &t, value),
            Resolved::DynamicValue(name, _) => {
                self.set_dynamic(receiver, name, value);
                Ok(BindStatus::Success)
            }
            Resolved::Ambiguous => Ok(BindStatus::Ambiguous),
            Resolved::Miss => {
                if set.contains(&Namespace::public()) {
                    Ok(self.set_miss(receiver, QName::public(local), value))
                } else {
                    Ok(BindStatus::NotFound)
                }
            }
        }
    }

    fn set_dynamic(&self, receiver: &Any, name: QName, value: Any) {
        if let Some(object) = receiver.as_object() {
            object.set_dynamic_property(name, value);
        }
    }

    fn set_miss(&self, receiver: &Any, name: QName, value: Any) -> BindStatus {
        match receiver.as_object() {
            Some(object) if object.is_dynamic() => {
                object.set_dynamic_property(name, value);
                BindStatus::Success
            }
            _ => BindStatus::NotFound,
        }
    }

    fn set_trait(&self, receiver: &Any, t: &Arc<Trait>, value: Any) -> Result<BindStatus> {
        match t.kind() {
            TraitKind::Constant(_) => Ok(BindStatus::FailedReadOnly),
            TraitKind::Method(_) => Ok(BindStatus::FailedReadOnly),
            TraitKind::Field(_) => match &**t.stub() {
                Stub::Field(stub) => {
                    if !stub.writable() {
                        return Ok(BindStatus::FailedReadOnly);
                    }
                    match stub.invoke(self, receiver, value, true) {
                        Ok(_) => Ok(BindStatus::Success),
                        Err(Error::Cast { .. }) => Ok(BindStatus::FailedAssignType),
                        Err(other) => Err(other),
                    }
                }
                _ => unreachable!("field trait without field stub"),
            },
            TraitKind::Property { .. } => match &**t.stub() {
                Stub::Property {
                    setter: Some(setter),
                    ..
                } => match setter.call(self, receiver, &[value]) {
                    Ok(_) => Ok(BindStatus::Success),
                    Err(Error::Cast { .. }) => Ok(BindStatus::FailedAssignType),
                    Err(other) => Err(other),
                },
                Stub::Property { setter: None, .. } => Ok(BindStatus::FailedReadOnly),
                _ => unreachable!("property trait without property stub"),
            },
        }
    }

    /// Resolve and invoke by qualified name.
    pub fn call_property(
        &self,
        receiver: &Any,
        name: &QName,
        args: &[Any],
    ) -> Result<BindResult> {
        match self.resolve_value(receiver, name)? {
            Resolved::Trait(t) => self.call_trait(receiver, &t, args),
            Resolved::DynamicValue(_, value) => self.call_value(&value, receiver, args),
            Resolved::Ambiguous => Ok(BindResult::status(BindStatus::Ambiguous)),
            Resolved::Miss => Ok(BindResult::status(BindStatus::NotFound)),
        }
    }

    /// Resolve and invoke by local name over a namespace set.
    pub fn call_property_in_set(
        &self,
        receiver: &Any,
        local: &str,
        set: &NamespaceSet,
        args: &[Any],
    ) -> Result<BindResult> {
        match self.resolve_value_in_set(receiver, local, set)? {
            Resolved::Trait(t) => self.call_trait(receiver, &t, args),
            Resolved::DynamicValue(_, value) => self.call_value(&value, receiver, args),
            Resolved::Ambiguous => Ok(BindResult::status(BindStatus::Ambiguous)),
            Resolved::Miss => Ok(BindResult::status(BindStatus::NotFound)),
        }
    }

    fn call_trait(&self, receiver: &Any, t: &Arc<Trait>, args: &[Any]) -> Result<BindResult> {
        match t.kind() {
            TraitKind::Method(_) => match &**t.stub() {
                Stub::Method(stub) => Ok(BindResult::found(stub.call(self, receiver, args)?)),
                _ => unreachable!("method trait without method stub"),
            },
            // constants are not invocable, whatever they hold
            TraitKind::Constant(_) => Ok(BindResult::status(BindStatus::FailedNotFunction)),
            TraitKind::Field(_) | TraitKind::Property { .. } => {
                let got = self.get_trait(receiver, t)?;
                match got.value {
                    Some(value) => self.call_value(&value, receiver, args),
                    None => Ok(got),
                }
            }
        }
    }

    fn call_value(&self, value: &Any, receiver: &Any, args: &[Any]) -> Result<BindResult> {
        match value.as_object().map(|o| o.kind()) {
            Some(ObjectKind::Function(native)) => {
                Ok(BindResult::found(native(self, receiver, args)?))
            }
            Some(ObjectKind::Class(target)) => {
                // calling a class is an explicit conversion
                if args.is_empty() {
                    return Err(Error::TooFewArguments { min: 1, got: 0 });
                }
                if args.len() > 1 {
                    return Err(Error::TooManyArguments {
                        max: 1,
                        got: args.len(),
                    });
                }
                let coercion = Coercion::get(ValueType::Any, self.class_value_type(*target));
                Ok(BindResult::found(coercion.convert(self, &args[0])?))
            }
            _ => Ok(BindResult::status(BindStatus::FailedNotFunction)),
        }
    }

    /// Resolve and construct by qualified name.
    pub fn construct_property(
        &self,
        receiver: &Any,
        name: &QName,
        args: &[Any],
    ) -> Result<BindResult> {
        match self.resolve_value(receiver, name)? {
            Resolved::Trait(t) => self.construct_trait(receiver, &t, args),
            Resolved::DynamicValue(_, value) => self.construct_value(&value, args),
            Resolved::Ambiguous => Ok(BindResult::status(BindStatus::Ambiguous)),
            Resolved::Miss => Ok(BindResult::status(BindStatus::NotFound)),
        }
    }

    /// Resolve and construct by local name over a namespace set.
    pub fn construct_property_in_set(
        &self,
        receiver: &Any,
        local: &str,
        set: &NamespaceSet,
        args: &[Any],
    ) -> Result<BindResult> {
        match self.resolve_value_in_set(receiver, local, set)? {
            Resolved::Trait(t) => self.construct_trait(receiver, &t, args),
            Resolved::DynamicValue(_, value) => self.construct_value(&value, args),
            Resolved::Ambiguous => Ok(BindResult::status(BindStatus::Ambiguous)),
            Resolved::Miss => Ok(BindResult::status(BindStatus::NotFound)),
        }
    }

    fn construct_trait(&self, receiver: &Any, t: &Arc<Trait>, args: &[Any]) -> Result<BindResult> {
        match t.kind() {
            // constants and methods are not constructible
            TraitKind::Constant(_) | TraitKind::Method(_) => {
                Ok(BindResult::status(BindStatus::FailedNotConstructor))
            }
            TraitKind::Field(_) | TraitKind::Property { .. } => {
                let got = self.get_trait(receiver, t)?;
                match got.value {
                    Some(value) => self.construct_value(&value, args),
                    None => Ok(got),
                }
            }
        }
    }

    fn construct_value(&self, value: &Any, args: &[Any]) -> Result<BindResult> {
        match value.as_object().map(|o| o.kind()) {
            Some(ObjectKind::Class(target)) => {
                Ok(BindResult::found(self.construct(*target, args)?))
            }
            _ => Ok(BindResult::status(BindStatus::FailedNotConstructor)),
        }
    }

    /// Instantiate a class and run its constructor.
    pub fn construct(&self, class_id: ClassId, args: &[Any]) -> Result<Any> {
        let class = self.registry().get(class_id);
        let instance = self.new_instance_of(&class);
        if let Some(stub) = class.constructor_stub() {
            stub.call(self, &instance, args)?;
        }
        Ok(instance)
    }

    /// Resolve an XML attribute by qualified name: the attribute-trait
    /// analog of [`Runtime::get_property`].
    pub fn get_attribute(&self, receiver: &Any, name: &QName) -> Result<BindResult> {
        let Some(element) = xml_element(receiver) else {
            return Ok(BindResult::status(BindStatus::NotFound));
        };
        for attribute in element.attributes() {
            if attribute.name() == name {
                return Ok(BindResult::found(Any::String(attribute.value_shared())));
            }
        }
        Ok(BindResult::status(BindStatus::NotFound))
    }

    /// Resolve an XML attribute by local name over a namespace set.
    pub fn get_attribute_in_set(
        &self,
        receiver: &Any,
        local: &str,
        set: &NamespaceSet,
    ) -> Result<BindResult> {
        let Some(element) = xml_element(receiver) else {
            return Ok(BindResult::status(BindStatus::NotFound));
        };
        let mut found: Option<&crate::xml::Attribute> = None;
        for attribute in element.attributes() {
            if attribute.name().local_name() == local
                && set.contains(attribute.name().namespace())
            {
                if let Some(prev) = found {
                    if prev.name().namespace() != attribute.name().namespace() {
                        return Ok(BindResult::status(BindStatus::Ambiguous));
                    }
                } else {
                    found = Some(attribute);
                }
            }
        }
        match found {
            Some(attribute) => Ok(BindResult::found(Any::String(attribute.value_shared()))),
            None => Ok(BindResult::status(BindStatus::NotFound)),
        }
    }

    // lookup-only membership check for the scope stack; runs no accessors
    pub(crate) fn probe(
        &self,
        object: &Any,
        name: &QName,
        options: BindOptions,
        is_attribute: bool,
    ) -> Result<BindStatus> {
        if is_attribute || options.attributes {
            return Ok(self.get_attribute(object, name)?.status);
        }
        if object.is_undefined() || object.is_null() {
            return Err(Error::NullAccess);
        }
        if options.traits {
            let class = self.registry().get(self.class_of(object));
            if self.resolve_qname(&class, name).is_some() {
                return Ok(BindStatus::Success);
            }
        }
        if options.dynamic {
            if let Some(o) = object.as_object() {
                if o.has_dynamic_property(name) {
                    return Ok(BindStatus::Success);
                }
            }
        }
        Ok(BindStatus::NotFound)
    }
}

fn table_lookup_set(table: &TraitTable, local: &str, set: &NamespaceSet) -> Lookup {
    let mut found: Option<Arc<Trait>> = None;
    for ns in set {
        let name = QName::new(ns.clone(), local);
        if let Some(t) = table.get(&name) {
            if let Some(prev) = &found {
                if prev.name().namespace() != t.name().namespace() {
                    return Lookup::Ambiguous;
                }
            } else {
                found = Some(t.clone());
            }
        }
    }
    match found {
        Some(t) => Lookup::Hit(t),
        None => Lookup::Miss,
    }
}

fn xml_element(receiver: &Any) -> Option<&Arc<Element>> {
    match receiver.as_object()?.kind() {
        ObjectKind::Xml(XmlNode::Element(element)) => Some(element),
        _ => None,
    }
}
