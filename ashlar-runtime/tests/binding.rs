use std::any::TypeId;
use std::sync::Arc;

use ashlar_name::{Namespace, NamespaceSet, QName};
use ashlar_runtime::bind::BindStatus;
use ashlar_runtime::class::{ClassBuilder, ClassId, MethodInfo, ParamInfo};
use ashlar_runtime::value::{Any, ObjectKind, ValueType};
use ashlar_runtime::{xml, Runtime};

struct PointKey;

fn point_class(rt: &Runtime) -> ClassId {
    let object = rt.registry().get(rt.object_class());
    rt.registry()
        .get_or_register(TypeId::of::<PointKey>(), |id| {
            ClassBuilder::new(QName::public("Point"))
                .parent(&object)
                .field(QName::public("x"), ValueType::Number)
                .field(QName::public("y"), ValueType::Number)
                .constant(QName::public("DIMENSIONS"), Any::Int(2))
                .method(
                    QName::public("lengthSquared"),
                    MethodInfo::new(
                        vec![],
                        Some(ValueType::Number),
                        Arc::new(|rt, receiver, _args| {
                            let x = rt
                                .get_property(receiver, &QName::public("x"))?
                                .into_value()
                                .unwrap()
                                .to_number();
                            let y = rt
                                .get_property(receiver, &QName::public("y"))?
                                .into_value()
                                .unwrap()
                                .to_number();
                            Ok(Any::Number(x * x + y * y))
                        }),
                    ),
                )
                .constructor(MethodInfo::new(
                    vec![
                        ParamInfo::optional(ValueType::Number, Some(Any::Number(0.0))),
                        ParamInfo::optional(ValueType::Number, Some(Any::Number(0.0))),
                    ],
                    None,
                    Arc::new(|rt, receiver, args| {
                        rt.set_property(receiver, &QName::public("x"), args[0].clone())?;
                        rt.set_property(receiver, &QName::public("y"), args[1].clone())?;
                        Ok(Any::Undefined)
                    }),
                ))
                .build(id)
        })
}

#[test]
fn test_field_get_set_with_coercion() {
    let rt = Runtime::new();
    let point = rt.construct(point_class(&rt), &[]).unwrap();
    let x = QName::public("x");

    assert_eq!(
        rt.set_property(&point, &x, Any::from("2.5")).unwrap(),
        BindStatus::Success
    );
    // the declared Number type coerced the string on the way in
    let got = rt.get_property(&point, &x).unwrap();
    assert_eq!(got.status, BindStatus::Success);
    assert_eq!(got.into_value(), Some(Any::Number(2.5)));
}

#[test]
fn test_binding_is_deterministic() {
    let rt = Runtime::new();
    let point = rt.construct(point_class(&rt), &[]).unwrap();
    let first = rt.get_property(&point, &QName::public("x")).unwrap();
    let second = rt.get_property(&point, &QName::public("x")).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_constant_statuses() {
    let rt = Runtime::new();
    let point = rt.construct(point_class(&rt), &[]).unwrap();
    let name = QName::public("DIMENSIONS");

    let got = rt.get_property(&point, &name).unwrap();
    assert_eq!(got.into_value(), Some(Any::Int(2)));
    assert_eq!(
        rt.set_property(&point, &name, Any::Int(3)).unwrap(),
        BindStatus::FailedReadOnly
    );
    assert_eq!(
        rt.call_property(&point, &name, &[]).unwrap().status,
        BindStatus::FailedNotFunction
    );
    assert_eq!(
        rt.construct_property(&point, &name, &[]).unwrap().status,
        BindStatus::FailedNotConstructor
    );
}

#[test]
fn test_missing_property_statuses() {
    let rt = Runtime::new();
    let point = rt.construct(point_class(&rt), &[]).unwrap();
    let name = QName::public("nope");

    // Point is sealed: a miss is a miss
    assert_eq!(
        rt.get_property(&point, &name).unwrap().status,
        BindStatus::NotFound
    );
    assert_eq!(
        rt.set_property(&point, &name, Any::Int(1)).unwrap(),
        BindStatus::NotFound
    );

    // a dynamic object reports soft success on a missing get
    let bag = rt.new_instance(rt.object_class());
    let got = rt.get_property(&bag, &name).unwrap();
    assert_eq!(got.status, BindStatus::SoftSuccess);
    assert_eq!(got.into_value(), Some(Any::Undefined));
    assert_eq!(
        rt.set_property(&bag, &name, Any::Int(1)).unwrap(),
        BindStatus::Success
    );
    assert_eq!(
        rt.get_property(&bag, &name).unwrap().into_value(),
        Some(Any::Int(1))
    );
}

#[test]
fn test_null_receiver_raises() {
    let rt = Runtime::new();
    assert!(rt.get_property(&Any::Null, &QName::public("x")).is_err());
    assert!(rt
        .get_property(&Any::Undefined, &QName::public("x"))
        .is_err());
}

#[test]
fn test_method_call_and_extraction() {
    let rt = Runtime::new();
    let class = point_class(&rt);
    let point = rt
        .construct(class, &[Any::Number(3.0), Any::Number(4.0)])
        .unwrap();
    let name = QName::public("lengthSquared");

    let result = rt.call_property(&point, &name, &[]).unwrap();
    assert_eq!(result.into_value(), Some(Any::Number(25.0)));

    // reading a method trait yields a bound function
    let bound = rt.get_property(&point, &name).unwrap().into_value().unwrap();
    let result = rt.call_function(&bound, &Any::Null, &[]).unwrap();
    assert_eq!(result, Any::Number(25.0));
}

#[test]
fn test_constructor_defaults() {
    let rt = Runtime::new();
    let class = point_class(&rt);
    let point = rt.construct(class, &[Any::Number(7.0)]).unwrap();
    assert_eq!(
        rt.get_property(&point, &QName::public("y"))
            .unwrap()
            .into_value(),
        Some(Any::Number(0.0))
    );
    // a third argument exceeds the declared arity
    assert!(rt
        .construct(class, &[Any::Int(1), Any::Int(2), Any::Int(3)])
        .is_err());
}

struct NsBaseKey;
struct NsDerivedKey;

fn ns_classes(rt: &Runtime) -> (ClassId, ClassId) {
    let object = rt.registry().get(rt.object_class());
    let base = rt.registry().get_or_register(TypeId::of::<NsBaseKey>(), |id| {
        ClassBuilder::new(QName::public("Base"))
            .parent(&object)
            .constant(QName::uri_qualified("ns1", "prop"), Any::from("base one"))
            .constant(QName::uri_qualified("ns2", "prop"), Any::from("base two"))
            .build(id)
    });
    let base_class = rt.registry().get(base);
    let derived = rt
        .registry()
        .get_or_register(TypeId::of::<NsDerivedKey>(), |id| {
            ClassBuilder::new(QName::public("Derived"))
                .parent(&base_class)
                .constant(QName::uri_qualified("ns1", "prop"), Any::from("derived"))
                .build(id)
        });
    (base, derived)
}

#[test]
fn test_namespace_set_ambiguity() {
    let rt = Runtime::new();
    let (base, _) = ns_classes(&rt);
    let receiver = rt.new_instance(base);
    let mut set = NamespaceSet::new();
    set.push(Namespace::uri("ns1"));
    set.push(Namespace::uri("ns2"));

    // both namespaces match at the same level
    let got = rt.get_property_in_set(&receiver, "prop", &set).unwrap();
    assert_eq!(got.status, BindStatus::Ambiguous);

    // a single-namespace set resolves
    let mut narrow = NamespaceSet::new();
    narrow.push(Namespace::uri("ns2"));
    let got = rt.get_property_in_set(&receiver, "prop", &narrow).unwrap();
    assert_eq!(got.into_value(), Some(Any::from("base two")));
}

#[test]
fn test_namespace_set_more_derived_wins() {
    let rt = Runtime::new();
    let (_, derived) = ns_classes(&rt);
    let receiver = rt.new_instance(derived);
    let mut set = NamespaceSet::new();
    set.push(Namespace::uri("ns1"));
    set.push(Namespace::uri("ns2"));

    // the derived declaration shadows both base declarations
    let got = rt.get_property_in_set(&receiver, "prop", &set).unwrap();
    assert_eq!(got.status, BindStatus::Success);
    assert_eq!(got.into_value(), Some(Any::from("derived")));
}

#[test]
fn test_namespace_set_dynamic_creation_needs_public() {
    let rt = Runtime::new();
    let bag = rt.new_instance(rt.object_class());
    let mut without_public = NamespaceSet::new();
    without_public.push(Namespace::uri("ns1"));
    assert_eq!(
        rt.set_property_in_set(&bag, "d", &without_public, Any::Int(1))
            .unwrap(),
        BindStatus::NotFound
    );

    let mut with_public = NamespaceSet::new();
    with_public.push(Namespace::uri("ns1"));
    with_public.push(Namespace::public());
    assert_eq!(
        rt.set_property_in_set(&bag, "d", &with_public, Any::Int(1))
            .unwrap(),
        BindStatus::Success
    );
    assert_eq!(
        rt.get_property(&bag, &QName::public("d"))
            .unwrap()
            .into_value(),
        Some(Any::Int(1))
    );
}

struct AccessorKey;

#[test]
fn test_property_accessors() {
    let rt = Runtime::new();
    let object = rt.registry().get(rt.object_class());
    let class = rt
        .registry()
        .get_or_register(TypeId::of::<AccessorKey>(), |id| {
            ClassBuilder::new(QName::public("Half"))
                .parent(&object)
                .field(QName::public("raw"), ValueType::Number)
                .property(
                    QName::public("half"),
                    Some(MethodInfo::new(
                        vec![],
                        Some(ValueType::Number),
                        Arc::new(|rt, receiver, _| {
                            let raw = rt
                                .get_property(receiver, &QName::public("raw"))?
                                .into_value()
                                .unwrap()
                                .to_number();
                            Ok(Any::Number(raw / 2.0))
                        }),
                    )),
                    None,
                )
                .property(
                    QName::public("sink"),
                    None,
                    Some(MethodInfo::new(
                        vec![ParamInfo::required(ValueType::Number)],
                        None,
                        Arc::new(|rt, receiver, args| {
                            rt.set_property(receiver, &QName::public("raw"), args[0].clone())?;
                            Ok(Any::Undefined)
                        }),
                    )),
                )
                .build(id)
        });
    let receiver = rt.new_instance(class);

    assert_eq!(
        rt.set_property(&receiver, &QName::public("sink"), Any::Int(10))
            .unwrap(),
        BindStatus::Success
    );
    assert_eq!(
        rt.get_property(&receiver, &QName::public("half"))
            .unwrap()
            .into_value(),
        Some(Any::Number(5.0))
    );
    // the getter-only property rejects writes; the setter-only rejects reads
    assert_eq!(
        rt.set_property(&receiver, &QName::public("half"), Any::Int(1))
            .unwrap(),
        BindStatus::FailedReadOnly
    );
    assert_eq!(
        rt.get_property(&receiver, &QName::public("sink"))
            .unwrap()
            .status,
        BindStatus::FailedWriteOnly
    );
}

struct OptionalKey;

#[test]
fn test_optional_and_rest_parameters() {
    let rt = Runtime::new();
    let object = rt.registry().get(rt.object_class());
    let class = rt
        .registry()
        .get_or_register(TypeId::of::<OptionalKey>(), |id| {
            ClassBuilder::new(QName::public("Variadic"))
                .parent(&object)
                .method(
                    QName::public("describe"),
                    MethodInfo::new(
                        vec![
                            ParamInfo::required(ValueType::Int),
                            ParamInfo::optional(ValueType::String, Some(Any::from("d"))),
                            ParamInfo::optional(ValueType::Any, None),
                        ],
                        Some(ValueType::String),
                        Arc::new(|_rt, _receiver, args| {
                            let missing = if args[2].is_missing() { "missing" } else { "given" };
                            Ok(Any::from(format!(
                                "{}|{}|{}",
                                args[0].to_string_value(),
                                args[1].to_string_value(),
                                missing
                            )))
                        }),
                    ),
                )
                .method(
                    QName::public("count"),
                    MethodInfo::new(
                        vec![ParamInfo::required(ValueType::Int)],
                        Some(ValueType::Int),
                        Arc::new(|_rt, _receiver, args| {
                            // the rest array is always the trailing argument
                            let rest_len = match args[1].as_object().map(|o| o.kind()) {
                                Some(ObjectKind::Array(items)) => items.read().unwrap().len(),
                                _ => 0,
                            };
                            Ok(Any::Int(args[0].to_int32() + rest_len as i32))
                        }),
                    )
                    .with_rest(),
                )
                .build(id)
        });
    let receiver = rt.new_instance(class);
    let describe = QName::public("describe");

    // too few arguments
    assert!(rt.call_property(&receiver, &describe, &[]).is_err());
    // defaults and the missing sentinel fill omitted optionals
    let result = rt
        .call_property(&receiver, &describe, &[Any::Number(3.7)])
        .unwrap();
    assert_eq!(result.into_value(), Some(Any::from("3|d|missing")));
    let result = rt
        .call_property(
            &receiver,
            &describe,
            &[Any::Int(1), Any::Int(2), Any::Int(3)],
        )
        .unwrap();
    assert_eq!(result.into_value(), Some(Any::from("1|2|given")));

    let count = QName::public("count");
    let result = rt
        .call_property(
            &receiver,
            &count,
            &[Any::Int(10), Any::Int(0), Any::Int(0), Any::Int(0)],
        )
        .unwrap();
    assert_eq!(result.into_value(), Some(Any::Int(13)));
}

#[test]
fn test_construct_through_stored_class() {
    let rt = Runtime::new();
    let class = point_class(&rt);
    let holder = rt.new_instance(rt.object_class());
    rt.set_property(&holder, &QName::public("Point"), rt.new_class_object(class))
        .unwrap();

    let made = rt
        .construct_property(&holder, &QName::public("Point"), &[Any::Number(1.0)])
        .unwrap();
    assert_eq!(made.status, BindStatus::Success);
    let made = made.into_value().unwrap();
    assert_eq!(rt.class_of(&made), class);

    // a non-class value does not construct
    rt.set_property(&holder, &QName::public("n"), Any::Int(3))
        .unwrap();
    assert_eq!(
        rt.construct_property(&holder, &QName::public("n"), &[])
            .unwrap()
            .status,
        BindStatus::FailedNotConstructor
    );
}

struct GreeterInterfaceKey;
struct GreeterImplKey;

#[test]
fn test_interface_traits_resolve_after_class_chain() {
    let rt = Runtime::new();
    let object = rt.registry().get(rt.object_class());
    let interface = rt
        .registry()
        .get_or_register(TypeId::of::<GreeterInterfaceKey>(), |id| {
            ClassBuilder::new(QName::public("IGreeter"))
                .constant(QName::public("GREETING"), Any::from("hello"))
                .build(id)
        });
    let greeter = rt
        .registry()
        .get_or_register(TypeId::of::<GreeterImplKey>(), |id| {
            ClassBuilder::new(QName::public("Greeter"))
                .parent(&object)
                .implements(interface)
                .build(id)
        });
    let receiver = rt.new_instance(greeter);

    let got = rt
        .get_property(&receiver, &QName::public("GREETING"))
        .unwrap();
    assert_eq!(got.into_value(), Some(Any::from("hello")));

    // interface membership counts for casts too
    assert!(rt.is_subclass(greeter, interface));
}

#[test]
fn test_class_call_is_conversion() {
    let rt = Runtime::new();
    let int_class = rt.class_of(&Any::Int(0));
    let holder = rt.new_instance(rt.object_class());
    rt.set_property(&holder, &QName::public("int"), rt.new_class_object(int_class))
        .unwrap();
    let result = rt
        .call_property(&holder, &QName::public("int"), &[Any::from("3")])
        .unwrap();
    assert_eq!(result.into_value(), Some(Any::Int(3)));
}

#[test]
fn test_builtin_number_methods() {
    let rt = Runtime::new();
    let result = rt
        .call_property(&Any::Number(1.5), &QName::public("toFixed"), &[Any::Int(2)])
        .unwrap();
    assert_eq!(result.into_value(), Some(Any::from("1.50")));

    // the optional precision defaults to 0
    let result = rt
        .call_property(&Any::Number(2.7), &QName::public("toFixed"), &[])
        .unwrap();
    assert_eq!(result.into_value(), Some(Any::from("3")));

    let result = rt
        .call_property(&Any::Number(255.0), &QName::public("toString"), &[Any::Int(16)])
        .unwrap();
    assert_eq!(result.into_value(), Some(Any::from("ff")));

    assert!(rt
        .call_property(&Any::Number(1.0), &QName::public("toFixed"), &[Any::Int(-1)])
        .is_err());
}

#[test]
fn test_builtin_string_and_array() {
    let rt = Runtime::new();
    let result = rt
        .get_property(&Any::from("héllo"), &QName::public("length"))
        .unwrap();
    assert_eq!(result.into_value(), Some(Any::Int(5)));

    let array = rt.new_array(vec![Any::Int(1)]);
    rt.call_property(&array, &QName::public("push"), &[Any::Int(2), Any::Int(3)])
        .unwrap();
    let len = rt
        .get_property(&array, &QName::public("length"))
        .unwrap()
        .into_value()
        .unwrap();
    assert_eq!(len, Any::Uint(3));
}

#[test]
fn test_xml_attribute_binding() {
    let rt = Runtime::new();
    let node = xml::parse_single_element(r#"<r a:x="1" xmlns:a="u" plain="p"/>"#).unwrap();
    let receiver = rt.new_xml(node);

    let got = rt
        .get_attribute(&receiver, &QName::uri_qualified("u", "x"))
        .unwrap();
    assert_eq!(got.into_value(), Some(Any::from("1")));
    let got = rt.get_attribute(&receiver, &QName::public("plain")).unwrap();
    assert_eq!(got.into_value(), Some(Any::from("p")));
    assert_eq!(
        rt.get_attribute(&receiver, &QName::public("x"))
            .unwrap()
            .status,
        BindStatus::NotFound
    );
}

#[test]
fn test_xml_attribute_namespace_set() {
    let rt = Runtime::new();
    let node =
        xml::parse_single_element(r#"<r xmlns:a="u" xmlns:b="v" a:x="1" b:x="2"/>"#).unwrap();
    let receiver = rt.new_xml(node);

    let mut set = NamespaceSet::new();
    set.push(Namespace::uri("u"));
    set.push(Namespace::uri("v"));
    assert_eq!(
        rt.get_attribute_in_set(&receiver, "x", &set)
            .unwrap()
            .status,
        BindStatus::Ambiguous
    );

    let mut narrow = NamespaceSet::new();
    narrow.push(Namespace::uri("v"));
    assert_eq!(
        rt.get_attribute_in_set(&receiver, "x", &narrow)
            .unwrap()
            .into_value(),
        Some(Any::from("2"))
    );
}
