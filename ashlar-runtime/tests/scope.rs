use std::rc::Rc;

use ashlar_name::QName;
use ashlar_runtime::bind::BindStatus;
use ashlar_runtime::scope::ScopeStack;
use ashlar_runtime::value::{Any, Object};
use ashlar_runtime::Runtime;

// a dynamic object with one property set
fn holder(rt: &Runtime, name: &str, value: Any) -> Object {
    let object = rt.new_instance(rt.object_class());
    rt.set_property(&object, &QName::public(name), value).unwrap();
    Object::new(object).unwrap()
}

#[test]
fn test_walks_top_down() {
    let rt = Runtime::new();
    let mut stack = ScopeStack::new();
    stack.push(holder(&rt, "x", Any::Int(1)));
    stack.push(holder(&rt, "x", Any::Int(2)));

    let got = stack.get(&rt, &QName::public("x"), 0, false, true).unwrap();
    assert_eq!(got.into_value(), Some(Any::Int(2)));
}

#[test]
fn test_start_level_skips_from_the_top() {
    let rt = Runtime::new();
    let mut stack = ScopeStack::new();
    stack.push(holder(&rt, "x", Any::Int(1)));
    stack.push(holder(&rt, "x", Any::Int(2)));

    let got = stack.get(&rt, &QName::public("x"), 1, false, true).unwrap();
    assert_eq!(got.into_value(), Some(Any::Int(1)));
}

#[test]
fn test_parent_chain_and_start_level_reset() {
    let rt = Runtime::new();
    let mut parent = ScopeStack::new();
    parent.push(holder(&rt, "global", Any::from("g")));
    parent.push(holder(&rt, "x", Any::Int(7)));
    let parent = Rc::new(parent);

    let mut stack = ScopeStack::with_parent(parent.clone());
    stack.push(holder(&rt, "y", Any::Int(1)));

    // misses this stack entirely, found in the parent's top frame even
    // though start_level skipped a frame here
    let got = stack.get(&rt, &QName::public("x"), 1, false, true).unwrap();
    assert_eq!(got.into_value(), Some(Any::Int(7)));
}

#[test]
fn test_strict_miss_and_lenient_fallback() {
    let rt = Runtime::new();
    let mut parent = ScopeStack::new();
    parent.push(holder(&rt, "global", Any::from("g")));
    let parent = Rc::new(parent);
    let mut stack = ScopeStack::with_parent(parent);
    stack.push(holder(&rt, "y", Any::Int(1)));

    let strict = stack.find(&rt, &QName::public("nope"), 0, false, true).unwrap();
    assert_eq!(strict.status, BindStatus::NotFound);
    assert!(strict.frame.is_none());

    // lenient settles on the bottom-most frame of the chain
    let lenient = stack.find(&rt, &QName::public("nope"), 0, false, false).unwrap();
    assert_eq!(lenient.status, BindStatus::Success);
    let frame = lenient.frame.unwrap();
    let global = rt
        .get_property(frame.object().as_any(), &QName::public("global"))
        .unwrap();
    assert_eq!(global.into_value(), Some(Any::from("g")));
}

#[test]
fn test_clone_shares_parent_copies_frames() {
    let rt = Runtime::new();
    let mut parent = ScopeStack::new();
    parent.push(holder(&rt, "p", Any::Int(0)));
    let parent = Rc::new(parent);

    let mut original = ScopeStack::with_parent(parent.clone());
    original.push(holder(&rt, "x", Any::Int(1)));

    let mut clone = original.clone();
    clone.push(holder(&rt, "x", Any::Int(2)));
    clone.clear();

    // the original's frames are untouched by the clone's mutations
    assert_eq!(original.len(), 1);
    let got = original.get(&rt, &QName::public("x"), 0, false, true).unwrap();
    assert_eq!(got.into_value(), Some(Any::Int(1)));

    // and both still reach the shared parent
    assert!(Rc::ptr_eq(original.parent().unwrap(), clone.parent().unwrap()));
    let got = clone.get(&rt, &QName::public("p"), 0, false, true).unwrap();
    assert_eq!(got.into_value(), Some(Any::Int(0)));
}

#[test]
fn test_pop_and_truncate_do_not_touch_parent() {
    let rt = Runtime::new();
    let mut parent = ScopeStack::new();
    parent.push(holder(&rt, "p", Any::Int(0)));
    let parent = Rc::new(parent);

    let mut stack = ScopeStack::with_parent(parent.clone());
    stack.push(holder(&rt, "a", Any::Int(1)));
    stack.push(holder(&rt, "b", Any::Int(2)));
    stack.pop();
    stack.truncate(0);
    assert!(stack.is_empty());
    assert_eq!(parent.len(), 1);

    let got = stack.get(&rt, &QName::public("p"), 0, false, true).unwrap();
    assert_eq!(got.into_value(), Some(Any::Int(0)));
}

#[test]
fn test_soft_miss_does_not_stop_the_walk() {
    let rt = Runtime::new();
    let mut stack = ScopeStack::new();
    stack.push(holder(&rt, "x", Any::Int(1)));
    // the top object is dynamic but lacks the name; the walk continues
    stack.push(Object::new(rt.new_instance(rt.object_class())).unwrap());

    let got = stack.get(&rt, &QName::public("x"), 0, false, true).unwrap();
    assert_eq!(got.into_value(), Some(Any::Int(1)));
}
