use super::*;
use crate::errors::ErrorCategory;
use pretty_assertions::assert_eq;
use std::cell::Cell;

fn counter_class() -> Rc<ClassDescriptor> {
    Rc::new(ClassDescriptor::new_native("Counter"))
}

#[test]
fn test_method_table() {
    let class = ClassDescriptor::new("Point")
        .with_method("len", Callable::native("len", |_, _| Ok(Value::Null)));
    assert!(class.has_method("len"));
    assert!(class.method("missing").is_none());
    class.define_method("area", Callable::native("area", |_, _| Ok(Value::Null)));
    assert_eq!(class.method_names(), vec!["area", "len"]);
    assert!(!class.is_native());
}

#[test]
fn test_fields() {
    let instance = Instance::new(Rc::new(ClassDescriptor::new("Point")));
    assert!(instance.get_field("x").is_none());
    instance.set_field("x", Value::number(1.0));
    instance.set_field("y", Value::number(2.0));
    instance.set_field("x", Value::number(3.0));
    assert_eq!(instance.get_field("x"), Some(Value::number(3.0)));
    assert_eq!(instance.field_names(), vec!["x", "y"]);
}

#[test]
fn test_with_native_typed_access() {
    let instance = Instance::new(counter_class());
    instance.attach_native(5_i64, None).unwrap();
    assert!(instance.native_is::<i64>());
    let after = instance
        .with_native::<i64, _>("increment", |n| {
            *n += 1;
            *n
        })
        .unwrap();
    assert_eq!(after, 6);
}

#[test]
fn test_with_native_missing_is_type_error() {
    let instance = Instance::new(counter_class());
    let err = instance.with_native::<i64, _>("size", |n| *n).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::TypeError);
}

#[test]
fn test_with_native_wrong_type_is_type_error() {
    let instance = Instance::new(counter_class());
    instance.attach_native(String::from("x"), None).unwrap();
    let err = instance.with_native::<i64, _>("size", |n| *n).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::TypeError);
}

#[test]
fn test_attach_twice_fails() {
    let instance = Instance::new(counter_class());
    instance.attach_native(1_i64, None).unwrap();
    let err = instance.attach_native(2_i64, None).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::TypeError);
    assert_eq!(instance.with_native::<i64, _>("get", |n| *n).unwrap(), 1);
}

#[test]
fn test_destructor_runs_once_on_last_release() {
    let released = Rc::new(Cell::new(0));
    let instance = Instance::new(counter_class());
    let hook = Rc::clone(&released);
    instance
        .attach_native(
            vec![1, 2, 3],
            Some(Box::new(move |items: Vec<i32>| {
                assert_eq!(items, vec![1, 2, 3]);
                hook.set(hook.get() + 1);
            })),
        )
        .unwrap();

    let alias = instance.clone();
    assert_eq!(instance.ref_count(), 2);
    drop(instance);
    assert_eq!(released.get(), 0);
    drop(alias);
    assert_eq!(released.get(), 1);
}

#[test]
fn test_destructor_not_run_without_resource() {
    let instance = Instance::new(counter_class());
    assert!(!instance.has_native());
    drop(instance);
}

#[test]
fn test_identity() {
    let class = counter_class();
    let a = Instance::new(Rc::clone(&class));
    let b = Instance::new(Rc::clone(&class));
    assert!(a.ptr_eq(&a.clone()));
    assert!(!a.ptr_eq(&b));
    assert!(a.is_instance_of(&class));
    assert!(!a.is_instance_of(&Rc::new(ClassDescriptor::new_native("Counter"))));
}
