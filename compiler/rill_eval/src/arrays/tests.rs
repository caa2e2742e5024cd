use super::*;
use crate::block::script_function;
use crate::interpreter::Interpreter;
use pretty_assertions::assert_eq;
use rill_value::{ControlAction, ErrorCategory};

fn interpreter() -> Interpreter {
    Interpreter::builder()
        .signal_polling(false)
        .build()
        .unwrap()
}

fn call(interp: &Interpreter, function: &str, args: &[Value]) -> EvalResult {
    let package = crate::packages::ensure_package(PACKAGE).unwrap();
    let func = package.get(function).cloned().unwrap();
    interp.call_value(&func, args)
}

fn nums(values: &[f64]) -> Value {
    Value::array(values.iter().copied().map(Value::number).collect())
}

fn native(name: &'static str, f: fn(&[Value]) -> EvalResult) -> Value {
    Value::Callable(Callable::native(name, move |_, args| f(args)))
}

fn number(value: &Value) -> f64 {
    value.as_number().unwrap_or(f64::NAN)
}

#[test]
fn test_map_with_script_callback() {
    let interp = interpreter();
    let double = script_function("double", &["x"], interp.globals(), |_, env| {
        let x = env.get("x")?;
        Err(ControlAction::Return(Value::number(number(&x) * 2.0)))
    });
    let result = call(
        &interp,
        "map",
        &[nums(&[1.0, 2.0, 3.0]), Value::Callable(double)],
    )
    .unwrap();
    assert_eq!(result, nums(&[2.0, 4.0, 6.0]));
}

#[test]
fn test_filter_truthiness() {
    let interp = interpreter();
    let odd = native("odd", |args| Ok(Value::number(number(&args[0]) % 2.0)));
    let result = call(&interp, "filter", &[nums(&[1.0, 2.0, 3.0, 4.0]), odd]).unwrap();
    assert_eq!(result, nums(&[1.0, 3.0]));
}

#[test]
fn test_reduce_with_and_without_initial() {
    let interp = interpreter();
    let add = native("add", |args| {
        Ok(Value::number(number(&args[0]) + number(&args[1])))
    });
    let result = call(
        &interp,
        "reduce",
        &[nums(&[1.0, 2.0, 3.0]), add.clone(), Value::number(10.0)],
    )
    .unwrap();
    assert_eq!(result, Value::number(16.0));
    let result = call(&interp, "reduce", &[nums(&[1.0, 2.0, 3.0]), add.clone()]).unwrap();
    assert_eq!(result, Value::number(6.0));
    let err = call(&interp, "reduce", &[nums(&[]), add]).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::TypeError);
}

#[test]
fn test_for_each_visits_in_order() {
    let interp = interpreter();
    let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
    let sink = std::rc::Rc::clone(&seen);
    let record = Value::Callable(Callable::native("record", move |_, args| {
        sink.borrow_mut().push(number(&args[0]));
        Ok(Value::Null)
    }));
    call(&interp, "forEach", &[nums(&[3.0, 1.0, 2.0]), record]).unwrap();
    assert_eq!(*seen.borrow(), vec![3.0, 1.0, 2.0]);
}

#[test]
fn test_sort_default_and_comparator() {
    let interp = interpreter();
    let input = nums(&[3.0, 1.0, 2.0]);
    assert_eq!(
        call(&interp, "sort", std::slice::from_ref(&input)).unwrap(),
        nums(&[1.0, 2.0, 3.0])
    );
    // The input is left untouched.
    assert_eq!(input, nums(&[3.0, 1.0, 2.0]));

    let descending = native("desc", |args| {
        Ok(Value::Bool(number(&args[0]) < number(&args[1])))
    });
    assert_eq!(
        call(&interp, "sort", &[input, descending]).unwrap(),
        nums(&[3.0, 2.0, 1.0])
    );
}

#[test]
fn test_callback_errors_propagate() {
    let interp = interpreter();
    let wrong_arity = script_function("pair", &["a", "b"], interp.globals(), |_, _| Ok(()));
    let err = call(
        &interp,
        "map",
        &[nums(&[1.0]), Value::Callable(wrong_arity)],
    )
    .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::ArityError);

    let err = call(
        &interp,
        "map",
        &[Value::number(1.0), native("id", |args| Ok(args[0].clone()))],
    )
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::TypeError);
}
