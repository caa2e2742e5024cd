use super::*;
use crate::block::{script_function, FnBlock};
use pretty_assertions::assert_eq;
use rill_value::{ErrorCategory, ObjectMap};

fn interpreter() -> Interpreter {
    Interpreter::builder()
        .signal_polling(false)
        .build()
        .unwrap()
}

fn returning(value: Value) -> Result<(), ControlAction> {
    Err(ControlAction::Return(value))
}

#[test]
fn test_native_and_script_share_protocol() {
    let interp = interpreter();
    let native = Callable::native("inc", |_, args| {
        Ok(Value::number(args[0].as_number().unwrap_or(0.0) + 1.0))
    });
    let script = script_function("inc", &["x"], interp.globals(), |_, env| {
        returning(Value::number(
            env.get("x")?.as_number().unwrap_or(0.0) + 1.0,
        ))
    });
    for callable in [native, script] {
        assert_eq!(
            interp
                .invoke(&callable, &[Value::number(1.0)], None)
                .unwrap(),
            Value::number(2.0)
        );
    }
}

#[test]
fn test_body_without_return_yields_null() {
    let interp = interpreter();
    let noop = script_function("noop", &[], interp.globals(), |_, _| Ok(()));
    assert_eq!(interp.invoke(&noop, &[], None).unwrap(), Value::Null);
}

#[test]
fn test_fixed_arity_is_strict() {
    let interp = interpreter();
    let pair = script_function("pair", &["a", "b"], interp.globals(), |_, _| Ok(()));
    for args in [vec![Value::Null], vec![Value::Null; 3]] {
        let err = interp.invoke(&pair, &args, None).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::ArityError);
    }
    let err = interp.invoke(&pair, &[], None).unwrap_err();
    assert_eq!(err.message, "pair expects 2 arguments, got 0");
}

#[test]
fn test_rest_parameter_collects_remaining() {
    let interp = interpreter();
    let body = Rc::new(FnBlock::new("collect", |_, env| {
        returning(Value::array(vec![env.get("first")?, env.get("rest")?]))
    }));
    let func = Callable::script(
        ScriptFunction::variadic(
            "collect",
            vec!["first".to_string(), "rest".to_string()],
            interp.globals().clone(),
            body,
        )
        .unwrap(),
    );
    let result = interp
        .invoke(
            &func,
            &[Value::number(1.0), Value::number(2.0), Value::number(3.0)],
            None,
        )
        .unwrap();
    assert_eq!(
        result,
        Value::array(vec![
            Value::number(1.0),
            Value::array(vec![Value::number(2.0), Value::number(3.0)]),
        ])
    );
    let result = interp.invoke(&func, &[Value::number(1.0)], None).unwrap();
    assert_eq!(
        result,
        Value::array(vec![Value::number(1.0), Value::array(vec![])])
    );

    let err = interp.invoke(&func, &[], None).unwrap_err();
    assert_eq!(err.message, "collect expects at least 1 argument, got 0");
}

#[test]
fn test_each_call_gets_fresh_scope_over_closure() {
    let interp = interpreter();
    let closure = interp.globals().child();
    closure.define("counter", Value::number(0.0));
    let bump = script_function("bump", &[], &closure, |_, env| {
        env.define("local", Value::Bool(true));
        let next = env.get("counter")?.as_number().unwrap_or(0.0) + 1.0;
        env.assign("counter", Value::number(next))?;
        returning(Value::number(next))
    });
    interp.invoke(&bump, &[], None).unwrap();
    assert_eq!(interp.invoke(&bump, &[], None).unwrap(), Value::number(2.0));
    assert_eq!(closure.lookup("local"), None);
}

#[test]
fn test_this_binding() {
    let interp = interpreter();
    let who = script_function("who", &[], interp.globals(), |_, env| {
        returning(env.get(THIS)?)
    });
    let receiver = Value::string("me");
    assert_eq!(interp.invoke(&who, &[], Some(&receiver)).unwrap(), receiver);
    let err = interp.invoke(&who, &[], None).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::NameError);
}

#[test]
fn test_exception_propagates_unchanged() {
    let interp = interpreter();
    let thrown = Value::string("boom");
    let payload = thrown.clone();
    let thrower = script_function("thrower", &[], interp.globals(), move |_, _| {
        Err(ControlAction::Error(EvalError::exception(payload.clone())))
    });
    let outer = {
        let thrower = thrower.clone();
        Callable::native("outer", move |ctx, _| ctx.invoke(&thrower, &[], None))
    };
    let err = interp.invoke(&outer, &[], None).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Exception);
    assert_eq!(err.thrown, Some(thrown));
    let names: Vec<&str> = err
        .backtrace
        .as_ref()
        .unwrap()
        .frames()
        .iter()
        .map(|frame| frame.name.as_str())
        .collect();
    assert_eq!(names, vec!["thrower", "outer"]);
    assert_eq!(interp.call_depth(), 0);
}

#[test]
fn test_recursion_limit() {
    let interp = Interpreter::builder()
        .signal_polling(false)
        .max_call_depth(Some(16))
        .build()
        .unwrap();
    let recurse = script_function("recurse", &[], interp.globals(), |invoker, env| {
        let me = env.get("recurse")?;
        let Value::Callable(me) = me else {
            return Ok(());
        };
        invoker.invoke(&me, &[], None)?;
        Ok(())
    });
    interp.define_global("recurse", Value::Callable(recurse.clone()));
    let err = interp.invoke(&recurse, &[], None).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::RecursionError);
    assert_eq!(interp.call_depth(), 0);
}

#[test]
fn test_deep_recursion_without_limit() {
    let interp = interpreter();
    let countdown = script_function("countdown", &["n"], interp.globals(), |invoker, env| {
        let n = env.get("n")?.as_number().unwrap_or(0.0);
        if n <= 0.0 {
            return returning(Value::number(0.0));
        }
        let Value::Callable(me) = env.get("countdown")? else {
            return Ok(());
        };
        returning(invoker.invoke(&me, &[Value::number(n - 1.0)], None)?)
    });
    interp.define_global("countdown", Value::Callable(countdown.clone()));
    assert_eq!(
        interp
            .invoke(&countdown, &[Value::number(5000.0)], None)
            .unwrap(),
        Value::number(0.0)
    );
}

#[test]
fn test_call_value_rejects_non_callables() {
    let interp = interpreter();
    let err = interp.call_value(&Value::number(1.0), &[]).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::TypeError);
    assert_eq!(err.message, "number is not callable");
}

fn field_number(instance: &Instance, name: &str) -> f64 {
    instance
        .get_field(name)
        .and_then(|v| v.as_number())
        .unwrap_or(0.0)
}

fn point_class(interp: &Interpreter) -> Rc<ClassDescriptor> {
    let constructor = script_function("Point.constructor", &["x", "y"], interp.globals(), |_, env| {
        let Value::Instance(this) = env.get(THIS)? else {
            return Ok(());
        };
        this.set_field("x", env.get("x")?);
        this.set_field("y", env.get("y")?);
        Ok(())
    });
    let sum = script_function("Point.sum", &[], interp.globals(), |_, env| {
        let Value::Instance(this) = env.get(THIS)? else {
            return Ok(());
        };
        let x = field_number(&this, "x");
        let y = field_number(&this, "y");
        returning(Value::number(x + y))
    });
    Rc::new(
        ClassDescriptor::new("Point")
            .with_method(CONSTRUCTOR, constructor)
            .with_method("sum", sum),
    )
}

#[test]
fn test_construct_and_call_method() {
    let interp = interpreter();
    let class = point_class(&interp);
    let point = interp
        .call_value(
            &Value::Class(Rc::clone(&class)),
            &[Value::number(2.0), Value::number(3.0)],
        )
        .unwrap();
    assert_eq!(point.as_instance().unwrap().class().name(), "Point");
    assert_eq!(
        interp.call_method(&point, "sum", &[]).unwrap(),
        Value::number(5.0)
    );
    let err = interp.construct(&class, &[Value::number(1.0)]).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::ArityError);
}

#[test]
fn test_class_without_constructor_takes_no_arguments() {
    let interp = interpreter();
    let class = Rc::new(ClassDescriptor::new("Empty"));
    assert!(interp.construct(&class, &[]).is_ok());
    let err = interp.construct(&class, &[Value::Null]).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::ArityError);
}

#[test]
fn test_field_callable_shadows_class_method() {
    let interp = interpreter();
    let class = point_class(&interp);
    let point = interp
        .construct(&class, &[Value::number(1.0), Value::number(1.0)])
        .unwrap();
    point
        .as_instance()
        .unwrap()
        .set_field(
            "sum",
            Value::Callable(Callable::native("own", |_, _| Ok(Value::string("field")))),
        );
    assert_eq!(
        interp.call_method(&point, "sum", &[]).unwrap(),
        Value::string("field")
    );
    let err = interp.call_method(&point, "missing", &[]).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::NameError);
    assert_eq!(err.message, "no method 'missing' on Point");
}

#[test]
fn test_object_methods_resolve_by_key() {
    let interp = interpreter();
    let mut entries = ObjectMap::new();
    entries.insert(
        "hello".to_string(),
        Value::Callable(Callable::native("hello", |_, _| Ok(Value::string("hi")))),
    );
    let object = Value::object(entries);
    assert_eq!(
        interp.call_method(&object, "hello", &[]).unwrap(),
        Value::string("hi")
    );
    assert!(interp.get_method(&Value::Null, "hello").is_err());
}

#[test]
fn test_native_class_without_resource_still_constructs() {
    let interp = interpreter();
    let class = Rc::new(ClassDescriptor::new_native("Hollow"));
    let instance = interp.construct(&class, &[]).unwrap();
    assert!(!instance.as_instance().unwrap().has_native());
}

#[test]
fn test_import_returns_namespace() {
    let interp = interpreter();
    let Value::Object(namespace) = interp.import("events").unwrap() else {
        panic!("expected namespace object");
    };
    assert!(namespace.borrow().contains_key("connect"));
    let err = interp.import("missing").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::PackageNotFoundError);
}

#[test]
fn test_prelude_in_globals() {
    let interp = interpreter();
    for name in ["Map", "EventBus", "keysSorted", "raise"] {
        assert!(interp.globals().lookup(name).is_some(), "{name} missing");
    }
    let bare = Interpreter::builder()
        .prelude(false)
        .signal_polling(false)
        .build()
        .unwrap();
    assert!(bare.globals().lookup("Map").is_none());
}

#[test]
fn test_run_program() {
    let interp = interpreter();
    let program = FnBlock::new("main", |_, env| {
        env.define("answer", Value::number(42.0));
        Ok(())
    });
    assert_eq!(interp.run(&program).unwrap(), Value::Null);
    assert_eq!(interp.globals().lookup("answer"), Some(Value::number(42.0)));

    let early = FnBlock::new("main", |_, _| returning(Value::number(7.0)));
    assert_eq!(interp.run(&early).unwrap(), Value::number(7.0));
}

#[test]
fn test_exit_status() {
    let status = |result: &EvalResult| format!("{:?}", exit_status(result));
    assert_eq!(status(&Ok(Value::Null)), format!("{:?}", ExitCode::SUCCESS));
    let failed: EvalResult = Err(rill_value::invalid_operation("bad"));
    assert_eq!(status(&failed), format!("{:?}", ExitCode::FAILURE));
}
