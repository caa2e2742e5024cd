//! Argument validation and shared utility functions.

use std::any::Any;

use rill_value::{
    too_few_args, type_mismatch, wrong_arg_count, CallContext, Callable, ClassDescriptor,
    EvalError, EvalResult, Heap, Instance, Value,
};

/// Signature of a native method body.
pub type NativeFn = fn(&CallContext<'_>, &[Value]) -> EvalResult;

/// Validate expected argument count.
#[inline]
pub fn require_args(method: &str, expected: usize, actual: usize) -> Result<(), EvalError> {
    if actual == expected {
        Ok(())
    } else {
        Err(wrong_arg_count(method, expected, actual))
    }
}

/// Validate a minimum argument count.
#[inline]
pub fn require_min_args(method: &str, minimum: usize, actual: usize) -> Result<(), EvalError> {
    if actual >= minimum {
        Ok(())
    } else {
        Err(too_few_args(method, minimum, actual))
    }
}

/// Validate an argument count within `min..=max`.
#[inline]
pub fn require_args_between(
    method: &str,
    min: usize,
    max: usize,
    actual: usize,
) -> Result<(), EvalError> {
    if actual < min {
        Err(too_few_args(method, min, actual))
    } else if actual > max {
        Err(wrong_arg_count(method, max, actual))
    } else {
        Ok(())
    }
}

/// Extract a string argument at the given index.
#[inline]
pub fn require_str_arg<'a>(
    method: &str,
    args: &'a [Value],
    index: usize,
) -> Result<&'a str, EvalError> {
    match args.get(index) {
        Some(Value::Str(s)) => Ok(&**s),
        other => Err(type_mismatch(method, "string", arg_type(other))),
    }
}

/// Extract a number argument at the given index.
#[inline]
pub fn require_number_arg(method: &str, args: &[Value], index: usize) -> Result<f64, EvalError> {
    match args.get(index) {
        Some(Value::Number(n)) => Ok(*n),
        other => Err(type_mismatch(method, "number", arg_type(other))),
    }
}

/// Extract an array argument at the given index.
#[inline]
pub fn require_array_arg<'a>(
    method: &str,
    args: &'a [Value],
    index: usize,
) -> Result<&'a Heap<Vec<Value>>, EvalError> {
    match args.get(index) {
        Some(Value::Array(items)) => Ok(items),
        other => Err(type_mismatch(method, "array", arg_type(other))),
    }
}

/// Extract a callable argument at the given index.
#[inline]
pub fn require_callable_arg<'a>(
    method: &str,
    args: &'a [Value],
    index: usize,
) -> Result<&'a Callable, EvalError> {
    match args.get(index) {
        Some(Value::Callable(callable)) => Ok(callable),
        other => Err(type_mismatch(method, "function", arg_type(other))),
    }
}

/// Extract an optional callable argument; `null` and absence both mean none.
#[inline]
pub fn optional_callable_arg<'a>(
    method: &str,
    args: &'a [Value],
    index: usize,
) -> Result<Option<&'a Callable>, EvalError> {
    match args.get(index) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Callable(callable)) => Ok(Some(callable)),
        Some(other) => Err(type_mismatch(method, "function", other.type_name())),
    }
}

fn arg_type(arg: Option<&Value>) -> &'static str {
    arg.map_or("nothing", Value::type_name)
}

/// Convert a collection length to a number value.
#[inline]
#[expect(
    clippy::cast_precision_loss,
    reason = "collection sizes stay far below 2^53"
)]
pub fn len_to_value(len: usize) -> Value {
    Value::Number(len as f64)
}

/// The bound receiver of a native method.
pub fn receiver(ctx: &CallContext<'_>, method: &str) -> Result<Instance, EvalError> {
    match ctx.this() {
        Some(Value::Instance(instance)) => Ok(instance),
        Some(other) => Err(type_mismatch(
            method,
            "instance receiver",
            other.type_name(),
        )),
        None => Err(type_mismatch(method, "instance receiver", "unbound call")),
    }
}

/// Run `f` against the receiver's native resource of type `T`.
///
/// `f` must not call back into script code: snapshot what it needs and
/// invoke after it returns.
pub fn with_resource<T: Any, R>(
    ctx: &CallContext<'_>,
    method: &str,
    f: impl FnOnce(&mut T) -> R,
) -> Result<R, EvalError> {
    receiver(ctx, method)?.with_native::<T, R>(method, f)
}

/// A class-level native method named `Class.method`.
pub fn native_method(
    class: &str,
    method: &str,
    func: impl Fn(&CallContext<'_>, &[Value]) -> EvalResult + 'static,
) -> Callable {
    Callable::native(format!("{class}.{method}"), func)
}

/// A native class with the given method table.
pub fn native_class(class: &str, methods: &[(&str, NativeFn)]) -> ClassDescriptor {
    methods
        .iter()
        .fold(ClassDescriptor::new_native(class), |descriptor, &(name, func)| {
            descriptor.with_method(name, native_method(class, name, func))
        })
}
