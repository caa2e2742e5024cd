//! The `array` package: higher-order array operations.
//!
//! Every callback runs through the invocation protocol, so native and
//! interpreted callables behave the same. Callbacks receive the element
//! only (`reduce` receives the accumulator and the element). The input
//! array is copied before the first callback runs; callbacks that mutate it
//! do not affect the pass in progress.

use rill_value::{type_mismatch, CallContext, Callable, EvalError, EvalResult, ObjectMap, Value};

use crate::methods::compare::{compare_with, stable_sort_by};
use crate::methods::helpers::{
    optional_callable_arg, require_args, require_args_between, require_array_arg,
    require_callable_arg, NativeFn,
};

/// Package name.
pub const PACKAGE: &str = "array";

/// Install `map`, `filter`, `forEach`, `reduce` and `sort`.
pub fn init_package(bindings: &mut ObjectMap) -> Result<(), EvalError> {
    let functions: [(&str, NativeFn); 5] = [
        ("map", map),
        ("filter", filter),
        ("forEach", for_each),
        ("reduce", reduce),
        ("sort", sort),
    ];
    for (name, func) in functions {
        bindings.insert(
            name.to_string(),
            Value::Callable(Callable::native(name, func)),
        );
    }
    Ok(())
}

/// Copy of the array argument at `index`.
fn items_arg(function: &str, args: &[Value], index: usize) -> Result<Vec<Value>, EvalError> {
    Ok(require_array_arg(function, args, index)?.borrow().clone())
}

/// `map(array, fn)`.
fn map(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const FUNCTION: &str = "map";
    require_args(FUNCTION, 2, args.len())?;
    let items = items_arg(FUNCTION, args, 0)?;
    let callback = require_callable_arg(FUNCTION, args, 1)?;
    let mapped = items
        .into_iter()
        .map(|item| ctx.invoke(callback, &[item], None))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::array(mapped))
}

/// `filter(array, fn)`; keeps elements whose callback result is truthy.
fn filter(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const FUNCTION: &str = "filter";
    require_args(FUNCTION, 2, args.len())?;
    let items = items_arg(FUNCTION, args, 0)?;
    let predicate = require_callable_arg(FUNCTION, args, 1)?;
    let mut kept = Vec::new();
    for item in items {
        let keep = ctx.invoke(predicate, std::slice::from_ref(&item), None)?;
        if keep.is_truthy() {
            kept.push(item);
        }
    }
    Ok(Value::array(kept))
}

/// `forEach(array, fn)`.
fn for_each(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const FUNCTION: &str = "forEach";
    require_args(FUNCTION, 2, args.len())?;
    let items = items_arg(FUNCTION, args, 0)?;
    let callback = require_callable_arg(FUNCTION, args, 1)?;
    for item in items {
        ctx.invoke(callback, &[item], None)?;
    }
    Ok(Value::Null)
}

/// `reduce(array, fn, initial?)`.
///
/// Without an initial value the first element seeds the accumulator; an
/// empty array then has nothing to reduce and is a type error.
fn reduce(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const FUNCTION: &str = "reduce";
    require_args_between(FUNCTION, 2, 3, args.len())?;
    let items = items_arg(FUNCTION, args, 0)?;
    let reducer = require_callable_arg(FUNCTION, args, 1)?;
    let mut items = items.into_iter();
    let mut acc = match args.get(2) {
        Some(initial) => initial.clone(),
        None => items
            .next()
            .ok_or_else(|| {
                type_mismatch(FUNCTION, "non-empty array or initial value", "empty array")
            })?,
    };
    for item in items {
        acc = ctx.invoke(reducer, &[acc, item], None)?;
    }
    Ok(acc)
}

/// `sort(array, comparator?)`; returns a new, stably sorted array.
fn sort(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const FUNCTION: &str = "sort";
    require_args_between(FUNCTION, 1, 2, args.len())?;
    let items = items_arg(FUNCTION, args, 0)?;
    let comparator = optional_callable_arg(FUNCTION, args, 1)?;
    let invoker = ctx.invoker();
    let sorted = stable_sort_by(items, |a, b| compare_with(invoker, comparator, a, b))?;
    Ok(Value::array(sorted))
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
