//! `Stack`: last-in first-out sequence. The top is the end of the store.

use std::rc::Rc;

use rill_value::{CallContext, ClassDescriptor, EvalResult, Value};

use super::{attach_to_receiver, Store};
use crate::interpreter::CONSTRUCTOR;
use crate::methods::helpers::{
    len_to_value, native_class, require_args, require_min_args, with_resource,
};

const CLASS: &str = "Stack";

#[derive(Clone, Debug, Default)]
pub struct StackStore {
    items: Vec<Value>,
}

impl Store for StackStore {
    const CLASS: &'static str = CLASS;

    fn len(&self) -> usize {
        self.items.len()
    }
}

pub(super) fn class() -> Rc<ClassDescriptor> {
    Rc::new(native_class(
        CLASS,
        &[
            (CONSTRUCTOR, construct),
            ("push", push),
            ("pop", pop),
            ("peek", peek),
            ("size", size),
            ("isEmpty", is_empty),
            ("clear", clear),
            ("toArray", to_array),
        ],
    ))
}

fn construct(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const METHOD: &str = "Stack.constructor";
    require_args(METHOD, 0, args.len())?;
    attach_to_receiver(ctx, METHOD, StackStore::default())?;
    Ok(Value::Null)
}

/// `push(a, b, ...)` appends in argument order; returns the new size.
fn push(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const METHOD: &str = "Stack.push";
    require_min_args(METHOD, 1, args.len())?;
    with_resource(ctx, METHOD, |store: &mut StackStore| {
        store.items.extend_from_slice(args);
        len_to_value(store.items.len())
    })
}

fn pop(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const METHOD: &str = "Stack.pop";
    require_args(METHOD, 0, args.len())?;
    with_resource(ctx, METHOD, |store: &mut StackStore| {
        store.items.pop().unwrap_or_default()
    })
}

fn peek(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const METHOD: &str = "Stack.peek";
    require_args(METHOD, 0, args.len())?;
    with_resource(ctx, METHOD, |store: &mut StackStore| {
        store.items.last().cloned().unwrap_or_default()
    })
}

fn size(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const METHOD: &str = "Stack.size";
    require_args(METHOD, 0, args.len())?;
    with_resource(ctx, METHOD, |store: &mut StackStore| {
        len_to_value(store.len())
    })
}

fn is_empty(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const METHOD: &str = "Stack.isEmpty";
    require_args(METHOD, 0, args.len())?;
    with_resource(ctx, METHOD, |store: &mut StackStore| {
        Value::Bool(store.is_empty())
    })
}

fn clear(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const METHOD: &str = "Stack.clear";
    require_args(METHOD, 0, args.len())?;
    with_resource(ctx, METHOD, |store: &mut StackStore| store.items.clear())?;
    Ok(Value::Null)
}

/// Bottom to top.
fn to_array(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const METHOD: &str = "Stack.toArray";
    require_args(METHOD, 0, args.len())?;
    with_resource(ctx, METHOD, |store: &mut StackStore| {
        Value::array(store.items.clone())
    })
}
