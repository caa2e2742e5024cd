//! `Deque`: double-ended queue.
//!
//! `push`/`pop` work on the back, `unshift`/`shift` on the front. Several
//! values unshifted at once keep their argument order at the front, so
//! `unshift(a, b)` leaves `a` first.

use std::collections::VecDeque;
use std::rc::Rc;

use rill_value::{CallContext, ClassDescriptor, EvalResult, Value};

use super::{attach_to_receiver, Store};
use crate::interpreter::CONSTRUCTOR;
use crate::methods::helpers::{
    len_to_value, native_class, require_args, require_min_args, with_resource,
};

const CLASS: &str = "Deque";

#[derive(Clone, Debug, Default)]
pub struct DequeStore {
    items: VecDeque<Value>,
}

impl DequeStore {
    pub fn push_back_all(&mut self, values: &[Value]) {
        self.items.extend(values.iter().cloned());
    }

    pub fn push_front_all(&mut self, values: &[Value]) {
        for value in values.iter().rev() {
            self.items.push_front(value.clone());
        }
    }
}

impl Store for DequeStore {
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
            ("unshift", unshift),
            ("shift", shift),
            ("peekFront", peek_front),
            ("peekBack", peek_back),
            ("size", size),
            ("isEmpty", is_empty),
            ("clear", clear),
            ("toArray", to_array),
        ],
    ))
}

fn construct(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const METHOD: &str = "Deque.constructor";
    require_args(METHOD, 0, args.len())?;
    attach_to_receiver(ctx, METHOD, DequeStore::default())?;
    Ok(Value::Null)
}

fn push(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const METHOD: &str = "Deque.push";
    require_min_args(METHOD, 1, args.len())?;
    with_resource(ctx, METHOD, |store: &mut DequeStore| {
        store.push_back_all(args);
        len_to_value(store.len())
    })
}

fn pop(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const METHOD: &str = "Deque.pop";
    require_args(METHOD, 0, args.len())?;
    with_resource(ctx, METHOD, |store: &mut DequeStore| {
        store.items.pop_back().unwrap_or_default()
    })
}

fn unshift(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const METHOD: &str = "Deque.unshift";
    require_min_args(METHOD, 1, args.len())?;
    with_resource(ctx, METHOD, |store: &mut DequeStore| {
        store.push_front_all(args);
        len_to_value(store.len())
    })
}

fn shift(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const METHOD: &str = "Deque.shift";
    require_args(METHOD, 0, args.len())?;
    with_resource(ctx, METHOD, |store: &mut DequeStore| {
        store.items.pop_front().unwrap_or_default()
    })
}

fn peek_front(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const METHOD: &str = "Deque.peekFront";
    require_args(METHOD, 0, args.len())?;
    with_resource(ctx, METHOD, |store: &mut DequeStore| {
        store.items.front().cloned().unwrap_or_default()
    })
}

fn peek_back(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const METHOD: &str = "Deque.peekBack";
    require_args(METHOD, 0, args.len())?;
    with_resource(ctx, METHOD, |store: &mut DequeStore| {
        store.items.back().cloned().unwrap_or_default()
    })
}

fn size(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const METHOD: &str = "Deque.size";
    require_args(METHOD, 0, args.len())?;
    with_resource(ctx, METHOD, |store: &mut DequeStore| {
        len_to_value(store.len())
    })
}

fn is_empty(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const METHOD: &str = "Deque.isEmpty";
    require_args(METHOD, 0, args.len())?;
    with_resource(ctx, METHOD, |store: &mut DequeStore| {
        Value::Bool(store.is_empty())
    })
}

fn clear(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const METHOD: &str = "Deque.clear";
    require_args(METHOD, 0, args.len())?;
    with_resource(ctx, METHOD, |store: &mut DequeStore| store.items.clear())?;
    Ok(Value::Null)
}

/// Front to back.
fn to_array(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const METHOD: &str = "Deque.toArray";
    require_args(METHOD, 0, args.len())?;
    with_resource(ctx, METHOD, |store: &mut DequeStore| {
        Value::array(store.items.iter().cloned().collect())
    })
}
