//! `PriorityQueue`: values ordered by a numeric priority.
//!
//! A min queue pops the smallest priority first, a max queue the largest.
//! Values that share a priority pop in insertion order.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::rc::Rc;

use rill_value::{type_mismatch, CallContext, ClassDescriptor, EvalError, EvalResult, Value};

use super::{attach_to_receiver, Store};
use crate::interpreter::CONSTRUCTOR;
use crate::methods::helpers::{
    len_to_value, native_class, require_args, require_args_between, require_number_arg,
    with_resource,
};

const CLASS: &str = "PriorityQueue";

/// Which end of the priority range pops first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum QueueOrder {
    #[default]
    Min,
    Max,
}

impl QueueOrder {
    fn parse(method: &str, mode: &Value) -> Result<Self, EvalError> {
        match mode {
            Value::Null => Ok(QueueOrder::Min),
            Value::Str(s) if &**s == "min" => Ok(QueueOrder::Min),
            Value::Str(s) if &**s == "max" => Ok(QueueOrder::Max),
            Value::Str(_) => Err(type_mismatch(method, "\"min\" or \"max\"", "string")),
            other => Err(type_mismatch(
                method,
                "\"min\" or \"max\"",
                other.type_name(),
            )),
        }
    }
}

#[derive(Debug)]
struct QueueEntry {
    /// Priority pre-negated for min queues, so the heap is always a max heap.
    rank: f64,
    seq: u64,
    value: Value,
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Higher rank first; among equal ranks the lower sequence number.
        self.rank
            .total_cmp(&other.rank)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

#[derive(Debug, Default)]
pub struct PriorityStore {
    heap: BinaryHeap<QueueEntry>,
    order: QueueOrder,
    next_seq: u64,
}

impl PriorityStore {
    pub fn new(order: QueueOrder) -> Self {
        PriorityStore {
            heap: BinaryHeap::new(),
            order,
            next_seq: 0,
        }
    }

    pub fn order(&self) -> QueueOrder {
        self.order
    }

    pub fn push(&mut self, value: Value, priority: f64) {
        // -0 and 0 are the same priority.
        let priority = if priority == 0.0 { 0.0 } else { priority };
        let rank = match self.order {
            QueueOrder::Min => -priority,
            QueueOrder::Max => priority,
        };
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(QueueEntry { rank, seq, value });
    }

    pub fn pop(&mut self) -> Option<Value> {
        self.heap.pop().map(|entry| entry.value)
    }

    pub fn peek(&self) -> Option<&Value> {
        self.heap.peek().map(|entry| &entry.value)
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }
}

impl Store for PriorityStore {
    const CLASS: &'static str = CLASS;

    fn len(&self) -> usize {
        self.heap.len()
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
        ],
    ))
}

/// `new PriorityQueue(mode?)` with mode `"min"` (default) or `"max"`.
fn construct(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const METHOD: &str = "PriorityQueue.constructor";
    require_args_between(METHOD, 0, 1, args.len())?;
    let order = match args.first() {
        Some(mode) => QueueOrder::parse(METHOD, mode)?,
        None => QueueOrder::Min,
    };
    attach_to_receiver(ctx, METHOD, PriorityStore::new(order))?;
    Ok(Value::Null)
}

/// `push(value, priority)`; returns the new size.
fn push(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const METHOD: &str = "PriorityQueue.push";
    require_args(METHOD, 2, args.len())?;
    let priority = require_number_arg(METHOD, args, 1)?;
    with_resource(ctx, METHOD, |store: &mut PriorityStore| {
        store.push(args[0].clone(), priority);
        len_to_value(store.len())
    })
}

fn pop(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const METHOD: &str = "PriorityQueue.pop";
    require_args(METHOD, 0, args.len())?;
    with_resource(ctx, METHOD, |store: &mut PriorityStore| {
        store.pop().unwrap_or_default()
    })
}

fn peek(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const METHOD: &str = "PriorityQueue.peek";
    require_args(METHOD, 0, args.len())?;
    with_resource(ctx, METHOD, |store: &mut PriorityStore| {
        store.peek().cloned().unwrap_or_default()
    })
}

fn size(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const METHOD: &str = "PriorityQueue.size";
    require_args(METHOD, 0, args.len())?;
    with_resource(ctx, METHOD, |store: &mut PriorityStore| {
        len_to_value(store.len())
    })
}

fn is_empty(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const METHOD: &str = "PriorityQueue.isEmpty";
    require_args(METHOD, 0, args.len())?;
    with_resource(ctx, METHOD, |store: &mut PriorityStore| {
        Value::Bool(store.is_empty())
    })
}

fn clear(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const METHOD: &str = "PriorityQueue.clear";
    require_args(METHOD, 0, args.len())?;
    with_resource(ctx, METHOD, PriorityStore::clear)?;
    Ok(Value::Null)
}
