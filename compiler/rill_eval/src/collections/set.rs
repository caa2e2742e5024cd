//! `Set`: insertion-ordered collection of unique values.
//!
//! `union`, `intersection` and `difference` return new Sets and accept only
//! instances of the registered Set class; an object that merely looks like
//! a Set is rejected.

use std::rc::{Rc, Weak};

use rill_value::{
    invalid_operation, type_mismatch, CallContext, Callable, ClassDescriptor, EvalError,
    EvalResult, HashKey, Instance, OrderedIndex, Value,
};

use super::{attach_store, attach_to_receiver, Store};
use crate::interpreter::CONSTRUCTOR;
use crate::methods::helpers::{
    len_to_value, native_class, native_method, receiver, require_args, require_args_between,
    require_callable_arg, with_resource,
};

const CLASS: &str = "Set";

#[derive(Clone, Debug, Default)]
pub struct SetStore {
    items: OrderedIndex<HashKey, Value>,
}

impl SetStore {
    /// Insert `value`; returns false if it was already present.
    pub fn insert(&mut self, value: Value) -> bool {
        let key = HashKey::from_value(&value);
        if self.items.contains_key(&key) {
            return false;
        }
        self.items.insert(key, value);
        true
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.items.contains_key(&HashKey::from_value(value))
    }

    pub fn remove(&mut self, value: &Value) -> bool {
        self.items.remove(&HashKey::from_value(value)).is_some()
    }

    /// Members in insertion order.
    pub fn values(&self) -> Vec<Value> {
        self.items.values().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl Store for SetStore {
    const CLASS: &'static str = CLASS;

    fn len(&self) -> usize {
        self.items.len()
    }
}

#[derive(Clone, Copy)]
enum SetOp {
    Union,
    Intersection,
    Difference,
}

impl SetOp {
    fn method(self) -> &'static str {
        match self {
            SetOp::Union => "union",
            SetOp::Intersection => "intersection",
            SetOp::Difference => "difference",
        }
    }

    fn apply(self, mine: &SetStore, theirs: &SetStore) -> SetStore {
        let mut result = SetStore::default();
        match self {
            SetOp::Union => {
                for value in mine.items.values().chain(theirs.items.values()) {
                    result.insert(value.clone());
                }
            }
            SetOp::Intersection => {
                for (key, value) in mine.items.iter() {
                    if theirs.items.contains_key(key) {
                        result.items.insert(key.clone(), value.clone());
                    }
                }
            }
            SetOp::Difference => {
                for (key, value) in mine.items.iter() {
                    if !theirs.items.contains_key(key) {
                        result.items.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        result
    }
}

pub(super) fn class() -> Rc<ClassDescriptor> {
    let class = Rc::new(native_class(
        CLASS,
        &[
            (CONSTRUCTOR, construct),
            ("add", add),
            ("has", has),
            ("delete", delete),
            ("size", size),
            ("clear", clear),
            ("values", values),
            ("keys", values),
            ("forEach", for_each),
        ],
    ));
    // Set algebra needs the class itself to check operands and build
    // results; a weak handle keeps the method table from owning its class.
    for op in [SetOp::Union, SetOp::Intersection, SetOp::Difference] {
        class.define_method(op.method(), set_op_method(Rc::downgrade(&class), op));
    }
    class
}

fn set_op_method(class: Weak<ClassDescriptor>, op: SetOp) -> Callable {
    native_method(CLASS, op.method(), move |ctx, args| {
        let method = format!("{CLASS}.{}", op.method());
        require_args(&method, 1, args.len())?;
        let class = class
            .upgrade()
            .ok_or_else(|| invalid_operation("Set class is no longer available"))?;
        let other = exact_set_operand(&method, &class, &args[0])?;
        let mine = with_resource(ctx, &method, |store: &mut SetStore| store.clone())?;
        let theirs = other.with_native(&method, |store: &mut SetStore| store.clone())?;
        let result = Instance::new(class);
        attach_store(&result, op.apply(&mine, &theirs))?;
        Ok(Value::Instance(result))
    })
}

fn exact_set_operand(
    method: &str,
    class: &Rc<ClassDescriptor>,
    operand: &Value,
) -> Result<Instance, EvalError> {
    match operand {
        Value::Instance(instance) if instance.is_instance_of(class) => Ok(instance.clone()),
        Value::Instance(instance) => Err(type_mismatch(method, CLASS, instance.class().name())),
        other => Err(type_mismatch(method, CLASS, other.type_name())),
    }
}

/// `new Set(items?)`.
fn construct(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const METHOD: &str = "Set.constructor";
    require_args_between(METHOD, 0, 1, args.len())?;
    let mut store = SetStore::default();
    match args.first() {
        None | Some(Value::Null) => {}
        Some(Value::Array(items)) => {
            for item in items.borrow().iter() {
                store.insert(item.clone());
            }
        }
        Some(other) => return Err(type_mismatch(METHOD, "array", other.type_name())),
    }
    attach_to_receiver(ctx, METHOD, store)?;
    Ok(Value::Null)
}

fn add(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const METHOD: &str = "Set.add";
    require_args(METHOD, 1, args.len())?;
    let this = receiver(ctx, METHOD)?;
    this.with_native(METHOD, |store: &mut SetStore| store.insert(args[0].clone()))?;
    Ok(Value::Instance(this))
}

fn has(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const METHOD: &str = "Set.has";
    require_args(METHOD, 1, args.len())?;
    with_resource(ctx, METHOD, |store: &mut SetStore| {
        Value::Bool(store.contains(&args[0]))
    })
}

fn delete(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const METHOD: &str = "Set.delete";
    require_args(METHOD, 1, args.len())?;
    with_resource(ctx, METHOD, |store: &mut SetStore| {
        Value::Bool(store.remove(&args[0]))
    })
}

fn size(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const METHOD: &str = "Set.size";
    require_args(METHOD, 0, args.len())?;
    with_resource(ctx, METHOD, |store: &mut SetStore| {
        len_to_value(store.len())
    })
}

fn clear(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const METHOD: &str = "Set.clear";
    require_args(METHOD, 0, args.len())?;
    with_resource(ctx, METHOD, SetStore::clear)?;
    Ok(Value::Null)
}

fn values(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const METHOD: &str = "Set.values";
    require_args(METHOD, 0, args.len())?;
    with_resource(ctx, METHOD, |store: &mut SetStore| {
        Value::array(store.values())
    })
}

/// `forEach(fn(value))` over a snapshot of the members.
fn for_each(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const METHOD: &str = "Set.forEach";
    require_args(METHOD, 1, args.len())?;
    let callback = require_callable_arg(METHOD, args, 0)?;
    let members = with_resource(ctx, METHOD, |store: &mut SetStore| store.values())?;
    for value in members {
        ctx.invoke(callback, &[value], None)?;
    }
    Ok(Value::Null)
}
