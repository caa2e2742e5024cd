//! `Map`: insertion-ordered mapping from any value to any value.

use std::rc::Rc;

use rill_value::{
    type_mismatch, CallContext, ClassDescriptor, EvalError, EvalResult, HashKey, OrderedIndex,
    Value,
};

use super::{attach_to_receiver, Store};
use crate::interpreter::CONSTRUCTOR;
use crate::methods::helpers::{
    len_to_value, native_class, receiver, require_args, require_args_between,
    require_callable_arg, with_resource,
};

const CLASS: &str = "Map";

/// Entries keyed by the hashable projection of the key value.
#[derive(Clone, Debug, Default)]
pub struct MapStore {
    entries: OrderedIndex<HashKey, (Value, Value)>,
}

impl MapStore {
    pub fn insert(&mut self, key: Value, value: Value) {
        self.entries.insert(HashKey::from_value(&key), (key, value));
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.get(&HashKey::from_value(key)).map(|(_, v)| v)
    }

    pub fn contains(&self, key: &Value) -> bool {
        self.entries.contains_key(&HashKey::from_value(key))
    }

    pub fn remove(&mut self, key: &Value) -> bool {
        self.entries.remove(&HashKey::from_value(key)).is_some()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> Vec<Value> {
        self.entries.values().map(|(k, _)| k.clone()).collect()
    }

    pub fn values(&self) -> Vec<Value> {
        self.entries.values().map(|(_, v)| v.clone()).collect()
    }

    /// `(key, value)` pairs in insertion order.
    pub fn pairs(&self) -> Vec<(Value, Value)> {
        self.entries.values().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Store for MapStore {
    const CLASS: &'static str = CLASS;

    fn len(&self) -> usize {
        self.entries.len()
    }
}

pub(super) fn class() -> Rc<ClassDescriptor> {
    Rc::new(native_class(
        CLASS,
        &[
            (CONSTRUCTOR, construct),
            ("set", set),
            ("get", get),
            ("has", has),
            ("delete", delete),
            ("size", size),
            ("clear", clear),
            ("keys", keys),
            ("values", values),
            ("entries", entries),
            ("forEach", for_each),
        ],
    ))
}

/// `new Map(entries?)` where `entries` is an array of `[key, value]` pairs.
fn construct(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const METHOD: &str = "Map.constructor";
    require_args_between(METHOD, 0, 1, args.len())?;
    let mut store = MapStore::default();
    match args.first() {
        None | Some(Value::Null) => {}
        Some(Value::Array(pairs)) => {
            for pair in pairs.borrow().iter() {
                let (key, value) = entry_pair(METHOD, pair)?;
                store.insert(key, value);
            }
        }
        Some(other) => {
            return Err(type_mismatch(
                METHOD,
                "array of [key, value] pairs",
                other.type_name(),
            ))
        }
    }
    attach_to_receiver(ctx, METHOD, store)?;
    Ok(Value::Null)
}

fn entry_pair(method: &str, pair: &Value) -> Result<(Value, Value), EvalError> {
    if let Value::Array(items) = pair {
        if let [key, value] = items.borrow().as_slice() {
            return Ok((key.clone(), value.clone()));
        }
    }
    Err(type_mismatch(method, "[key, value] pair", pair.type_name()))
}

fn set(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const METHOD: &str = "Map.set";
    require_args(METHOD, 2, args.len())?;
    let this = receiver(ctx, METHOD)?;
    this.with_native(METHOD, |store: &mut MapStore| {
        store.insert(args[0].clone(), args[1].clone());
    })?;
    Ok(Value::Instance(this))
}

fn get(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const METHOD: &str = "Map.get";
    require_args(METHOD, 1, args.len())?;
    with_resource(ctx, METHOD, |store: &mut MapStore| {
        store.get(&args[0]).cloned().unwrap_or_default()
    })
}

fn has(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const METHOD: &str = "Map.has";
    require_args(METHOD, 1, args.len())?;
    with_resource(ctx, METHOD, |store: &mut MapStore| {
        Value::Bool(store.contains(&args[0]))
    })
}

fn delete(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const METHOD: &str = "Map.delete";
    require_args(METHOD, 1, args.len())?;
    with_resource(ctx, METHOD, |store: &mut MapStore| {
        Value::Bool(store.remove(&args[0]))
    })
}

fn size(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const METHOD: &str = "Map.size";
    require_args(METHOD, 0, args.len())?;
    with_resource(ctx, METHOD, |store: &mut MapStore| {
        len_to_value(store.len())
    })
}

fn clear(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const METHOD: &str = "Map.clear";
    require_args(METHOD, 0, args.len())?;
    with_resource(ctx, METHOD, MapStore::clear)?;
    Ok(Value::Null)
}

fn keys(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const METHOD: &str = "Map.keys";
    require_args(METHOD, 0, args.len())?;
    with_resource(ctx, METHOD, |store: &mut MapStore| {
        Value::array(store.keys())
    })
}

fn values(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const METHOD: &str = "Map.values";
    require_args(METHOD, 0, args.len())?;
    with_resource(ctx, METHOD, |store: &mut MapStore| {
        Value::array(store.values())
    })
}

fn entries(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const METHOD: &str = "Map.entries";
    require_args(METHOD, 0, args.len())?;
    with_resource(ctx, METHOD, |store: &mut MapStore| {
        Value::array(
            store
                .pairs()
                .into_iter()
                .map(|(k, v)| Value::array(vec![k, v]))
                .collect(),
        )
    })
}

/// `forEach(fn(value, key))` over a snapshot of the entries.
fn for_each(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const METHOD: &str = "Map.forEach";
    require_args(METHOD, 1, args.len())?;
    let callback = require_callable_arg(METHOD, args, 0)?;
    let pairs = with_resource(ctx, METHOD, |store: &mut MapStore| store.pairs())?;
    for (key, value) in pairs {
        ctx.invoke(callback, &[value, key], None)?;
    }
    Ok(Value::Null)
}
