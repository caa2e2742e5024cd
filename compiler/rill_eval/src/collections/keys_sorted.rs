//! `keysSorted(container, comparator?)`.
//!
//! Extracts the key sequence of a container and returns it stably sorted:
//!
//! - Array: indices, ordered by the element at each index
//! - Object: string keys; an object carrying a `__data` array of
//!   `[key, value]` pairs is treated as a map over those pairs
//! - Map instance: keys in insertion order, ordered by themselves
//! - Set instance: members, ordered by themselves
//!
//! The comparator, when given, receives the two sort values.

use rill_value::{type_mismatch, CallContext, EvalError, EvalResult, Value};

use super::{MapStore, SetStore};
use crate::methods::compare::{compare_with, stable_sort_by};
use crate::methods::helpers::{len_to_value, optional_callable_arg, require_args_between};

const FUNCTION: &str = "keysSorted";

/// Field naming the pair sequence of a map-like object.
const MAP_DATA_FIELD: &str = "__data";

pub fn keys_sorted(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    require_args_between(FUNCTION, 1, 2, args.len())?;
    let comparator = optional_callable_arg(FUNCTION, args, 1)?;
    let entries = sort_entries(&args[0])?;
    let invoker = ctx.invoker();
    let sorted = stable_sort_by(entries, |(_, a), (_, b)| {
        compare_with(invoker, comparator, a, b)
    })?;
    Ok(Value::array(
        sorted.into_iter().map(|(key, _)| key).collect(),
    ))
}

/// `(key, sort value)` pairs in container order.
fn sort_entries(container: &Value) -> Result<Vec<(Value, Value)>, EvalError> {
    match container {
        Value::Array(items) => Ok(items
            .borrow()
            .iter()
            .enumerate()
            .map(|(index, item)| (len_to_value(index), item.clone()))
            .collect()),
        Value::Object(map) => {
            let map = map.borrow();
            if let Some(Value::Array(pairs)) = map.get(MAP_DATA_FIELD) {
                return pairs.borrow().iter().map(pair_key).collect();
            }
            Ok(map
                .keys()
                .map(|key| {
                    let key = Value::string(key);
                    (key.clone(), key)
                })
                .collect())
        }
        Value::Instance(instance) if instance.native_is::<MapStore>() => {
            let keys = instance.with_native(FUNCTION, |store: &mut MapStore| store.keys())?;
            Ok(self_keyed(keys))
        }
        Value::Instance(instance) if instance.native_is::<SetStore>() => {
            let members = instance.with_native(FUNCTION, |store: &mut SetStore| store.values())?;
            Ok(self_keyed(members))
        }
        other => Err(type_mismatch(
            FUNCTION,
            "array, object, Map or Set",
            other.type_name(),
        )),
    }
}

fn self_keyed(keys: Vec<Value>) -> Vec<(Value, Value)> {
    keys.into_iter().map(|key| (key.clone(), key)).collect()
}

fn pair_key(pair: &Value) -> Result<(Value, Value), EvalError> {
    match pair {
        Value::Array(items) => match items.borrow().first() {
            Some(key) => Ok((key.clone(), key.clone())),
            None => Err(type_mismatch(FUNCTION, "[key, value] pair", "empty array")),
        },
        other => Err(type_mismatch(
            FUNCTION,
            "[key, value] pair",
            other.type_name(),
        )),
    }
}
