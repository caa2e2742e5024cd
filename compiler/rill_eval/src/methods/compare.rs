//! Value ordering for sorting.
//!
//! # Default Order
//!
//! Values rank by type class first: number < string < boolean < null <
//! everything else. Within a class, numbers, strings and booleans use their
//! natural order (NaN after every other number). Reference kinds have no
//! natural order; they group by kind and then by allocation address, which
//! is deterministic for the lifetime of the values.
//!
//! # Comparators
//!
//! A user comparator is called through the invocation protocol for every
//! comparison. Its result must be a number, a numeric string, or a boolean
//! (`true` is `1`, `false` is `-1`); the sign picks the order and NaN counts
//! as equal. Comparator failures propagate out of the sort.

use std::cmp::Ordering;

use rill_value::{type_mismatch, Callable, EvalError, Invoker, Value};

/// Runs at or below this length use insertion sort.
const INSERTION_THRESHOLD: usize = 8;

/// Type class used by the default order.
pub fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Number(_) => 0,
        Value::Str(_) => 1,
        Value::Bool(_) => 2,
        Value::Null => 3,
        _ => 4,
    }
}

/// The default total order over values.
pub fn default_compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.is_nan(), y.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        },
        (Value::Str(x), Value::Str(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Null, Value::Null) => Ordering::Equal,
        _ => type_rank(a)
            .cmp(&type_rank(b))
            .then_with(|| a.type_name().cmp(b.type_name()))
            .then_with(|| a.identity().cmp(&b.identity())),
    }
}

/// Interpret a comparator's return value.
pub fn comparator_ordering(result: &Value) -> Result<Ordering, EvalError> {
    let n = match result {
        Value::Number(n) => *n,
        Value::Bool(true) => 1.0,
        Value::Bool(false) => -1.0,
        Value::Str(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| type_mismatch("comparator result", "number", "non-numeric string"))?,
        other => return Err(type_mismatch(
            "comparator result",
            "number",
            other.type_name(),
        )),
    };
    Ok(if n < 0.0 {
        Ordering::Less
    } else if n > 0.0 {
        Ordering::Greater
    } else {
        Ordering::Equal
    })
}

/// Compare with `comparator` when given, else with the default order.
pub fn compare_with(
    invoker: &dyn Invoker,
    comparator: Option<&Callable>,
    a: &Value,
    b: &Value,
) -> Result<Ordering, EvalError> {
    match comparator {
        Some(comparator) => {
            let result = invoker.invoke(comparator, &[a.clone(), b.clone()], None)?;
            comparator_ordering(&result)
        }
        None => Ok(default_compare(a, b)),
    }
}

/// Stable merge sort with a fallible comparison.
///
/// An element moves ahead of an earlier one only when the comparison says
/// the earlier one is strictly greater, so a comparator that answers
/// "less" for every pair leaves the input order untouched. The first
/// comparison error aborts the sort.
pub fn stable_sort_by<T, F>(items: Vec<T>, mut cmp: F) -> Result<Vec<T>, EvalError>
where
    F: FnMut(&T, &T) -> Result<Ordering, EvalError>,
{
    merge_sort(items, &mut cmp)
}

fn merge_sort<T, F>(mut items: Vec<T>, cmp: &mut F) -> Result<Vec<T>, EvalError>
where
    F: FnMut(&T, &T) -> Result<Ordering, EvalError>,
{
    if items.len() <= INSERTION_THRESHOLD {
        insertion_sort(&mut items, cmp)?;
        return Ok(items);
    }
    let right = items.split_off(items.len() / 2);
    let left = merge_sort(items, cmp)?;
    let right = merge_sort(right, cmp)?;

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    loop {
        let take_right = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => cmp(l, r)? == Ordering::Greater,
            (Some(_), None) => false,
            (None, Some(_)) => true,
            (None, None) => break,
        };
        let next = if take_right {
            right.next()
        } else {
            left.next()
        };
        merged.extend(next);
    }
    Ok(merged)
}

fn insertion_sort<T, F>(items: &mut [T], cmp: &mut F) -> Result<(), EvalError>
where
    F: FnMut(&T, &T) -> Result<Ordering, EvalError>,
{
    for i in 1..items.len() {
        let mut j = i;
        while j > 0 && cmp(&items[j - 1], &items[j])? == Ordering::Greater {
            items.swap(j - 1, j);
            j -= 1;
        }
    }
    Ok(())
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
