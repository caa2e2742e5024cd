//! Hashable projection of runtime values.
//!
//! Map and Set index their entries by `HashKey`, using SameValueZero: values
//! that [`value_equal`](super::value_equal) reports equal share a key, so a
//! structurally equal array finds the same Map entry. NaN is the one
//! exception to the converse: every NaN maps to a single key although NaN
//! never compares equal to itself. Array and Object keys are snapshots taken
//! when the key is computed; mutating the original afterwards does not move
//! the entry.

use std::rc::Rc;

use super::Value;

/// Canonical bit pattern shared by every NaN.
const CANONICAL_NAN: u64 = 0x7ff8_0000_0000_0000;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum HashKey {
    Null,
    Bool(bool),
    /// Normalized `f64` bits: `-0` folds into `0`, every NaN into one.
    Number(u64),
    Str(Rc<str>),
    Seq(Vec<HashKey>),
    /// Object entries sorted by name, so insertion order does not matter.
    Record(Vec<(String, HashKey)>),
    /// Identity of a reference-kind value.
    Identity(usize),
}

impl HashKey {
    pub fn from_value(value: &Value) -> HashKey {
        match value {
            Value::Null => HashKey::Null,
            Value::Bool(b) => HashKey::Bool(*b),
            Value::Number(n) => HashKey::Number(normalize(*n)),
            Value::Str(s) => HashKey::Str(Rc::clone(s)),
            Value::Array(items) => {
                HashKey::Seq(items.borrow().iter().map(HashKey::from_value).collect())
            }
            Value::Object(map) => {
                let mut entries: Vec<(String, HashKey)> = map
                    .borrow()
                    .iter()
                    .map(|(k, v)| (k.clone(), HashKey::from_value(v)))
                    .collect();
                entries.sort_by(|a, b| a.0.cmp(&b.0));
                HashKey::Record(entries)
            }
            other => HashKey::Identity(other.identity().unwrap_or_default()),
        }
    }
}

fn normalize(n: f64) -> u64 {
    if n.is_nan() {
        CANONICAL_NAN
    } else if n == 0.0 {
        0
    } else {
        n.to_bits()
    }
}

impl From<&Value> for HashKey {
    fn from(value: &Value) -> Self {
        HashKey::from_value(value)
    }
}
