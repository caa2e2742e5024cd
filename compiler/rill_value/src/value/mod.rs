//! Runtime values for the Rill runtime.
//!
//! # Heap Enforcement
//!
//! Arrays, Objects and Promises live behind [`Heap<T>`], whose constructor
//! is crate-private. External code creates them through the `Value::`
//! factory methods:
//!
//! ```text
//! let s = Value::string("hello");          // OK
//! let list = Value::array(vec![]);         // OK
//! let obj = Value::object(ObjectMap::new()); // OK
//! ```
//!
//! # Equality
//!
//! Arrays and Objects compare structurally. Callables, classes, instances
//! and promises compare by identity.

mod callable;
mod class;
mod heap;
mod key;
mod ordered;
mod promise;

use std::fmt;
use std::rc::Rc;

pub use callable::{Block, CallContext, Callable, Invoker, NativeFunction, ScriptFunction};
pub use class::{ClassDescriptor, Instance};
pub use heap::Heap;
pub use key::HashKey;
pub use ordered::OrderedIndex;
pub use promise::PromiseState;

/// Insertion-ordered string-keyed mapping backing Object values.
pub type ObjectMap = OrderedIndex<String, Value>;

/// Runtime value.
#[derive(Clone, Debug, Default)]
pub enum Value {
    /// Absence of a value.
    #[default]
    Null,
    /// Double-precision number.
    Number(f64),
    Bool(bool),
    Str(Rc<str>),
    /// Ordered sequence, shared by reference.
    Array(Heap<Vec<Value>>),
    /// Insertion-ordered string map, shared by reference.
    Object(Heap<ObjectMap>),
    Callable(Callable),
    Class(Rc<ClassDescriptor>),
    Instance(Instance),
    /// Async result slot.
    Promise(Heap<PromiseState>),
}

// Factory Methods (ONLY way to construct heap values)

impl Value {
    #[inline]
    pub fn number(n: impl Into<f64>) -> Self {
        Value::Number(n.into())
    }

    #[inline]
    pub fn string(s: impl AsRef<str>) -> Self {
        Value::Str(Rc::from(s.as_ref()))
    }

    #[inline]
    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Heap::new(items))
    }

    #[inline]
    pub fn object(entries: ObjectMap) -> Self {
        Value::Object(Heap::new(entries))
    }

    /// A promise in the pending state.
    #[inline]
    pub fn pending_promise() -> Self {
        Value::Promise(Heap::new(PromiseState::Pending))
    }

    #[inline]
    pub fn class(class: ClassDescriptor) -> Self {
        Value::Class(Rc::new(class))
    }
}

// Inspection

impl Value {
    /// Kind name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Number(_) => "number",
            Value::Bool(_) => "boolean",
            Value::Str(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Callable(_) => "function",
            Value::Class(_) => "class",
            Value::Instance(_) => "instance",
            Value::Promise(_) => "promise",
        }
    }

    /// Truthiness used by conditionals.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Str(s) => !s.is_empty(),
            _ => true,
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_callable(&self) -> Option<&Callable> {
        match self {
            Value::Callable(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Value::Instance(i) => Some(i),
            _ => None,
        }
    }

    /// Stable address for reference kinds, `None` for scalars.
    ///
    /// Used to break ordering ties between values with no natural order.
    pub fn identity(&self) -> Option<usize> {
        match self {
            Value::Array(a) => Some(a.addr()),
            Value::Object(o) => Some(o.addr()),
            Value::Callable(c) => Some(c.addr()),
            Value::Class(c) => Some(Rc::as_ptr(c) as usize),
            Value::Instance(i) => Some(i.addr()),
            Value::Promise(p) => Some(p.addr()),
            Value::Null | Value::Number(_) | Value::Bool(_) | Value::Str(_) => None,
        }
    }
}

/// Structural equality for data, identity for everything else.
pub fn value_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Number(x), Value::Number(y)) => x == y,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::Array(x), Value::Array(y)) => {
            if x.ptr_eq(y) {
                return true;
            }
            let (x, y) = (x.borrow(), y.borrow());
            x.len() == y.len() && x.iter().zip(y.iter()).all(|(a, b)| value_equal(a, b))
        }
        (Value::Object(x), Value::Object(y)) => {
            if x.ptr_eq(y) {
                return true;
            }
            let (x, y) = (x.borrow(), y.borrow());
            x.len() == y.len()
                && x
                    .iter()
                    .all(|(k, v)| y.get(k).is_some_and(|other| value_equal(v, other)))
        }
        (Value::Callable(x), Value::Callable(y)) => x.ptr_eq(y),
        (Value::Class(x), Value::Class(y)) => Rc::ptr_eq(x, y),
        (Value::Instance(x), Value::Instance(y)) => x.ptr_eq(y),
        (Value::Promise(x), Value::Promise(y)) => x.ptr_eq(y),
        _ => false,
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        value_equal(self, other)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<Callable> for Value {
    fn from(c: Callable) -> Self {
        Value::Callable(c)
    }
}

impl From<Instance> for Value {
    fn from(i: Instance) -> Self {
        Value::Instance(i)
    }
}

/// Canonical number formatting: integral values print without a fraction.
pub(crate) fn format_number(n: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if n.is_nan() {
        f.write_str("NaN")
    } else if n.is_infinite() {
        f.write_str(if n > 0.0 { "Infinity" } else { "-Infinity" })
    } else if n == 0.0 {
        f.write_str("0")
    } else if n.fract() == 0.0 && n.abs() < 1e16 {
        write!(f, "{n:.0}")
    } else {
        write!(f, "{n}")
    }
}

/// Nested strings are quoted so `["a"]` and `"[a]"` render differently.
fn fmt_nested(value: &Value, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match value {
        Value::Str(s) => write!(f, "{:?}", &**s),
        other => fmt::Display::fmt(other, f),
    }
}

/// The canonical string conversion used for coercions and messages.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Number(n) => format_number(*n, f),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Str(s) => f.write_str(s),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    fmt_nested(item, f)?;
                }
                f.write_str("]")
            }
            Value::Object(map) => {
                f.write_str("{")?;
                for (i, (key, item)) in map.borrow().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: ")?;
                    fmt_nested(item, f)?;
                }
                f.write_str("}")
            }
            Value::Callable(c) => write!(f, "<function {}>", c.name()),
            Value::Class(c) => write!(f, "<class {}>", c.name()),
            Value::Instance(i) => write!(f, "<{} instance>", i.class().name()),
            Value::Promise(p) => write!(f, "<promise {}>", p.borrow().state_name()),
        }
    }
}
