//! Lexical scopes for variable storage and closures.
//!
//! An `Environment` is a handle to one scope. Each scope owns its bindings
//! and holds a shared reference to its parent, so a closure that captured a
//! scope keeps the whole ancestor chain alive after the defining block has
//! exited. Cloning an `Environment` shares the scope; [`Environment::child`]
//! creates a new one.

use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::errors::{undefined_variable, EvalError};
use crate::value::Value;

/// A single scope containing variable bindings.
struct Scope {
    /// Bindings owned by this scope.
    bindings: RefCell<FxHashMap<String, Value>>,
    /// Enclosing scope, `None` at the root.
    parent: Option<Environment>,
}

/// Shared handle to a scope in the chain.
#[derive(Clone)]
pub struct Environment(Rc<Scope>);

impl Environment {
    /// Create a root scope.
    pub fn new() -> Self {
        Environment(Rc::new(Scope {
            bindings: RefCell::new(FxHashMap::default()),
            parent: None,
        }))
    }

    /// Create a new scope whose parent is `self`.
    #[must_use]
    pub fn child(&self) -> Self {
        Environment(Rc::new(Scope {
            bindings: RefCell::new(FxHashMap::default()),
            parent: Some(self.clone()),
        }))
    }

    pub fn parent(&self) -> Option<&Environment> {
        self.0.parent.as_ref()
    }

    /// Insert or overwrite a binding in this scope only.
    ///
    /// A binding of the same name in an ancestor is shadowed, never mutated.
    #[inline]
    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.0.bindings.borrow_mut().insert(name.into(), value);
    }

    /// Look a name up, walking outward.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        let mut scope = Some(self);
        while let Some(env) = scope {
            if let Some(value) = env.0.bindings.borrow().get(name) {
                return Some(value.clone());
            }
            scope = env.parent();
        }
        None
    }

    /// Like [`lookup`](Self::lookup), failing with a `NameError` when the
    /// name is unresolved at the root.
    pub fn get(&self, name: &str) -> Result<Value, EvalError> {
        self.lookup(name).ok_or_else(|| undefined_variable(name))
    }

    /// Look a name up in this scope only.
    pub fn lookup_local(&self, name: &str) -> Option<Value> {
        self.0.bindings.borrow().get(name).cloned()
    }

    #[inline]
    pub fn contains_local(&self, name: &str) -> bool {
        self.0.bindings.borrow().contains_key(name)
    }

    /// Update the nearest existing binding of `name`.
    pub fn assign(&self, name: &str, value: Value) -> Result<(), EvalError> {
        let mut scope = Some(self);
        while let Some(env) = scope {
            if let Some(slot) = env.0.bindings.borrow_mut().get_mut(name) {
                *slot = value;
                return Ok(());
            }
            scope = env.parent();
        }
        Err(undefined_variable(name))
    }

    /// Names bound in this scope, sorted.
    pub fn local_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.0.bindings.borrow().keys().cloned().collect();
        names.sort();
        names
    }

    /// Whether both handles refer to the same scope.
    pub fn ptr_eq(&self, other: &Environment) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Number of scopes from here to the root, counting both ends.
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut scope = self.parent();
        while let Some(env) = scope {
            depth += 1;
            scope = env.parent();
        }
        depth
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

// Values may capture the scope they live in; print names only.
impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("bindings", &self.local_names())
            .field("depth", &self.depth())
            .finish()
    }
}
