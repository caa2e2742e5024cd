//! Callables: native operations and interpreted functions.
//!
//! Both variants sit behind one type so every call site, be it a direct
//! call, a comparator, an event listener or a constructor, goes through the
//! same `Invoker::invoke` entry point.

use std::fmt;
use std::rc::Rc;

use crate::environment::Environment;
use crate::errors::{too_few_args, ControlAction, EvalError, EvalResult};

use super::Value;

/// The single re-entry point into evaluation.
///
/// Implemented by the interpreter. Native code that needs to call script
/// code (sort comparators, listeners, array callbacks) receives an
/// `&dyn Invoker` and must go through it rather than special-casing
/// interpreted bodies.
pub trait Invoker {
    /// Call `callable` with `args`, binding `this` when given.
    fn invoke(&self, callable: &Callable, args: &[Value], this: Option<&Value>) -> EvalResult;
}

/// An interpreted function body.
///
/// The syntax behind a block is opaque to the runtime core: the evaluator
/// implements this trait for its own statement lists. A block finishes
/// normally, raises `ControlAction::Return`, or fails.
pub trait Block: fmt::Debug {
    fn execute(&self, invoker: &dyn Invoker, env: &Environment) -> Result<(), ControlAction>;
}

/// What a native operation sees of its invocation.
pub struct CallContext<'a> {
    invoker: &'a dyn Invoker,
    env: Environment,
}

impl<'a> CallContext<'a> {
    pub fn new(invoker: &'a dyn Invoker, env: Environment) -> Self {
        CallContext { invoker, env }
    }

    /// The invocation environment.
    #[inline]
    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// The bound receiver, if the call was bound.
    pub fn this(&self) -> Option<Value> {
        self.env.lookup_local("this")
    }

    #[inline]
    pub fn invoker(&self) -> &'a dyn Invoker {
        self.invoker
    }

    /// Re-enter evaluation through the invocation protocol.
    #[inline]
    pub fn invoke(&self, callable: &Callable, args: &[Value], this: Option<&Value>) -> EvalResult {
        self.invoker.invoke(callable, args, this)
    }
}

/// Host operation signature.
pub type NativeFnInner = dyn Fn(&CallContext<'_>, &[Value]) -> EvalResult;

/// A function implemented by the host.
pub struct NativeFunction {
    name: String,
    func: Box<NativeFnInner>,
}

impl NativeFunction {
    pub fn new(
        name: impl Into<String>,
        func: impl Fn(&CallContext<'_>, &[Value]) -> EvalResult + 'static,
    ) -> Self {
        NativeFunction {
            name: name.into(),
            func: Box::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the host operation.
    #[inline]
    pub fn call(&self, ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
        (self.func)(ctx, args)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native function {}>", self.name)
    }
}

/// A function whose body is interpreted.
pub struct ScriptFunction {
    name: String,
    params: Vec<String>,
    /// Index of the rest parameter; always the last parameter when present.
    rest_index: Option<usize>,
    closure: Environment,
    body: Rc<dyn Block>,
}

impl ScriptFunction {
    /// A function with fixed arity.
    pub fn new(
        name: impl Into<String>,
        params: Vec<String>,
        closure: Environment,
        body: Rc<dyn Block>,
    ) -> Self {
        ScriptFunction {
            name: name.into(),
            params,
            rest_index: None,
            closure,
            body,
        }
    }

    /// A function whose last parameter collects the remaining arguments.
    ///
    /// Fails when `params` is empty: there is no parameter to collect into.
    pub fn variadic(
        name: impl Into<String>,
        params: Vec<String>,
        closure: Environment,
        body: Rc<dyn Block>,
    ) -> Result<Self, EvalError> {
        let name = name.into();
        let Some(rest_index) = params.len().checked_sub(1) else {
            return Err(too_few_args(&name, 1, 0));
        };
        Ok(ScriptFunction {
            name,
            params,
            rest_index: Some(rest_index),
            closure,
            body,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn rest_index(&self) -> Option<usize> {
        self.rest_index
    }

    /// The scope captured when the function was created.
    pub fn closure(&self) -> &Environment {
        &self.closure
    }

    pub fn body(&self) -> &dyn Block {
        &*self.body
    }
}

impl fmt::Debug for ScriptFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptFunction")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("rest_index", &self.rest_index)
            .finish_non_exhaustive()
    }
}

/// Native or interpreted function value.
#[derive(Clone, Debug)]
pub enum Callable {
    Native(Rc<NativeFunction>),
    Script(Rc<ScriptFunction>),
}

impl Callable {
    /// Wrap a host closure.
    pub fn native(
        name: impl Into<String>,
        func: impl Fn(&CallContext<'_>, &[Value]) -> EvalResult + 'static,
    ) -> Self {
        Callable::Native(Rc::new(NativeFunction::new(name, func)))
    }

    pub fn script(func: ScriptFunction) -> Self {
        Callable::Script(Rc::new(func))
    }

    pub fn name(&self) -> &str {
        match self {
            Callable::Native(f) => f.name(),
            Callable::Script(f) => f.name(),
        }
    }

    #[inline]
    pub fn is_native(&self) -> bool {
        matches!(self, Callable::Native(_))
    }

    /// Identity comparison.
    pub fn ptr_eq(&self, other: &Callable) -> bool {
        match (self, other) {
            (Callable::Native(a), Callable::Native(b)) => Rc::ptr_eq(a, b),
            (Callable::Script(a), Callable::Script(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub(crate) fn addr(&self) -> usize {
        match self {
            Callable::Native(f) => Rc::as_ptr(f) as usize,
            Callable::Script(f) => Rc::as_ptr(f) as usize,
        }
    }
}
