//! The interpreter: invocation protocol, construction and method dispatch.
//!
//! # Invocation Protocol
//!
//! Every call goes through [`Interpreter::invoke`] (the [`Invoker`] impl):
//! direct calls, comparators, array callbacks, event listeners, connected
//! slots and constructors alike. It
//!
//! 1. polls pending OS signals (when enabled),
//! 2. pushes a call frame, failing with `RecursionError` past the limit,
//! 3. runs the native operation, or binds arguments into a child of the
//!    closure and executes the interpreted body,
//! 4. turns `ControlAction::Return` into the call's result,
//! 5. attaches a backtrace to a failure and pops the frame.
//!
//! Failures from re-entrant calls are never swallowed: they unwind to the
//! original call site unchanged apart from the backtrace.

mod builder;

pub use builder::InterpreterBuilder;

use std::cell::{Cell, RefCell};
use std::process::ExitCode;
use std::rc::Rc;

use rill_value::{
    no_such_method, not_callable, too_few_args, wrong_arg_count, Block, CallContext, Callable,
    ClassDescriptor, ControlAction, Environment, EvalError, EvalResult, Instance, Invoker,
    ScriptFunction, Value,
};

use crate::config::RuntimeConfig;
use crate::diagnostics::{CallFrame, CallStack};
use crate::packages;
use crate::signals;
use crate::stack::ensure_sufficient_stack;

/// Name of the method run by `new ClassName(args)`.
pub const CONSTRUCTOR: &str = "constructor";

/// Name bound to the receiver in a method call.
pub const THIS: &str = "this";

/// Tree-walking interpreter state shared by every invocation.
pub struct Interpreter {
    globals: Environment,
    config: RuntimeConfig,
    call_stack: RefCell<CallStack>,
    /// Set while signal handlers run, so safe points inside them don't nest.
    dispatching_signals: Cell<bool>,
}

impl Interpreter {
    /// An interpreter with default configuration and the prelude installed.
    pub fn new() -> Result<Self, EvalError> {
        InterpreterBuilder::new().build()
    }

    pub fn builder() -> InterpreterBuilder {
        InterpreterBuilder::new()
    }

    pub(crate) fn from_parts(globals: Environment, config: RuntimeConfig) -> Self {
        let call_stack = CallStack::new(config.max_call_depth);
        Interpreter {
            globals,
            config,
            call_stack: RefCell::new(call_stack),
            dispatching_signals: Cell::new(false),
        }
    }

    /// The global scope.
    #[inline]
    pub fn globals(&self) -> &Environment {
        &self.globals
    }

    pub fn define_global(&self, name: impl Into<String>, value: Value) {
        self.globals.define(name, value);
    }

    #[inline]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Number of invocations currently active.
    pub fn call_depth(&self) -> usize {
        self.call_stack.borrow().depth()
    }

    /// Call a Callable, or construct when given a class.
    pub fn call_value(&self, callee: &Value, args: &[Value]) -> EvalResult {
        match callee {
            Value::Callable(callable) => self.invoke(callable, args, None),
            Value::Class(class) => self.construct(class, args),
            other => Err(not_callable(other.type_name())),
        }
    }

    /// `new Class(args)`.
    pub fn construct(&self, class: &Rc<ClassDescriptor>, args: &[Value]) -> EvalResult {
        construct_with(self, class, args)
    }

    /// Resolve a method on `receiver` without calling it.
    pub fn get_method(&self, receiver: &Value, name: &str) -> Result<Callable, EvalError> {
        resolve_method(receiver, name)
    }

    /// `receiver.name(args)`, dispatched with `this` bound to the receiver.
    #[tracing::instrument(level = "trace", skip(self, receiver, args))]
    pub fn call_method(&self, receiver: &Value, name: &str, args: &[Value]) -> EvalResult {
        let method = resolve_method(receiver, name)?;
        self.invoke(&method, args, Some(receiver))
    }

    /// A package's bindings as a namespace object.
    pub fn import(&self, name: &str) -> EvalResult {
        packages::ensure_package(name).map(Value::object)
    }

    /// Deliver pending OS signals to their registered callables.
    ///
    /// The external evaluator calls this before each statement; `invoke`
    /// calls it on entry when polling is enabled. A handler that reaches a
    /// safe point while running does not trigger another dispatch.
    pub fn safe_point(&self) -> Result<(), EvalError> {
        if self.dispatching_signals.replace(true) {
            return Ok(());
        }
        let result = signals::dispatch_pending(self);
        self.dispatching_signals.set(false);
        result
    }

    /// Run a program body in the global scope.
    ///
    /// A top-level `return` ends the program with its value.
    pub fn run(&self, program: &dyn Block) -> EvalResult {
        if self.config.signal_polling {
            self.safe_point()?;
        }
        match program.execute(self, &self.globals) {
            Ok(()) => Ok(Value::Null),
            Err(ControlAction::Return(value)) => Ok(value),
            Err(ControlAction::Error(err)) => Err(err),
        }
    }

    fn invoke_frame(
        &self,
        callable: &Callable,
        args: &[Value],
        this: Option<&Value>,
    ) -> EvalResult {
        match callable {
            Callable::Native(func) => {
                let env = match this {
                    Some(receiver) => {
                        let env = self.globals.child();
                        env.define(THIS, receiver.clone());
                        env
                    }
                    None => self.globals.clone(),
                };
                func.call(&CallContext::new(self, env), args)
            }
            Callable::Script(func) => {
                let env = bind_arguments(func, args)?;
                if let Some(receiver) = this {
                    env.define(THIS, receiver.clone());
                }
                match func.body().execute(self, &env) {
                    Ok(()) => Ok(Value::Null),
                    Err(ControlAction::Return(value)) => Ok(value),
                    Err(ControlAction::Error(err)) => Err(err),
                }
            }
        }
    }
}

impl Invoker for Interpreter {
    #[tracing::instrument(
        level = "trace",
        skip_all,
        fields(
            callable = callable.name(),
            args = args.len(),
            bound = this.is_some(),
        )
    )]
    fn invoke(&self, callable: &Callable, args: &[Value], this: Option<&Value>) -> EvalResult {
        if self.config.signal_polling {
            self.safe_point()?;
        }
        self.call_stack
            .borrow_mut()
            .push(CallFrame::new(callable.name()))?;
        let result = ensure_sufficient_stack(|| self.invoke_frame(callable, args, this));
        let mut stack = self.call_stack.borrow_mut();
        let result = result.map_err(|err| stack.attach_backtrace(err));
        stack.pop();
        result
    }
}

impl std::fmt::Debug for Interpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interpreter")
            .field("config", &self.config)
            .field("call_depth", &self.call_depth())
            .finish_non_exhaustive()
    }
}

/// Bind positional arguments into a fresh child of the closure.
fn bind_arguments(func: &ScriptFunction, args: &[Value]) -> Result<Environment, EvalError> {
    let params = func.params();
    let env = func.closure().child();
    match func.rest_index() {
        Some(rest) => {
            if args.len() < rest {
                return Err(too_few_args(func.name(), rest, args.len()));
            }
            let (fixed, tail) = params.split_at(rest.min(params.len()));
            for (param, arg) in fixed.iter().zip(args) {
                env.define(param.clone(), arg.clone());
            }
            if let Some(rest_name) = tail.first() {
                env.define(rest_name.clone(), Value::array(args[rest..].to_vec()));
            }
        }
        None => {
            if args.len() != params.len() {
                return Err(wrong_arg_count(func.name(), params.len(), args.len()));
            }
            for (param, arg) in params.iter().zip(args) {
                env.define(param.clone(), arg.clone());
            }
        }
    }
    Ok(env)
}

/// Allocate an instance of `class` and run its constructor bound to it.
///
/// Shared by `Interpreter::construct` and native constructor functions, so
/// both paths go through the invocation protocol. A class without a
/// constructor accepts no arguments.
pub fn construct_with(
    invoker: &dyn Invoker,
    class: &Rc<ClassDescriptor>,
    args: &[Value],
) -> EvalResult {
    let instance = Instance::new(Rc::clone(class));
    let this = Value::Instance(instance.clone());
    match class.method(CONSTRUCTOR) {
        Some(constructor) => {
            invoker.invoke(&constructor, args, Some(&this))?;
        }
        None if args.is_empty() => {}
        None => return Err(wrong_arg_count(class.name(), 0, args.len())),
    }
    if class.is_native() && !instance.has_native() {
        tracing::warn!(
            class = class.name(),
            "native constructor returned without attaching a resource"
        );
    }
    Ok(this)
}

/// Method lookup: instance fields first, then the class's method table.
///
/// Plain objects resolve callable entries by key.
pub fn resolve_method(receiver: &Value, name: &str) -> Result<Callable, EvalError> {
    match receiver {
        Value::Instance(instance) => {
            if let Some(Value::Callable(field)) = instance.get_field(name) {
                return Ok(field);
            }
            instance
                .class()
                .method(name)
                .ok_or_else(|| no_such_method(name, instance.class().name()))
        }
        Value::Object(map) => match map.borrow().get(name) {
            Some(Value::Callable(callable)) => Ok(callable.clone()),
            _ => Err(no_such_method(name, "object")),
        },
        other => Err(no_such_method(name, other.type_name())),
    }
}

/// Process exit status for a program result.
///
/// An uncaught error is reported on stderr and yields a failing status.
pub fn exit_status(result: &EvalResult) -> ExitCode {
    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(category = %err.category(), "uncaught error: {}", err.message);
            eprintln!("{err}");
            if let Some(backtrace) = &err.backtrace {
                eprint!("{backtrace}");
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
