#![allow(
    clippy::result_large_err,
    reason = "EvalError is fundamental; boxing would add complexity across the crate"
)]
//! Rill Value - the data model of the Rill runtime core.
//!
//! This crate provides:
//! - Runtime values (`Value`, `Heap`, `HashKey`, `OrderedIndex`)
//! - Lexical scopes (`Environment`)
//! - Callables (`Callable`, `NativeFunction`, `ScriptFunction`)
//! - Classes and instances with owned native resources
//! - Evaluation error types (`EvalError`, `EvalResult`, `ControlAction`)
//!
//! # Evaluator Boundary
//!
//! Interpreted function bodies are opaque to this crate. They implement
//! [`Block`], and everything that needs to call back into script code goes
//! through the [`Invoker`] trait, which the interpreter implements. Native
//! functions receive the invoker in their [`CallContext`], so comparators,
//! listeners and constructors are interchangeable between native and
//! scripted definitions.
//!
//! # Ownership
//!
//! Shared values use `Rc` reference counting on a single evaluation thread.
//! There is no cycle collector: a value graph that references itself is
//! never reclaimed.

mod environment;
mod errors;
mod value;

pub use environment::Environment;
pub use errors::{
    BacktraceFrame, ControlAction, ErrorCategory, EvalBacktrace, EvalError, EvalErrorKind,
    EvalResult,
};
pub use value::{
    Block, CallContext, Callable, ClassDescriptor, HashKey, Heap, Instance, Invoker,
    NativeFunction, ObjectMap, OrderedIndex, PromiseState, ScriptFunction, Value,
};
pub use value::value_equal;

// Re-export error constructors for use by other crates
pub use errors::{
    invalid_operation, no_such_method, not_callable, package_initializing, package_not_found,
    recursion_limit_exceeded, too_few_args, type_mismatch, undefined_variable,
    unsupported_signal, wrong_arg_count,
};
