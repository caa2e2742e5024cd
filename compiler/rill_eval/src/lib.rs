#![allow(
    clippy::result_large_err,
    reason = "EvalError is fundamental; boxing would add complexity across the crate"
)]
//! Rill Eval - the evaluation core of the Rill runtime.
//!
//! This crate provides the interpreter side of the runtime core; the data
//! model lives in `rill_value`.
//!
//! # Architecture
//!
//! - `Interpreter`: the single invocation protocol, class construction,
//!   method dispatch and call-depth tracking
//! - `packages`: the registry of lazily-initialized packages
//! - `collections`: native Map, Set, Stack, Deque and PriorityQueue classes
//!   plus `keysSorted`
//! - `events`: the event bus and `connect`
//! - `signals`: OS signals delivered to script callables at safe points
//! - `arrays`: higher-order array operations
//!
//! Function bodies are supplied by the embedding evaluator through
//! [`Block`]; [`FnBlock`] adapts a closure for hosts and tests.
//!
//! # Re-exports
//!
//! The value types from `rill_value` are re-exported for convenience.

pub mod arrays;
mod block;
pub mod collections;
pub mod config;
pub mod diagnostics;
pub mod events;
pub mod interpreter;
pub mod methods;
pub mod packages;
pub mod signals;
mod stack;

use std::sync::Once;

pub use rill_value::{
    Block, CallContext, Callable, ClassDescriptor, ControlAction, Environment, ErrorCategory,
    EvalError, EvalResult, Instance, Invoker, ObjectMap, ScriptFunction, Value,
};

// Re-export error constructors for native code built on this crate
pub use rill_value::{
    invalid_operation, no_such_method, not_callable, too_few_args, type_mismatch,
    undefined_variable, wrong_arg_count,
};

pub use block::{script_function, FnBlock};
pub use config::RuntimeConfig;
pub use diagnostics::{CallFrame, CallStack};
pub use interpreter::{
    construct_with, exit_status, resolve_method, Interpreter, InterpreterBuilder,
};
pub use packages::{ensure_package, register_package, register_package_symbol};
pub use stack::ensure_sufficient_stack;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing subscriber for debug output.
///
/// Call once at startup. Uses `RUST_LOG` environment variable for filtering.
/// Example: `RUST_LOG=rill_eval=debug cargo run`
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
