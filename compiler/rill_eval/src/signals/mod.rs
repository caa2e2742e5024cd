//! Signal bridge: OS signals delivered to script callables.
//!
//! Provides signal handling with a flag-based approach:
//! - the OS-level handler only sets an atomic flag (no code runs in signal
//!   context)
//! - the interpreter drains the flags at safe points and invokes the
//!   registered callable with the signal name
//!
//! # Safe Points
//!
//! `Interpreter::safe_point` dispatches pending signals. It runs at the
//! start of every invocation when polling is enabled, and wherever the
//! embedding evaluator calls it (before each statement). Dispatch never
//! nests: a signal raised while a handler runs is delivered at the first
//! safe point after the handler returns.
//!
//! # Process vs. Thread State
//!
//! Flags and OS handler installation are process-wide; an OS handler is
//! installed once per signal and stays installed. The callables are owned
//! by the evaluation thread that registered them.
//!
//! # Platform Support
//!
//! - Unix: `SIGINT`, `SIGTERM`, `SIGHUP`, `SIGUSR1`, `SIGUSR2`
//! - Windows: `SIGINT`, `SIGTERM`
//! - Elsewhere: no signal is supported; registration always fails

use std::cell::RefCell;
use std::os::raw::c_int;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

#[cfg(any(unix, windows))]
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use rill_value::{
    unsupported_signal, CallContext, Callable, EvalError, EvalResult, Invoker, ObjectMap, Value,
};

use crate::methods::helpers::{require_args, require_callable_arg, require_str_arg, NativeFn};

/// Package name.
pub const PACKAGE: &str = "signals";

/// Signals the bridge can deliver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OsSignal {
    Interrupt,
    Terminate,
    Hangup,
    User1,
    User2,
}

impl OsSignal {
    pub const ALL: [OsSignal; 5] = [
        OsSignal::Interrupt,
        OsSignal::Terminate,
        OsSignal::Hangup,
        OsSignal::User1,
        OsSignal::User2,
    ];

    pub fn name(self) -> &'static str {
        match self {
            OsSignal::Interrupt => "SIGINT",
            OsSignal::Terminate => "SIGTERM",
            OsSignal::Hangup => "SIGHUP",
            OsSignal::User1 => "SIGUSR1",
            OsSignal::User2 => "SIGUSR2",
        }
    }

    /// Parse a signal name this platform supports.
    pub fn from_name(name: &str) -> Option<Self> {
        OsSignal::ALL
            .into_iter()
            .find(|signal| signal.name() == name && signal.number().is_some())
    }

    fn index(self) -> usize {
        self as usize
    }

    /// The platform signal number, `None` where the signal does not exist.
    #[cfg(unix)]
    fn number(self) -> Option<c_int> {
        use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM, SIGUSR1, SIGUSR2};
        Some(match self {
            OsSignal::Interrupt => SIGINT,
            OsSignal::Terminate => SIGTERM,
            OsSignal::Hangup => SIGHUP,
            OsSignal::User1 => SIGUSR1,
            OsSignal::User2 => SIGUSR2,
        })
    }

    #[cfg(windows)]
    fn number(self) -> Option<c_int> {
        use signal_hook::consts::{SIGINT, SIGTERM};
        match self {
            OsSignal::Interrupt => Some(SIGINT),
            OsSignal::Terminate => Some(SIGTERM),
            OsSignal::Hangup | OsSignal::User1 | OsSignal::User2 => None,
        }
    }

    #[cfg(not(any(unix, windows)))]
    fn number(self) -> Option<c_int> {
        None
    }
}

/// Names of the signals this platform supports.
pub fn supported_signals() -> Vec<&'static str> {
    OsSignal::ALL
        .iter()
        .filter(|signal| signal.number().is_some())
        .map(|signal| signal.name())
        .collect()
}

/// Pending flags, set from signal context and cleared by dispatch.
static PENDING: OnceLock<[Arc<AtomicBool>; 5]> = OnceLock::new();

/// Which signals have their OS handler installed.
#[cfg(any(unix, windows))]
static INSTALLED: Mutex<[bool; 5]> = parking_lot::const_mutex([false; 5]);

fn pending_flag(signal: OsSignal) -> &'static Arc<AtomicBool> {
    let flags = PENDING.get_or_init(|| std::array::from_fn(|_| Arc::new(AtomicBool::new(false))));
    &flags[signal.index()]
}

thread_local! {
    static HANDLERS: RefCell<FxHashMap<OsSignal, Callable>> = RefCell::new(FxHashMap::default());
}

/// Install the flag-setting OS handler for `signal`, once per process.
#[cfg(any(unix, windows))]
fn install(signal: OsSignal) -> Result<(), EvalError> {
    let number = signal
        .number()
        .ok_or_else(|| unsupported_signal(signal.name()))?;
    let mut installed = INSTALLED.lock();
    if installed[signal.index()] {
        return Ok(());
    }
    let flag = Arc::clone(pending_flag(signal));
    signal_hook::flag::register(number, flag).map_err(|err| {
        rill_value::invalid_operation(format!("cannot install {} handler: {err}", signal.name()))
    })?;
    installed[signal.index()] = true;
    tracing::debug!(signal = signal.name(), "installed OS signal handler");
    Ok(())
}

#[cfg(not(any(unix, windows)))]
fn install(signal: OsSignal) -> Result<(), EvalError> {
    Err(unsupported_signal(signal.name()))
}

fn parse(name: &str) -> Result<OsSignal, EvalError> {
    OsSignal::from_name(name).ok_or_else(|| unsupported_signal(name))
}

/// Route `name` to `handler`, replacing any previous handler.
pub fn register(name: &str, handler: Callable) -> Result<(), EvalError> {
    let signal = parse(name)?;
    install(signal)?;
    tracing::debug!(
        signal = name,
        handler = handler.name(),
        "signal handler registered"
    );
    HANDLERS.with(|handlers| handlers.borrow_mut().insert(signal, handler));
    Ok(())
}

/// Remove the handler for `name`; returns whether one was registered.
///
/// The OS handler stays installed, so later deliveries are dropped.
pub fn clear(name: &str) -> Result<bool, EvalError> {
    let signal = parse(name)?;
    Ok(HANDLERS.with(|handlers| handlers.borrow_mut().remove(&signal).is_some()))
}

/// Send `name` to this process, installing the flag handler first.
pub fn raise(name: &str) -> Result<(), EvalError> {
    let signal = parse(name)?;
    install(signal)?;
    send(signal)
}

#[cfg(any(unix, windows))]
fn send(signal: OsSignal) -> Result<(), EvalError> {
    let number = signal
        .number()
        .ok_or_else(|| unsupported_signal(signal.name()))?;
    signal_hook::low_level::raise(number).map_err(|err| {
        rill_value::invalid_operation(format!("cannot raise {}: {err}", signal.name()))
    })
}

#[cfg(not(any(unix, windows)))]
fn send(signal: OsSignal) -> Result<(), EvalError> {
    Err(unsupported_signal(signal.name()))
}

/// Whether `name` has arrived and not been dispatched yet.
pub fn is_pending(name: &str) -> bool {
    OsSignal::from_name(name).is_some_and(|signal| pending_flag(signal).load(Ordering::Acquire))
}

/// Invoke the handlers of every pending signal.
///
/// A pending signal without a handler on this thread is dropped. The first
/// failing handler stops the dispatch; signals not yet examined stay
/// pending.
pub fn dispatch_pending(invoker: &dyn Invoker) -> Result<(), EvalError> {
    for signal in OsSignal::ALL {
        if !pending_flag(signal).swap(false, Ordering::AcqRel) {
            continue;
        }
        let handler = HANDLERS.with(|handlers| handlers.borrow().get(&signal).cloned());
        match handler {
            Some(handler) => {
                tracing::debug!(signal = signal.name(), "dispatching signal");
                invoker.invoke(&handler, &[Value::string(signal.name())], None)?;
            }
            None => tracing::debug!(signal = signal.name(), "no handler; signal dropped"),
        }
    }
    Ok(())
}

/// Install `on`, `clear`, `raise` and `supported`.
pub fn init_package(bindings: &mut ObjectMap) -> Result<(), EvalError> {
    let functions: [(&str, NativeFn); 4] = [
        ("on", on_signal),
        ("clear", clear_signal),
        ("raise", raise_signal),
        ("supported", supported),
    ];
    for (name, func) in functions {
        bindings.insert(
            name.to_string(),
            Value::Callable(Callable::native(name, func)),
        );
    }
    Ok(())
}

/// `on(name, handler)`.
fn on_signal(_ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const FUNCTION: &str = "on";
    require_args(FUNCTION, 2, args.len())?;
    let name = require_str_arg(FUNCTION, args, 0)?;
    let handler = require_callable_arg(FUNCTION, args, 1)?;
    register(name, handler.clone())?;
    Ok(Value::Null)
}

/// `clear(name)`.
fn clear_signal(_ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const FUNCTION: &str = "clear";
    require_args(FUNCTION, 1, args.len())?;
    let name = require_str_arg(FUNCTION, args, 0)?;
    clear(name).map(Value::Bool)
}

/// `raise(name)`.
fn raise_signal(_ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const FUNCTION: &str = "raise";
    require_args(FUNCTION, 1, args.len())?;
    let name = require_str_arg(FUNCTION, args, 0)?;
    raise(name)?;
    Ok(Value::Null)
}

/// `supported()`.
fn supported(_ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    require_args("supported", 0, args.len())?;
    Ok(Value::array(
        supported_signals().into_iter().map(Value::string).collect(),
    ))
}
