//! Event bus: named signals with ordered listener lists.
//!
//! An `EventBus` instance owns a [`ListenerTable`]. `receive` appends a
//! listener (registering the same callable twice makes it run twice),
//! `emit` runs every listener registered for the signal when the emission
//! starts, in registration order, through the invocation protocol.
//!
//! # Failure Policy
//!
//! The first listener that fails aborts the emission: the remaining
//! listeners are skipped and the error propagates to the `emit` caller.
//!
//! # Connect
//!
//! `connect(sender, signal, receiver, slot)` subscribes `receiver` to
//! `sender`. A slot given by name is resolved once, at connect time, and
//! wrapped in a callable that always runs the resolved method with `this`
//! bound to `receiver`; reassigning the method later does not affect the
//! connection. A slot given as a callable is registered unchanged.

use std::rc::Rc;

use rill_value::{
    type_mismatch, CallContext, Callable, ClassDescriptor, EvalError, EvalResult, Instance,
    ObjectMap, OrderedIndex, Value,
};

use crate::collections::{attach_to_receiver, constructor_function, Store};
use crate::interpreter::{resolve_method, CONSTRUCTOR};
use crate::methods::helpers::{
    len_to_value, native_class, require_args, require_args_between, require_min_args,
    require_str_arg, with_resource,
};

/// Package name.
pub const PACKAGE: &str = "events";

const CLASS: &str = "EventBus";

/// Listener lists keyed by signal name, in first-registration order.
#[derive(Debug, Default)]
pub struct ListenerTable {
    signals: OrderedIndex<String, Vec<Callable>>,
}

impl ListenerTable {
    pub fn add(&mut self, signal: &str, listener: Callable) {
        match self.signals.get_mut(signal) {
            Some(listeners) => listeners.push(listener),
            None => {
                self.signals.insert(signal.to_string(), vec![listener]);
            }
        }
    }

    /// Listeners for `signal`, copied out so callers can invoke them freely.
    pub fn snapshot(&self, signal: &str) -> Vec<Callable> {
        self.signals.get(signal).cloned().unwrap_or_default()
    }

    /// Remove every registration of `listener`, or every listener when
    /// `None`. Returns how many were removed.
    pub fn remove(&mut self, signal: &str, listener: Option<&Callable>) -> usize {
        let Some(listeners) = self.signals.get_mut(signal) else {
            return 0;
        };
        let before = listeners.len();
        match listener {
            Some(listener) => listeners.retain(|registered| !registered.ptr_eq(listener)),
            None => listeners.clear(),
        }
        let removed = before - listeners.len();
        if listeners.is_empty() {
            self.signals.remove(signal);
        }
        removed
    }

    pub fn count(&self, signal: &str) -> usize {
        self.signals.get(signal).map_or(0, Vec::len)
    }

    pub fn signal_names(&self) -> Vec<String> {
        self.signals.keys().cloned().collect()
    }
}

impl Store for ListenerTable {
    const CLASS: &'static str = CLASS;

    fn len(&self) -> usize {
        self.signals.values().map(Vec::len).sum()
    }
}

fn class() -> Rc<ClassDescriptor> {
    Rc::new(native_class(
        CLASS,
        &[
            (CONSTRUCTOR, construct),
            ("receive", receive),
            ("emit", emit),
            ("off", off),
            ("listenerCount", listener_count),
            ("signals", signals),
        ],
    ))
}

/// Install `EventBus`, `eventBus` and `connect`.
pub fn init_package(bindings: &mut ObjectMap) -> Result<(), EvalError> {
    let class = class();
    bindings.insert(CLASS.to_string(), Value::Class(Rc::clone(&class)));
    bindings.insert(
        "eventBus".to_string(),
        Value::Callable(constructor_function("eventBus", class)),
    );
    bindings.insert(
        "connect".to_string(),
        Value::Callable(Callable::native("connect", connect)),
    );
    Ok(())
}

fn construct(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const METHOD: &str = "EventBus.constructor";
    require_args(METHOD, 0, args.len())?;
    attach_to_receiver(ctx, METHOD, ListenerTable::default())?;
    Ok(Value::Null)
}

fn listener_arg<'a>(
    method: &str,
    args: &'a [Value],
    index: usize,
) -> Result<&'a Callable, EvalError> {
    match args.get(index) {
        Some(Value::Callable(listener)) => Ok(listener),
        other => Err(type_mismatch(
            method,
            "function",
            other.map_or("nothing", Value::type_name),
        )),
    }
}

/// `receive(signal, listener)`.
fn receive(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const METHOD: &str = "EventBus.receive";
    require_args(METHOD, 2, args.len())?;
    let signal = require_str_arg(METHOD, args, 0)?;
    let listener = listener_arg(METHOD, args, 1)?;
    with_resource(ctx, METHOD, |table: &mut ListenerTable| {
        table.add(signal, listener.clone());
    })?;
    tracing::debug!(signal, listener = listener.name(), "listener registered");
    Ok(Value::Null)
}

/// `emit(signal, ...args)`.
fn emit(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const METHOD: &str = "EventBus.emit";
    require_min_args(METHOD, 1, args.len())?;
    let signal = require_str_arg(METHOD, args, 0)?;
    let listeners = with_resource(ctx, METHOD, |table: &mut ListenerTable| {
        table.snapshot(signal)
    })?;
    tracing::trace!(signal, listeners = listeners.len(), "emit");
    for listener in &listeners {
        ctx.invoke(listener, &args[1..], None)?;
    }
    Ok(Value::Null)
}

/// `off(signal, listener?)`; returns the number of registrations removed.
fn off(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const METHOD: &str = "EventBus.off";
    require_args_between(METHOD, 1, 2, args.len())?;
    let signal = require_str_arg(METHOD, args, 0)?;
    let listener = match args.get(1) {
        None | Some(Value::Null) => None,
        Some(_) => Some(listener_arg(METHOD, args, 1)?),
    };
    with_resource(ctx, METHOD, |table: &mut ListenerTable| {
        len_to_value(table.remove(signal, listener))
    })
}

fn listener_count(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const METHOD: &str = "EventBus.listenerCount";
    require_args(METHOD, 1, args.len())?;
    let signal = require_str_arg(METHOD, args, 0)?;
    with_resource(ctx, METHOD, |table: &mut ListenerTable| {
        len_to_value(table.count(signal))
    })
}

fn signals(ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const METHOD: &str = "EventBus.signals";
    require_args(METHOD, 0, args.len())?;
    with_resource(ctx, METHOD, |table: &mut ListenerTable| {
        let names = table.signal_names().into_iter().map(Value::string);
        Value::array(names.collect())
    })
}

fn event_bus_arg(role: &str, value: &Value) -> Result<Instance, EvalError> {
    match value {
        Value::Instance(instance) if instance.native_is::<ListenerTable>() => Ok(instance.clone()),
        Value::Instance(instance) => Err(type_mismatch(
            &format!("connect {role}"),
            CLASS,
            instance.class().name(),
        )),
        other => Err(type_mismatch(
            &format!("connect {role}"),
            CLASS,
            other.type_name(),
        )),
    }
}

/// `connect(sender, signal, receiver, slot)`.
fn connect(_ctx: &CallContext<'_>, args: &[Value]) -> EvalResult {
    const FUNCTION: &str = "connect";
    require_args(FUNCTION, 4, args.len())?;
    let sender = event_bus_arg("sender", &args[0])?;
    let signal = require_str_arg(FUNCTION, args, 1)?;
    event_bus_arg("receiver", &args[2])?;
    let receiver = args[2].clone();

    let listener = match &args[3] {
        Value::Str(slot) => bound_slot(receiver, slot)?,
        Value::Callable(callable) => callable.clone(),
        other => return Err(type_mismatch(
            FUNCTION,
            "method name or function",
            other.type_name(),
        )),
    };
    tracing::debug!(signal, slot = listener.name(), "connected");
    sender.with_native(FUNCTION, |table: &mut ListenerTable| {
        table.add(signal, listener)
    })?;
    Ok(Value::Null)
}

/// Resolve `slot` on `receiver` now and bind every later call to it.
fn bound_slot(receiver: Value, slot: &str) -> Result<Callable, EvalError> {
    let method = resolve_method(&receiver, slot)?;
    Ok(Callable::native(format!("{slot} (connected)"), move |ctx, args| {
        ctx.invoke(&method, args, Some(&receiver))
    }))
}
