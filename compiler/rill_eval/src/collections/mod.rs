//! Native collections: Map, Set, Stack, Deque and PriorityQueue.
//!
//! Each collection is a native class whose constructor attaches a typed
//! store to the fresh instance. Methods are defined once per class and
//! reach the store through the bound receiver, so an instance never holds
//! a closure over itself.
//!
//! Store access is scoped: a method borrows the store, copies out what a
//! callback needs, and releases the borrow before invoking script code.

mod deque;
mod keys_sorted;
mod map;
mod priority_queue;
mod set;
mod stack;

pub use deque::DequeStore;
pub use keys_sorted::keys_sorted;
pub use map::MapStore;
pub use priority_queue::{PriorityStore, QueueOrder};
pub use set::SetStore;
pub use stack::StackStore;

use std::any::Any;
use std::rc::Rc;

use rill_value::{CallContext, Callable, ClassDescriptor, EvalError, Instance, ObjectMap, Value};

use crate::interpreter::construct_with;
use crate::methods::helpers::receiver;

/// Package name.
pub const PACKAGE: &str = "collections";

/// Storage owned by a collection instance.
pub trait Store: Any {
    /// Class name, for diagnostics.
    const CLASS: &'static str;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Attach `store` to `instance`, with a destructor that releases it.
pub fn attach_store<T: Store>(instance: &Instance, store: T) -> Result<(), EvalError> {
    instance.attach_native(
        store,
        Some(Box::new(|store: T| {
            tracing::trace!(
                class = T::CLASS,
                len = store.len(),
                "releasing native store"
            );
            drop(store);
        })),
    )
}

/// Attach `store` to the receiver of a constructor call.
pub(crate) fn attach_to_receiver<T: Store>(
    ctx: &CallContext<'_>,
    method: &str,
    store: T,
) -> Result<(), EvalError> {
    attach_store(&receiver(ctx, method)?, store)
}

/// A plain function that constructs `class`, e.g. `map()` for `Map`.
pub fn constructor_function(name: &str, class: Rc<ClassDescriptor>) -> Callable {
    Callable::native(name, move |ctx, args| {
        construct_with(ctx.invoker(), &class, args)
    })
}

/// Install the collection classes, their constructor functions and
/// `keysSorted`.
pub fn init_package(bindings: &mut ObjectMap) -> Result<(), EvalError> {
    let classes = [
        ("map", map::class()),
        ("set", set::class()),
        ("stack", stack::class()),
        ("deque", deque::class()),
        ("priorityQueue", priority_queue::class()),
    ];
    for (function_name, class) in classes {
        bindings.insert(class.name().to_string(), Value::Class(Rc::clone(&class)));
        bindings.insert(
            function_name.to_string(),
            Value::Callable(constructor_function(function_name, class)),
        );
    }
    bindings.insert(
        "keysSorted".to_string(),
        Value::Callable(Callable::native("keysSorted", keys_sorted)),
    );
    Ok(())
}
