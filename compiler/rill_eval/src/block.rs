//! Closure-backed function bodies.
//!
//! The runtime core never parses syntax; an embedding evaluator supplies
//! bodies through [`Block`]. `FnBlock` adapts a Rust closure to that
//! boundary, which is how hosts define small script-level functions and how
//! the tests drive the interpreter without a parser.

use std::fmt;
use std::rc::Rc;

use rill_value::{Block, Callable, ControlAction, Environment, Invoker, ScriptFunction};

type BlockBody = dyn Fn(&dyn Invoker, &Environment) -> Result<(), ControlAction>;

/// A [`Block`] whose statements are a Rust closure.
pub struct FnBlock {
    label: String,
    body: Box<BlockBody>,
}

impl FnBlock {
    pub fn new(
        label: impl Into<String>,
        body: impl Fn(&dyn Invoker, &Environment) -> Result<(), ControlAction> + 'static,
    ) -> Self {
        FnBlock {
            label: label.into(),
            body: Box::new(body),
        }
    }
}

impl Block for FnBlock {
    fn execute(&self, invoker: &dyn Invoker, env: &Environment) -> Result<(), ControlAction> {
        (self.body)(invoker, env)
    }
}

impl fmt::Debug for FnBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<block {}>", self.label)
    }
}

/// An interpreted function with fixed parameters and a closure body.
pub fn script_function(
    name: &str,
    params: &[&str],
    closure: &Environment,
    body: impl Fn(&dyn Invoker, &Environment) -> Result<(), ControlAction> + 'static,
) -> Callable {
    Callable::script(ScriptFunction::new(
        name,
        params.iter().map(ToString::to_string).collect(),
        closure.clone(),
        Rc::new(FnBlock::new(name, body)),
    ))
}
