//! Package registry: lazily-initialized namespaces of exported bindings.
//!
//! Each entry holds a binding table and an initializer that runs at most
//! once, on first request, with the (possibly pre-populated) table to fill.
//! An initializer may request other packages. A package that requests
//! itself while its initializer is running fails with a `NameError`
//! instead of running the initializer again.
//!
//! # Threading
//!
//! Values are reference-counted with `Rc`, so the table lives in
//! thread-local storage: one registry per evaluation thread, created with
//! the built-in packages on first access. Embeddings that evaluate on
//! several threads get independent registries.

use std::cell::RefCell;

use rustc_hash::FxHashMap;

use rill_value::{package_initializing, package_not_found, EvalError, ObjectMap, Value};

use crate::{arrays, collections, events, signals};

/// Package whose initializer re-exports every other built-in package.
pub const PRELUDE: &str = "prelude";

/// Built-in packages re-exported by the prelude, in installation order.
pub const BUILTIN_PACKAGES: &[&str] = &[
    collections::PACKAGE,
    events::PACKAGE,
    signals::PACKAGE,
    arrays::PACKAGE,
];

/// Fills a package's binding table.
pub type PackageInit = Box<dyn FnOnce(&mut ObjectMap) -> Result<(), EvalError>>;

enum PackageState {
    Uninit(PackageInit),
    Initializing,
    Ready,
    /// The initializer failed; it is not run again.
    Failed(EvalError),
}

struct PackageEntry {
    bindings: ObjectMap,
    state: PackageState,
}

#[derive(Default)]
struct Registry {
    packages: FxHashMap<String, PackageEntry>,
}

impl Registry {
    fn with_builtins() -> Self {
        let mut registry = Registry::default();
        registry.register(collections::PACKAGE, Box::new(collections::init_package));
        registry.register(events::PACKAGE, Box::new(events::init_package));
        registry.register(signals::PACKAGE, Box::new(signals::init_package));
        registry.register(arrays::PACKAGE, Box::new(arrays::init_package));
        registry.register(PRELUDE, Box::new(init_prelude));
        registry
    }

    fn register(&mut self, name: &str, init: PackageInit) {
        let entry = self
            .packages
            .entry(name.to_string())
            .or_insert_with(|| PackageEntry {
                bindings: ObjectMap::new(),
                state: PackageState::Ready,
            });
        entry.state = PackageState::Uninit(init);
    }
}

thread_local! {
    static REGISTRY: RefCell<Registry> = RefCell::new(Registry::with_builtins());
}

/// What `ensure_package` does once the registry borrow is released.
enum Step {
    Done(ObjectMap),
    Run(PackageInit, ObjectMap),
}

/// Register (or replace) the initializer for `name`.
///
/// Bindings already inserted through [`register_package_symbol`] are kept
/// and handed to the initializer.
pub fn register_package(
    name: &str,
    init: impl FnOnce(&mut ObjectMap) -> Result<(), EvalError> + 'static,
) {
    REGISTRY.with(|registry| registry.borrow_mut().register(name, Box::new(init)));
}

/// Insert a binding directly into a package's table, outside lazy init.
///
/// Creates an already-initialized package when `pkg` is unknown.
pub fn register_package_symbol(pkg: &str, name: impl Into<String>, value: Value) {
    REGISTRY.with(|registry| {
        registry
            .borrow_mut()
            .packages
            .entry(pkg.to_string())
            .or_insert_with(|| PackageEntry {
                bindings: ObjectMap::new(),
                state: PackageState::Ready,
            })
            .bindings
            .insert(name.into(), value);
    });
}

/// Whether an entry exists for `name`.
pub fn is_registered(name: &str) -> bool {
    REGISTRY.with(|registry| registry.borrow().packages.contains_key(name))
}

/// Return the bindings of `name`, running its initializer on first access.
pub fn ensure_package(name: &str) -> Result<ObjectMap, EvalError> {
    let step = REGISTRY.with(|registry| {
        let mut registry = registry.borrow_mut();
        let entry = registry
            .packages
            .get_mut(name)
            .ok_or_else(|| package_not_found(name))?;
        match std::mem::replace(&mut entry.state, PackageState::Initializing) {
            PackageState::Uninit(init) => Ok(Step::Run(init, std::mem::take(&mut entry.bindings))),
            PackageState::Initializing => Err(package_initializing(name)),
            PackageState::Ready => {
                entry.state = PackageState::Ready;
                Ok(Step::Done(entry.bindings.clone()))
            }
            PackageState::Failed(err) => {
                entry.state = PackageState::Failed(err.clone());
                Err(err)
            }
        }
    })?;

    let (init, mut bindings) = match step {
        Step::Done(bindings) => return Ok(bindings),
        Step::Run(init, bindings) => (init, bindings),
    };

    tracing::debug!(package = name, "initializing package");
    // The registry is not borrowed here, so the initializer may request
    // other packages.
    let outcome = init(&mut bindings);

    REGISTRY.with(|registry| {
        let mut registry = registry.borrow_mut();
        let Some(entry) = registry.packages.get_mut(name) else {
            return outcome.map(|()| bindings);
        };
        match outcome {
            Ok(()) => {
                // Symbols registered directly while the initializer ran.
                for (key, value) in std::mem::take(&mut entry.bindings).iter() {
                    bindings.insert(key.clone(), value.clone());
                }
                entry.bindings = bindings.clone();
                entry.state = PackageState::Ready;
                tracing::debug!(package = name, bindings = bindings.len(), "package ready");
                Ok(bindings)
            }
            Err(err) => {
                tracing::debug!(package = name, error = %err, "package initializer failed");
                entry.state = PackageState::Failed(err.clone());
                Err(err)
            }
        }
    })
}

/// The first package to export a name wins, so `map` in the prelude is the
/// collections constructor rather than the array transform.
fn init_prelude(bindings: &mut ObjectMap) -> Result<(), EvalError> {
    for package in BUILTIN_PACKAGES {
        for (name, value) in ensure_package(package)?.iter() {
            if !bindings.contains_key(name) {
                bindings.insert(name.clone(), value.clone());
            }
        }
    }
    Ok(())
}
