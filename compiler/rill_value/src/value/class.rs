//! Classes, instances and owned native resources.
//!
//! # Native Resource Lifetime
//!
//! An instance of a native class owns at most one host resource (the hash
//! index behind a Map, the heap behind a PriorityQueue, ...). The resource
//! is attached by the class constructor together with an optional
//! destructor. When the last reference to the instance is released the
//! destructor runs exactly once, before the instance's memory is freed, so
//! a resource that itself owns values releases them while the instance is
//! still intact. No API hands the raw resource out: access is scoped to a
//! closure through [`Instance::with_native`].

use rustc_hash::FxHashMap;
use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::errors::{invalid_operation, type_mismatch, EvalError};

use super::{Callable, ObjectMap, Value};

/// A class: a name and a method table.
pub struct ClassDescriptor {
    name: String,
    methods: RefCell<FxHashMap<String, Callable>>,
    native: bool,
}

impl ClassDescriptor {
    /// A class defined by script code.
    pub fn new(name: impl Into<String>) -> Self {
        ClassDescriptor {
            name: name.into(),
            methods: RefCell::new(FxHashMap::default()),
            native: false,
        }
    }

    /// A class implemented by the host.
    pub fn new_native(name: impl Into<String>) -> Self {
        ClassDescriptor {
            native: true,
            ..ClassDescriptor::new(name)
        }
    }

    /// Builder-style method registration.
    #[must_use]
    pub fn with_method(self, name: impl Into<String>, method: Callable) -> Self {
        self.methods.borrow_mut().insert(name.into(), method);
        self
    }

    /// Install or replace a method.
    pub fn define_method(&self, name: impl Into<String>, method: Callable) {
        self.methods.borrow_mut().insert(name.into(), method);
    }

    /// Look up a method in this class's own table.
    pub fn method(&self, name: &str) -> Option<Callable> {
        self.methods.borrow().get(name).cloned()
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.borrow().contains_key(name)
    }

    /// Method names, sorted.
    pub fn method_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.methods.borrow().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn is_native(&self) -> bool {
        self.native
    }
}

impl fmt::Debug for ClassDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDescriptor")
            .field("name", &self.name)
            .field("methods", &self.method_names())
            .field("native", &self.native)
            .finish()
    }
}

type Destructor = Box<dyn FnOnce(Box<dyn Any>)>;

/// Owned host resource plus the hook that tears it down.
struct NativeSlot {
    resource: Option<Box<dyn Any>>,
    destructor: Option<Destructor>,
}

impl Drop for NativeSlot {
    fn drop(&mut self) {
        if let Some(resource) = self.resource.take() {
            match self.destructor.take() {
                Some(destructor) => destructor(resource),
                None => drop(resource),
            }
        }
    }
}

struct InstanceData {
    // Declared first so the resource is torn down before the fields.
    native: RefCell<Option<NativeSlot>>,
    class: Rc<ClassDescriptor>,
    fields: RefCell<ObjectMap>,
}

/// A class-typed object, shared by reference.
#[derive(Clone)]
pub struct Instance(Rc<InstanceData>);

impl Instance {
    /// Allocate a fresh instance with no fields and no native resource.
    pub fn new(class: Rc<ClassDescriptor>) -> Self {
        Instance(Rc::new(InstanceData {
            native: RefCell::new(None),
            class,
            fields: RefCell::new(ObjectMap::new()),
        }))
    }

    pub fn class(&self) -> &Rc<ClassDescriptor> {
        &self.0.class
    }

    /// Whether this instance's class is exactly `class`.
    pub fn is_instance_of(&self, class: &Rc<ClassDescriptor>) -> bool {
        Rc::ptr_eq(&self.0.class, class)
    }

    pub fn get_field(&self, name: &str) -> Option<Value> {
        self.0.fields.borrow().get(name).cloned()
    }

    pub fn set_field(&self, name: impl Into<String>, value: Value) {
        self.0.fields.borrow_mut().insert(name.into(), value);
    }

    pub fn field_names(&self) -> Vec<String> {
        self.0.fields.borrow().keys().cloned().collect()
    }

    /// Attach the native resource and its destructor.
    ///
    /// Fails if a resource is already attached: a resource is released
    /// exactly once, so it is never replaced behind the owner's back.
    pub fn attach_native<T: Any>(
        &self,
        resource: T,
        destructor: Option<Box<dyn FnOnce(T)>>,
    ) -> Result<(), EvalError> {
        let mut slot = self.0.native.borrow_mut();
        if slot.is_some() {
            return Err(invalid_operation(format!(
                "{} instance already owns a native resource",
                self.0.class.name()
            )));
        }
        let destructor = destructor.map(|destroy| -> Destructor {
            Box::new(move |resource: Box<dyn Any>| {
                if let Ok(resource) = resource.downcast::<T>() {
                    destroy(*resource);
                }
            })
        });
        *slot = Some(NativeSlot {
            resource: Some(Box::new(resource)),
            destructor,
        });
        Ok(())
    }

    pub fn has_native(&self) -> bool {
        self.0.native.borrow().is_some()
    }

    /// Whether the attached resource has type `T`.
    pub fn native_is<T: Any>(&self) -> bool {
        self.0
            .native
            .borrow()
            .as_ref()
            .and_then(|slot| slot.resource.as_ref())
            .is_some_and(|resource| resource.is::<T>())
    }

    /// Run `f` with mutable access to the typed native resource.
    ///
    /// The resource stays borrowed for the duration of `f`; `f` must not
    /// call back into script code.
    pub fn with_native<T: Any, R>(
        &self,
        operation: &str,
        f: impl FnOnce(&mut T) -> R,
    ) -> Result<R, EvalError> {
        let mut slot = self.0.native.borrow_mut();
        let resource = slot
            .as_mut()
            .and_then(|slot| slot.resource.as_mut())
            .and_then(|resource| resource.downcast_mut::<T>());
        match resource {
            Some(resource) => Ok(f(resource)),
            None => Err(type_mismatch(
                operation,
                std::any::type_name::<T>().rsplit("::").next().unwrap_or("resource"),
                self.0.class.name(),
            )),
        }
    }

    /// Identity comparison.
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }

    /// Number of live references, for lifetime diagnostics.
    pub fn ref_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("class", &self.0.class.name())
            .field("fields", &self.field_names())
            .field("native", &self.has_native())
            .finish()
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
