use super::Value;
use crate::evaluator::EvalError;
use core::fmt;
use ecow::EcoString;
use hashbrown::HashMap;
use std::sync::Arc;

/// An opaque host object exposing named member functions.
///
/// Objects are reached either through a name registered in an
/// [`ObjectRegistry`] or as a value returned by the host, and are invoked
/// with member-call syntax: `shape->extrude(2)`.
pub trait FunctionalObject: fmt::Debug + Send + Sync {
    /// Kind of the object, shown when it is printed or concatenated.
    fn type_name(&self) -> &str;

    /// Invokes the member function `name`.
    fn call(&self, name: &str, args: &[Value]) -> Result<Value, EvalError>;
}

/// Named functional objects visible to every formula evaluated with this
/// registry.
///
/// A bare word that names a registered object evaluates to a handle to it,
/// before the host evaluator is consulted.
#[derive(Debug, Clone, Default)]
pub struct ObjectRegistry {
    objects: HashMap<EcoString, Arc<dyn FunctionalObject>>,
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `object` under `name`, returning the object it replaces.
    pub fn register(
        &mut self,
        name: impl Into<EcoString>,
        object: Arc<dyn FunctionalObject>,
    ) -> Option<Arc<dyn FunctionalObject>> {
        self.objects.insert(name.into(), object)
    }

    pub fn unregister(&mut self, name: &str) -> Option<Arc<dyn FunctionalObject>> {
        self.objects.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn FunctionalObject>> {
        self.objects.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.objects.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.objects.keys().map(|name| name.as_str())
    }
}
