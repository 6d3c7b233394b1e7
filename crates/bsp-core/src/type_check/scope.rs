//! Name resolution for the named-variable entry point

use crate::value::{StructArray, Value};
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

/// Resolves identifiers to values in the caller's context
pub trait Scope {
    fn lookup(&self, name: &str) -> Option<&Value>;
}

impl<S: BuildHasher> Scope for HashMap<String, Value, S> {
    fn lookup(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

impl Scope for BTreeMap<String, Value> {
    fn lookup(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

/// Fields of the first record
impl Scope for StructArray {
    fn lookup(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

impl<T: Scope + ?Sized> Scope for &T {
    fn lookup(&self, name: &str) -> Option<&Value> {
        (**self).lookup(name)
    }
}
