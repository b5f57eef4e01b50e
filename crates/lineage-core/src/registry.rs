//! Named-class registry.
//!
//! Classes are anonymous handles; programs that want to resolve them by
//! name (configuration, scripting surfaces, debugging) register them
//! here. The name index is last-writer-wins, and lookups hand out
//! cheap class clones.

use dashmap::DashMap;

use crate::class::Class;

/// A concurrent name index over class descriptors
#[derive(Debug, Default)]
pub struct Registry {
    classes: DashMap<String, Class>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class under a name, returning the class it displaced
    /// if the name was already taken.
    pub fn register(&self, name: impl Into<String>, class: &Class) -> Option<Class> {
        self.classes.insert(name.into(), class.clone())
    }

    pub fn find(&self, name: &str) -> Option<Class> {
        self.classes.get(name).map(|entry| entry.value().clone())
    }

    pub fn remove(&self, name: &str) -> Option<Class> {
        self.classes.remove(name).map(|(_, class)| class)
    }

    pub fn names(&self) -> Vec<String> {
        self.classes.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
