//! Class descriptors and the class factory.
//!
//! A [`Class`] is an immutable descriptor: an identity, an optional
//! display name, a parent link fixed at definition time, and the
//! structure contributing this level's own members. Instantiation is
//! split into two operations: [`Class::compose_members`] builds the
//! fully inherited member table without running any constructor, and
//! [`Class::instantiate`] composes and then invokes the resolved
//! `constructor` member with the caller's arguments.

use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use uuid::Uuid;

use crate::{
    instance::Instance,
    members::{copy_members, inherit, Members},
    state::StateCell,
    ClassError, Result, Value,
};

#[cfg(test)]
mod tests;

/// Name of the member invoked with the instantiation arguments
pub const CONSTRUCTOR: &str = "constructor";

/// Class identity - compared by value, allocated per definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassId(pub Uuid);

impl ClassId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The root class uses a well-known id
    pub fn root() -> Self {
        Self(Uuid::from_u128(1))
    }
}

impl Default for ClassId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", &self.0.to_string()[..8])
    }
}

/// Parent link of a class, fixed at definition time
#[derive(Debug, Clone)]
pub enum Ancestry {
    /// The universal ancestor; terminates every chain
    Root,
    /// A class defined with (or defaulted to) a parent
    Child(Class),
}

/// One level's realized contribution: its members, plus the fresh
/// private-state record its methods share for one instance.
#[derive(Debug)]
pub struct Blueprint {
    pub members: Members,
    pub state: Option<StateCell>,
}

impl Blueprint {
    pub fn new(members: Members) -> Self {
        Self {
            members,
            state: None,
        }
    }

    pub fn with_state(members: Members, state: StateCell) -> Self {
        Self {
            members,
            state: Some(state),
        }
    }
}

/// Signature of a structure producer, run once per instantiation
pub type ProducerFn = dyn Fn() -> anyhow::Result<Blueprint> + Send + Sync;

/// How a class level describes its own members
#[derive(Clone)]
pub enum Structure {
    /// A shared template, re-copied for every instance. Copying makes
    /// each instance's own members independent values, but there is no
    /// per-instance private state.
    Template(Members),
    /// A producer invoked freshly on every instantiation, so each
    /// instance gets its own members and its own private record.
    Producer(Arc<ProducerFn>),
}

impl Structure {
    pub fn producer<F>(f: F) -> Self
    where
        F: Fn() -> anyhow::Result<Blueprint> + Send + Sync + 'static,
    {
        Structure::Producer(Arc::new(f))
    }
}

impl From<Members> for Structure {
    fn from(members: Members) -> Self {
        Structure::Template(members)
    }
}

impl fmt::Debug for Structure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Structure::Template(members) => f.debug_tuple("Template").field(members).finish(),
            Structure::Producer(_) => f.write_str("Producer(..)"),
        }
    }
}

#[derive(Debug)]
struct ClassInner {
    id: ClassId,
    name: Option<String>,
    ancestry: Ancestry,
    structure: Structure,
}

/// A class descriptor. Cheap to clone; immutable after definition.
#[derive(Debug, Clone)]
pub struct Class {
    inner: Arc<ClassInner>,
}

impl Class {
    /// The built-in universal ancestor. Contributes no members; every
    /// ancestry chain ends here.
    pub fn root() -> Self {
        Self {
            inner: Arc::new(ClassInner {
                id: ClassId::root(),
                name: Some("root".to_string()),
                ancestry: Ancestry::Root,
                structure: Structure::Template(Members::new()),
            }),
        }
    }

    /// Define a class. No parent means the root class is the parent.
    pub fn define(parent: Option<&Class>, structure: impl Into<Structure>) -> Self {
        Self::builder()
            .maybe_parent(parent)
            .structure(structure.into())
            .build()
    }

    pub fn builder() -> ClassBuilder {
        ClassBuilder::default()
    }

    pub fn id(&self) -> ClassId {
        self.inner.id
    }

    pub fn name(&self) -> Option<&str> {
        self.inner.name.as_deref()
    }

    pub fn ancestry_link(&self) -> &Ancestry {
        &self.inner.ancestry
    }

    /// Direct parent; `None` only for the root class
    pub fn parent(&self) -> Option<&Class> {
        match &self.inner.ancestry {
            Ancestry::Root => None,
            Ancestry::Child(parent) => Some(parent),
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(self.inner.ancestry, Ancestry::Root)
    }

    /// Iterate the ancestry chain from this class up to the root
    pub fn ancestry(&self) -> Ancestors<'_> {
        Ancestors { next: Some(self) }
    }

    /// Whether `candidate` is this class or a transitive ancestor of it.
    /// This is not the reverse query: a parent does not derive from its
    /// children.
    pub fn derives_from(&self, candidate: &Class) -> bool {
        self.ancestry().any(|class| class.id() == candidate.id())
    }

    /// Realize this level's own members: run the producer (or clone the
    /// template) and stamp the level's private record onto its methods.
    fn realize(&self) -> Result<Members> {
        let blueprint = match &self.inner.structure {
            Structure::Template(members) => Blueprint::new(members.clone()),
            Structure::Producer(producer) => producer().map_err(ClassError::Structure)?,
        };
        let Blueprint { mut members, state } = blueprint;
        if let Some(cell) = state {
            for (_, value) in members.iter_mut() {
                if let Value::Method(method) = value {
                    *method = method.bind_state(cell.clone());
                }
            }
        }
        Ok(members)
    }

    /// Build the fully composed member table: every ancestor level's
    /// members first (nearest last), then this level's own members
    /// combined with the [`inherit`] strategy. Runs no constructor.
    pub fn compose_members(&self) -> Result<Members> {
        trace!(class = %self, "composing members");
        let mut table = match self.parent() {
            Some(parent) => parent.compose_members()?,
            None => Members::new(),
        };
        let own = self.realize()?;
        copy_members(&mut table, &own, Some(&inherit));
        Ok(table)
    }

    /// Create an instance: compose the member table, then invoke the
    /// resolved `constructor` member (the nearest level that declares
    /// one) with `args`. Any failure returns `Err` with no instance
    /// observable.
    pub fn instantiate(&self, args: &[Value]) -> Result<Instance> {
        trace!(class = %self, args = args.len(), "instantiating");
        let members = self.compose_members()?;
        let mut instance = Instance::new(self.clone(), members);
        if let Some(constructor) = instance.method(CONSTRUCTOR) {
            constructor.invoke(&mut instance, args)?;
        }
        Ok(instance)
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner.name {
            Some(name) => write!(f, "{name}"),
            None => write!(f, "{}", self.inner.id),
        }
    }
}

// Identity comparison: two descriptors are the same class only if they
// came from the same definition.
impl PartialEq for Class {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Class {}

/// Iterator over a class and its ancestors, ending at the root
pub struct Ancestors<'a> {
    next: Option<&'a Class>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a Class;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = current.parent();
        Some(current)
    }
}

/// Builder for the optional-everything definition form
#[derive(Default)]
pub struct ClassBuilder {
    name: Option<String>,
    parent: Option<Class>,
    structure: Option<Structure>,
}

impl ClassBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn parent(mut self, parent: &Class) -> Self {
        self.parent = Some(parent.clone());
        self
    }

    pub fn maybe_parent(mut self, parent: Option<&Class>) -> Self {
        self.parent = parent.cloned();
        self
    }

    /// This level's members as a shared template
    pub fn members(mut self, members: Members) -> Self {
        self.structure = Some(Structure::Template(members));
        self
    }

    /// This level's members from a per-instantiation producer
    pub fn producer<F>(mut self, f: F) -> Self
    where
        F: Fn() -> anyhow::Result<Blueprint> + Send + Sync + 'static,
    {
        self.structure = Some(Structure::producer(f));
        self
    }

    pub fn structure(mut self, structure: Structure) -> Self {
        self.structure = Some(structure);
        self
    }

    pub fn build(self) -> Class {
        let id = ClassId::new();
        let parent = self.parent.unwrap_or_else(Class::root);
        let parent_label = parent.to_string();
        let class = Class {
            inner: Arc::new(ClassInner {
                id,
                name: self.name,
                ancestry: Ancestry::Child(parent),
                structure: self.structure.unwrap_or_else(|| Members::new().into()),
            }),
        };
        debug!(class = %class, id = %id, parent = %parent_label, "defined class");
        class
    }
}
