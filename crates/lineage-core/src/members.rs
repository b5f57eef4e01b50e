//! Member tables and the member copier.
//!
//! A [`Members`] table is one class level's named contribution: data
//! members and methods, in insertion order. [`copy_members`] copies every
//! member of a source table into a destination table, either by plain
//! overwrite or through a combiner that decides how an existing member
//! and an incoming member of the same name combine. The [`inherit`]
//! combiner is the strategy the class factory uses: method overriding a
//! method keeps a handle to the implementation it shadows, anything else
//! is last-writer-wins.

use indexmap::IndexMap;
use serde::ser::{Serialize, Serializer};

use crate::{call::Call, value::Method, Result, Value};

/// Decides how an incoming member combines with an existing one.
///
/// The combiner is responsible for performing the assignment into the
/// destination table.
pub type Combiner<'a> = dyn Fn(&mut Members, &Members, &str) + 'a;

/// An ordered member table: one class level's own data and methods
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Members {
    entries: IndexMap<String, Value>,
}

impl Members {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a member, returning the displaced value if the name was
    /// already present.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(name.into(), value.into())
    }

    /// Builder-style data member
    pub fn with_data(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Builder-style method member. The member name doubles as the
    /// method's diagnostic name.
    pub fn with_method<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Call<'_>) -> Result<Value> + Send + Sync + 'static,
    {
        let name = name.into();
        let method = Method::new(name.clone(), f);
        self.insert(name, Value::Method(method));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.entries.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.entries.shift_remove(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> indexmap::map::IterMut<'_, String, Value> {
        self.entries.iter_mut()
    }
}

impl<'a> IntoIterator for &'a Members {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<(String, Value)> for Members {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Serialize for Members {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(&self.entries)
    }
}

/// Copy every member of `src` into `dst`, in `src`'s order.
///
/// With a combiner, the combiner performs each assignment; without one,
/// members are plainly overwritten. Returns `dst` for chaining.
pub fn copy_members<'a>(
    dst: &'a mut Members,
    src: &Members,
    combiner: Option<&Combiner>,
) -> &'a mut Members {
    for name in src.entries.keys() {
        match combiner {
            Some(combine) => combine(dst, src, name),
            None => {
                dst.entries.insert(name.clone(), src.entries[name].clone());
            }
        }
    }
    dst
}

/// The override-aware combiner.
///
/// When both the existing (inherited) member and the incoming (own)
/// member are methods, the stored result is the own method re-bound over
/// the inherited one, so the own body can reach it through
/// [`Call::parent`]. In every other pairing the incoming member simply
/// overwrites; data members are never wrapped.
pub fn inherit(dst: &mut Members, src: &Members, name: &str) {
    let own = match src.get(name) {
        Some(value) => value.clone(),
        None => return,
    };
    let combined = match (dst.get(name), own) {
        (Some(Value::Method(inherited)), Value::Method(method)) => {
            Value::Method(method.bind_over(inherited.clone()))
        }
        (_, own) => own,
    };
    dst.insert(name, combined);
}
