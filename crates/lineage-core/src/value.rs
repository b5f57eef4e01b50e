//! Dynamic member values.
//!
//! A member of a class level is either plain data or a [`Method`]. Data
//! values are deep-cloned when members are copied onto an instance, so
//! instances never share mutable data through the member table. Methods
//! are cheap shared handles: besides the implementation itself, a method
//! carries the implementation it overrides (filled in during member
//! composition) and the private-state record of its defining level
//! (filled in when the level's blueprint is realized).

use std::{fmt, sync::Arc};

use indexmap::IndexMap;
use serde::ser::{Serialize, Serializer};

use crate::{call::Call, instance::Instance, state::StateCell, Result};

/// Signature of a method implementation.
///
/// Methods receive everything through the [`Call`] context: the instance
/// (`this`), the arguments, the overridden parent-level implementation,
/// and the defining level's private state.
pub type MethodFn = dyn Fn(Call<'_>) -> Result<Value> + Send + Sync;

/// A dynamic member value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(IndexMap<String, Value>),
    Method(Method),
}

impl Value {
    /// Convenience constructor for a method member.
    pub fn method<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Call<'_>) -> Result<Value> + Send + Sync + 'static,
    {
        Value::Method(Method::new(name, f))
    }

    pub fn is_method(&self) -> bool {
        matches!(self, Value::Method(_))
    }

    /// Human-readable type name, used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Method(_) => "method",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::String(s) => write!(f, "{s}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Map(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
            Value::Method(m) => write!(f, "{m:?}"),
        }
    }
}

// Serialization is one-way: snapshots render methods as marker strings
// and are never deserialized back into values.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Float(x) => serializer.serialize_f64(*x),
            Value::String(s) => serializer.serialize_str(s),
            Value::List(items) => serializer.collect_seq(items),
            Value::Map(entries) => serializer.collect_map(entries),
            Value::Method(m) => serializer.serialize_str(&format!("#<method {}>", m.name())),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

/// A callable member.
///
/// The handle is cheap to clone; all copies share one implementation.
/// `over` is the implementation this method shadowed at composition time
/// (one level up, exactly), and `state` is the private record of the
/// level that declared the method. Both are `None` on a freshly declared
/// method and filled in by the class factory.
#[derive(Clone)]
pub struct Method {
    name: Arc<str>,
    imp: Arc<MethodFn>,
    over: Option<Box<Method>>,
    state: Option<StateCell>,
}

impl Method {
    pub fn new<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Call<'_>) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name.into()),
            imp: Arc::new(f),
            over: None,
            state: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Re-bind this method over the implementation it replaces.
    pub(crate) fn bind_over(&self, over: Method) -> Method {
        Method {
            name: self.name.clone(),
            imp: self.imp.clone(),
            over: Some(Box::new(over)),
            state: self.state.clone(),
        }
    }

    /// Attach the defining level's private-state record.
    pub(crate) fn bind_state(&self, state: StateCell) -> Method {
        Method {
            name: self.name.clone(),
            imp: self.imp.clone(),
            over: self.over.clone(),
            state: Some(state),
        }
    }

    /// Run the implementation with `this` bound to `instance`.
    pub(crate) fn invoke(&self, instance: &mut Instance, args: &[Value]) -> Result<Value> {
        let call = Call::new(
            instance,
            args,
            self.name.clone(),
            self.over.as_deref().cloned(),
            self.state.clone(),
        );
        (self.imp)(call)
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<method {}>", self.name)
    }
}

// Two methods are equal when they share an implementation and shadow
// equal implementations. Private state is identity, not value, and is
// ignored here.
impl PartialEq for Method {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.imp, &other.imp) && self.over == other.over
    }
}
