//! Instances: composed member tables with a class identity.
//!
//! An instance is created by [`Class::instantiate`] and holds the union
//! of every ancestor level's members with nearer levels winning on name
//! collision. After construction the system never mutates it; member
//! writes through [`Instance::set`] are the caller's business.

use std::fmt;

use tracing::trace;

use crate::{class::Class, members::Members, value::Method, ClassError, Result, Value};

/// One concrete object produced by a class
pub struct Instance {
    class: Class,
    members: Members,
}

impl Instance {
    pub(crate) fn new(class: Class, members: Members) -> Self {
        Self { class, members }
    }

    /// The class that produced this instance
    pub fn class(&self) -> &Class {
        &self.class
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.members.get(name)
    }

    /// Write a member. Overwrites inherited and own members alike;
    /// other instances are unaffected.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.members.insert(name, value)
    }

    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.members.names()
    }

    pub fn members(&self) -> &Members {
        &self.members
    }

    /// Clone out the named method, if the member exists and is callable
    pub(crate) fn method(&self, name: &str) -> Option<Method> {
        match self.members.get(name) {
            Some(Value::Method(method)) => Some(method.clone()),
            _ => None,
        }
    }

    /// Dispatch a method by name.
    pub fn call(&mut self, name: &str, args: &[Value]) -> Result<Value> {
        let method = match self.members.get(name) {
            Some(Value::Method(method)) => method.clone(),
            Some(other) => {
                return Err(ClassError::NotCallable {
                    member: name.to_string(),
                    class: self.class.to_string(),
                    actual: other.type_name(),
                })
            }
            None => {
                return Err(ClassError::UnknownMember {
                    member: name.to_string(),
                    class: self.class.to_string(),
                })
            }
        };
        trace!(class = %self.class, method = name, "dispatch");
        method.invoke(self, args)
    }

    /// Whether this instance's class is `candidate` or derives from it.
    /// True for every transitive ancestor up to the root; false for
    /// unrelated classes and for descendants of this instance's class.
    pub fn instance_of(&self, candidate: &Class) -> bool {
        self.class.derives_from(candidate)
    }

    /// JSON snapshot of the instance's data members. Methods are
    /// omitted at the top level; methods nested inside lists or maps
    /// render as `#<method name>` marker strings.
    pub fn snapshot(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for (name, value) in self.members.iter() {
            if value.is_method() {
                continue;
            }
            if let Ok(json) = serde_json::to_value(value) {
                map.insert(name.clone(), json);
            }
        }
        serde_json::Value::Object(map)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Instance of {} ({} members)",
            self.class,
            self.members.len()
        )
    }
}
