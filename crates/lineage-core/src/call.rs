//! The method invocation context.
//!
//! Everything an executing method can reach is threaded through [`Call`]
//! explicitly: the instance it was dispatched on, the argument slice,
//! the parent-level implementation it overrode, and its defining level's
//! private state. The parent reference is plain data captured at member
//! composition time — there is no mutable slot to save and restore, so
//! nested, re-entrant, and sibling calls cannot observe each other.

use std::{any::Any, sync::Arc};

use crate::{instance::Instance, state::StateCell, value::Method, ClassError, Result, Value};

/// Context handed to a method implementation for one invocation
pub struct Call<'a> {
    this: &'a mut Instance,
    args: &'a [Value],
    name: Arc<str>,
    over: Option<Method>,
    state: Option<StateCell>,
}

impl<'a> Call<'a> {
    pub(crate) fn new(
        this: &'a mut Instance,
        args: &'a [Value],
        name: Arc<str>,
        over: Option<Method>,
        state: Option<StateCell>,
    ) -> Self {
        Self {
            this,
            args,
            name,
            over,
            state,
        }
    }

    /// The instance the method was dispatched on
    pub fn this(&mut self) -> &mut Instance {
        self.this
    }

    /// Name of the executing method
    pub fn method_name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[Value] {
        self.args
    }

    /// Argument by position. Missing arguments read as [`Value::Null`];
    /// arity is never enforced.
    pub fn arg(&self, index: usize) -> Value {
        self.args.get(index).cloned().unwrap_or(Value::Null)
    }

    /// Whether some ancestor level defines this method too
    pub fn has_parent(&self) -> bool {
        self.over.is_some()
    }

    /// Invoke the implementation this method overrode — the one exactly
    /// one level up, which in turn sees the level above it.
    pub fn parent(&mut self, args: &[Value]) -> Result<Value> {
        match self.over.clone() {
            Some(method) => method.invoke(self.this, args),
            None => Err(ClassError::NoParentMethod {
                method: self.name.to_string(),
            }),
        }
    }

    /// Read the defining level's private record
    pub fn state<T: Any, R>(&self, f: impl FnOnce(&T) -> R) -> Result<R> {
        match &self.state {
            Some(cell) => cell.with(f),
            None => Err(ClassError::MissingState {
                method: self.name.to_string(),
            }),
        }
    }

    /// Mutate the defining level's private record
    pub fn state_mut<T: Any, R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R> {
        match &self.state {
            Some(cell) => cell.with_mut(f),
            None => Err(ClassError::MissingState {
                method: self.name.to_string(),
            }),
        }
    }
}
