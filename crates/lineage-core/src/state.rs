//! Per-instance private state.
//!
//! A producer-backed class level can give each instance its own private
//! record: the producer constructs a fresh [`StateCell`] per
//! instantiation and returns it in the level's blueprint. The factory
//! stamps the cell onto that level's methods, which reach it through
//! [`Call::state`](crate::Call::state) — the record is never part of the
//! member table, so it is invisible to member copying, snapshots, and
//! other levels.

use std::{any::Any, fmt, sync::Arc};

use parking_lot::RwLock;

use crate::{ClassError, Result};

/// A shared handle to one instance's private record for one class level.
///
/// Access is lock-scoped and typed: the closure passed to [`with`] or
/// [`with_mut`] sees the record as the concrete type it was created
/// with, and asking for any other type is an error rather than a panic.
///
/// [`with`]: StateCell::with
/// [`with_mut`]: StateCell::with_mut
#[derive(Clone)]
pub struct StateCell {
    inner: Arc<RwLock<Box<dyn Any + Send + Sync>>>,
}

impl StateCell {
    pub fn new<T: Any + Send + Sync>(record: T) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Box::new(record))),
        }
    }

    /// Read the record. Holds a read lock for the closure's duration.
    pub fn with<T: Any, R>(&self, f: impl FnOnce(&T) -> R) -> Result<R> {
        let guard = self.inner.read();
        let record = guard.downcast_ref::<T>().ok_or(ClassError::StateType {
            expected: std::any::type_name::<T>(),
        })?;
        Ok(f(record))
    }

    /// Mutate the record. Holds a write lock for the closure's duration.
    pub fn with_mut<T: Any, R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R> {
        let mut guard = self.inner.write();
        let record = guard.downcast_mut::<T>().ok_or(ClassError::StateType {
            expected: std::any::type_name::<T>(),
        })?;
        Ok(f(record))
    }
}

impl fmt::Debug for StateCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StateCell")
    }
}
