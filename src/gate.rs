//! Transaction Gate
//!
//! One process-wide exclusive lock around the storage engine.
//!
//! A "transaction" here is only mutual exclusion for the duration of one
//! command. `commit` and `rollback` both just release the lock: nothing is
//! undone, and any partial write the engine already made stays in place.
//!
//! The guard releases on drop, so early returns, `?` and panics all free
//! the gate.

use std::ops::{Deref, DerefMut};

use parking_lot::{Mutex, MutexGuard};

/// Exclusive access gate shared by every connection
pub struct TransactionGate<T> {
    inner: Mutex<T>,
}

impl<T> TransactionGate<T> {
    pub fn new(resource: T) -> Self {
        Self {
            inner: Mutex::new(resource),
        }
    }

    /// Block until the gate is free, then hold it
    pub fn start_transaction(&self) -> Transaction<'_, T> {
        let guard = self.inner.lock();
        tracing::trace!("transaction started");
        Transaction { guard }
    }

    /// Hold the gate only if nobody else does
    pub fn try_start_transaction(&self) -> Option<Transaction<'_, T>> {
        self.inner.try_lock().map(|guard| Transaction { guard })
    }

    /// Whether some caller currently holds the gate
    pub fn is_held(&self) -> bool {
        self.inner.is_locked()
    }

    /// Take the resource back out
    pub fn into_inner(self) -> T {
        self.inner.into_inner()
    }
}

/// Exclusive access to the gated resource for one command
pub struct Transaction<'a, T> {
    guard: MutexGuard<'a, T>,
}

impl<T> Transaction<'_, T> {
    /// Release the gate after a successful command
    pub fn commit(self) {
        tracing::trace!("transaction committed");
    }

    /// Release the gate after a failed command
    ///
    /// Identical to `commit`: there is no undo.
    pub fn rollback(self) {
        tracing::trace!("transaction rolled back");
    }
}

impl<T> Deref for Transaction<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T> DerefMut for Transaction<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}
