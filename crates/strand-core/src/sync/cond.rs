//! Condition variable bound to its mutex
//!
//! `std::sync::Condvar` must always be used with the same mutex. `Cond` owns
//! both, so the pairing can't be broken, and exposes the bounded-wait /
//! signal / broadcast surface the pipeline threads expect.
//!
//! Prefer the `*_while` variants: they re-check the predicate after every
//! wakeup, which handles spurious wakeups and signals that were sent before
//! the waiter started waiting.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Mutex-protected state plus the condition variable that guards it
pub struct Cond<T> {
    mutex: Mutex<T>,
    cond: Condvar,
}

impl<T> Cond<T> {
    /// Initialize with the protected value
    pub fn new(value: T) -> Self {
        Self {
            mutex: Mutex::new(value),
            cond: Condvar::new(),
        }
    }

    /// Lock the protected state
    ///
    /// A panic while holding the lock does not poison the state for others:
    /// the protected values are plain counters and flags.
    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.mutex.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Wait for one wakeup
    ///
    /// May return spuriously; callers must re-check their condition.
    pub fn wait<'a>(&self, guard: MutexGuard<'a, T>) -> MutexGuard<'a, T> {
        self.cond.wait(guard).unwrap_or_else(PoisonError::into_inner)
    }

    /// Wait for one wakeup with timeout
    ///
    /// Returns false if the timeout expired.
    #[must_use]
    pub fn timed_wait<'a>(
        &self,
        guard: MutexGuard<'a, T>,
        timeout: Duration,
    ) -> (MutexGuard<'a, T>, bool) {
        let (guard, result) = self
            .cond
            .wait_timeout(guard, timeout)
            .unwrap_or_else(PoisonError::into_inner);
        (guard, !result.timed_out())
    }

    /// Block while `condition` holds
    pub fn wait_while<'a, F>(&self, guard: MutexGuard<'a, T>, condition: F) -> MutexGuard<'a, T>
    where
        F: FnMut(&mut T) -> bool,
    {
        self.cond
            .wait_while(guard, condition)
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Block while `condition` holds, for at most `timeout`
    ///
    /// Returns false if the timeout expired with the condition still true.
    #[must_use]
    pub fn timed_wait_while<'a, F>(
        &self,
        guard: MutexGuard<'a, T>,
        timeout: Duration,
        condition: F,
    ) -> (MutexGuard<'a, T>, bool)
    where
        F: FnMut(&mut T) -> bool,
    {
        let (guard, result) = self
            .cond
            .wait_timeout_while(guard, timeout, condition)
            .unwrap_or_else(PoisonError::into_inner);
        (guard, !result.timed_out())
    }

    /// Wake up one pending wait
    pub fn signal(&self) {
        self.cond.notify_one();
    }

    /// Wake up all pending waits
    pub fn broadcast(&self) {
        self.cond.notify_all();
    }
}

impl<T: Default> Default for Cond<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
