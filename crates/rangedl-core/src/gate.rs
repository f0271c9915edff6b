//! Admission gate bounding in-flight range requests.
//!
//! A counting permit pool owned by one download run. A part must hold a
//! permit while its request and write are in flight; the permit returns to
//! the pool when dropped, whether the part succeeded, failed, or panicked.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Capacity-N permit pool shared (via `Arc`) by every part of a run.
#[derive(Debug)]
pub struct AdmissionGate {
    capacity: usize,
    in_use: Mutex<usize>,
    released: Condvar,
}

impl AdmissionGate {
    /// Create a gate admitting at most `capacity` holders at once (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            in_use: Mutex::new(0),
            released: Condvar::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Permits currently held.
    pub fn in_use(&self) -> usize {
        *self.lock()
    }

    /// Block until a permit is free and take it.
    pub fn acquire(&self) -> Permit<'_> {
        let mut in_use = self.lock();
        while *in_use >= self.capacity {
            in_use = self
                .released
                .wait(in_use)
                .unwrap_or_else(PoisonError::into_inner);
        }
        *in_use += 1;
        Permit { gate: self }
    }

    /// Take a permit only if one is free right now.
    pub fn try_acquire(&self) -> Option<Permit<'_>> {
        let mut in_use = self.lock();
        if *in_use >= self.capacity {
            return None;
        }
        *in_use += 1;
        Some(Permit { gate: self })
    }

    fn release(&self) {
        let mut in_use = self.lock();
        *in_use = in_use.saturating_sub(1);
        drop(in_use);
        self.released.notify_one();
    }

    // The count is only touched while locked and never left half-updated.
    fn lock(&self) -> MutexGuard<'_, usize> {
        self.in_use.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// RAII permit; releases its slot when dropped.
#[derive(Debug)]
#[must_use = "dropping a permit releases it immediately"]
pub struct Permit<'a> {
    gate: &'a AdmissionGate,
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        self.gate.release();
    }
}
