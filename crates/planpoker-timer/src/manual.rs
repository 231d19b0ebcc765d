//! Deterministic scheduler driven by a virtual clock.

use std::time::Duration;

use crate::{CancelHandle, Scheduler};

struct Pending<T> {
    handle: CancelHandle,
    due: Duration,
    payload: T,
}

/// A [`Scheduler`] that only moves when told to.
///
/// Time starts at zero and advances through [`advance`](Self::advance),
/// which returns every payload that became due, earliest first. Nothing
/// runs in the background, so tests can interleave "timer fired" with any
/// other operation at exactly the point they want.
pub struct ManualScheduler<T> {
    now: Duration,
    next_handle: u64,
    pending: Vec<Pending<T>>,
}

impl<T> ManualScheduler<T> {
    /// Creates a scheduler at virtual time zero.
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_handle: 1,
            pending: Vec::new(),
        }
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of scheduled, not yet delivered, payloads.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Moves the clock forward and returns the payloads that fell due,
    /// ordered by deadline (ties by scheduling order).
    pub fn advance(&mut self, by: Duration) -> Vec<T> {
        self.now += by;
        let now = self.now;

        let mut due = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].due <= now {
                due.push(self.pending.swap_remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by_key(|p| (p.due, p.handle));
        due.into_iter().map(|p| p.payload).collect()
    }
}

impl<T> Default for ManualScheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> Scheduler<T> for ManualScheduler<T> {
    fn schedule(&mut self, delay: Duration, payload: T) -> CancelHandle {
        let handle = CancelHandle::new(self.next_handle);
        self.next_handle += 1;
        self.pending.push(Pending {
            handle,
            due: self.now + delay,
            payload,
        });
        handle
    }

    fn cancel(&mut self, handle: CancelHandle) {
        self.pending.retain(|p| p.handle != handle);
    }
}
