//! Scheduler backed by Tokio tasks.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::trace;

use crate::{CancelHandle, Scheduler};

/// Runs each timer as its own sleeping Tokio task.
///
/// When a timer fires its payload is sent on the channel returned by
/// [`TokioScheduler::new`]. The owner is expected to drain that channel
/// from the same loop that handles its other commands, so a firing timer
/// is just another message in line.
///
/// Must be used from inside a Tokio runtime.
pub struct TokioScheduler<T> {
    next_handle: u64,
    tasks: HashMap<CancelHandle, AbortHandle>,
    tx: mpsc::UnboundedSender<T>,
}

impl<T: Send + 'static> TokioScheduler<T> {
    /// Creates a scheduler and the receiver its payloads arrive on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<T>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            next_handle: 1,
            tasks: HashMap::new(),
            tx,
        };
        (scheduler, rx)
    }

    /// Number of timers that have neither fired nor been cancelled.
    pub fn pending(&self) -> usize {
        self.tasks.values().filter(|t| !t.is_finished()).count()
    }

    /// Forgets tasks that already fired.
    fn prune(&mut self) {
        self.tasks.retain(|_, task| !task.is_finished());
    }
}

impl<T: Send + 'static> Scheduler<T> for TokioScheduler<T> {
    fn schedule(&mut self, delay: Duration, payload: T) -> CancelHandle {
        self.prune();

        let handle = CancelHandle::new(self.next_handle);
        self.next_handle += 1;

        let tx = self.tx.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            trace!(%handle, "timer fired");
            // Receiver gone means the owner shut down; nothing to do.
            let _ = tx.send(payload);
        });
        self.tasks.insert(handle, task.abort_handle());

        trace!(%handle, delay_ms = delay.as_millis() as u64, "timer scheduled");
        handle
    }

    fn cancel(&mut self, handle: CancelHandle) {
        if let Some(task) = self.tasks.remove(&handle) {
            task.abort();
            trace!(%handle, "timer cancelled");
        }
    }
}

impl<T> Drop for TokioScheduler<T> {
    fn drop(&mut self) {
        for task in self.tasks.values() {
            task.abort();
        }
    }
}
