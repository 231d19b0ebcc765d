//! One-shot, cancellable timers for planpoker.
//!
//! A room's countdown is the only thing in the system that re-enters the
//! room state machine on its own. This crate provides the pieces for that:
//!
//! - [`Scheduler`]: "deliver this payload back to me after `delay`",
//!   returning a [`CancelHandle`].
//! - [`TokioScheduler`]: one sleeping task per timer, payloads delivered
//!   on an unbounded channel.
//! - [`ManualScheduler`]: a virtual clock for deterministic tests.
//! - [`TimerToken`] / [`TokenIssuer`]: generation counter for stale
//!   expiry detection.
//!
//! # Cancellation is best-effort, tokens are not
//!
//! [`Scheduler::cancel`] aborts the sleeping task, but by the time it runs
//! the payload may already sit in the owner's queue. Owners therefore
//! stamp every scheduled payload with a fresh [`TimerToken`] and, when the
//! payload comes back, apply it only if the token still matches the one
//! they stored:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* start/stop bump the token */ }
//!         Some(expiry) = timer_rx.recv() => {
//!             if expiry.token == room.current_token { /* reveal */ }
//!         }
//!     }
//! }
//! ```

mod manual;
mod tokio_scheduler;

pub use manual::ManualScheduler;
pub use tokio_scheduler::TokioScheduler;

use std::fmt;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Handles and tokens
// ---------------------------------------------------------------------------

/// Identifies one scheduled timer so it can be cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CancelHandle(u64);

impl CancelHandle {
    /// Creates a handle from a raw value.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CancelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer-{}", self.0)
    }
}

/// Generation of a countdown.
///
/// Every start issues a new token; a payload carrying an older token is
/// stale and must be ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerToken(u64);

impl TimerToken {
    /// Returns the raw generation number.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen-{}", self.0)
    }
}

/// Hands out strictly increasing [`TimerToken`]s, starting at 1.
#[derive(Debug, Default)]
pub struct TokenIssuer {
    last: u64,
}

impl TokenIssuer {
    /// Creates an issuer whose first token is 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues the next token.
    pub fn issue(&mut self) -> TimerToken {
        self.last += 1;
        TimerToken(self.last)
    }
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Schedules a payload to be handed back after a delay.
///
/// How the payload comes back depends on the implementation:
/// [`TokioScheduler`] sends it on a channel, [`ManualScheduler`] returns it
/// from [`ManualScheduler::advance`].
pub trait Scheduler<T>: Send + 'static {
    /// Schedules `payload` to be delivered once `delay` has elapsed.
    fn schedule(&mut self, delay: Duration, payload: T) -> CancelHandle;

    /// Cancels a scheduled payload. Unknown or already-fired handles are
    /// ignored. A payload that was already delivered is not recalled.
    fn cancel(&mut self, handle: CancelHandle);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_issuer_is_strictly_increasing() {
        let mut issuer = TokenIssuer::new();
        let a = issuer.issue();
        let b = issuer.issue();
        let c = issuer.issue();
        assert_eq!(a.into_inner(), 1);
        assert!(a < b && b < c);
    }

    #[test]
    fn test_display() {
        assert_eq!(CancelHandle::new(3).to_string(), "timer-3");
        assert_eq!(TokenIssuer::new().issue().to_string(), "gen-1");
    }
}
