//! Room configuration.

use serde::{Deserialize, Serialize};

/// Limits applied to every room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Maximum participants per room. The next distinct join is rejected
    /// with [`RoomError::RoomFull`](crate::RoomError::RoomFull).
    pub max_participants: usize,

    /// Longest countdown a host may start, in seconds. Longer requests
    /// are clamped to this.
    pub max_timer_secs: u64,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            max_participants: Self::DEFAULT_MAX_PARTICIPANTS,
            max_timer_secs: 3600,
        }
    }
}

impl RoomConfig {
    /// Capacity of a planning-poker table.
    pub const DEFAULT_MAX_PARTICIPANTS: usize = 12;

    /// Fixes out-of-range values so the config is safe to use.
    ///
    /// A room must hold at least one participant (otherwise creating it
    /// for the first join would leave an empty room behind) and a timer
    /// must be allowed to run for at least a second.
    pub fn validated(mut self) -> Self {
        if self.max_participants == 0 {
            tracing::warn!("max_participants is 0, raising to 1");
            self.max_participants = 1;
        }
        if self.max_timer_secs == 0 {
            tracing::warn!("max_timer_secs is 0, raising to 1");
            self.max_timer_secs = 1;
        }
        self
    }
}
