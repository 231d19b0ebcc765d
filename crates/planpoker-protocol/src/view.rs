//! Room snapshots as clients see them.
//!
//! There is exactly one payload shape for every room broadcast
//! (`room_update`, `vote_reveal`, `vote_reset`). The only thing that
//! changes with `revealed` is whether the `vote` fields are present.

use serde::{Deserialize, Serialize};

use crate::{ParticipantId, RoomId, VoteValue};

/// One participant inside a [`RoomView`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantView {
    pub id: ParticipantId,
    pub name: String,
    /// Omitted from the JSON while the room is not revealed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote: Option<VoteValue>,
    /// Whether this participant has voted. Always present, so clients can
    /// show progress without seeing the cards.
    pub has_voted: bool,
    pub is_host: bool,
}

/// The countdown as clients see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerView {
    pub duration_seconds: u64,
    /// Milliseconds since the Unix epoch; absent once the timer stopped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<u64>,
    pub is_active: bool,
}

/// A full room snapshot.
///
/// ```json
/// {
///   "id": "R1",
///   "name": "Room R1",
///   "users": [{ "id": "a1", "name": "Alice", "hasVoted": true, "isHost": true }],
///   "revealed": false,
///   "hostId": "a1",
///   "timer": { "durationSeconds": 30, "startedAt": 1700000000000, "isActive": true },
///   "createdAt": 1700000000000
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomView {
    pub id: RoomId,
    pub name: String,
    pub users: Vec<ParticipantView>,
    pub revealed: bool,
    pub host_id: Option<ParticipantId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer: Option<TimerView>,
    /// Milliseconds since the Unix epoch.
    pub created_at: u64,
}

impl RoomView {
    /// Looks up a participant by id.
    pub fn participant(&self, id: &ParticipantId) -> Option<&ParticipantView> {
        self.users.iter().find(|u| &u.id == id)
    }
}
