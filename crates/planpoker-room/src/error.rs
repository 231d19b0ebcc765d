//! Error types for the room layer.

use planpoker_protocol::RoomId;

/// Errors a room operation can report back to its caller.
///
/// Deliberately short: an unknown room or participant is not an error
/// (stale references are expected after disconnect races) and an
/// out-of-deck vote is only logged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// The room already holds the maximum number of participants.
    #[error("room {room_id} is full ({capacity} participants max)")]
    RoomFull { room_id: RoomId, capacity: usize },

    /// The coordinator task is gone or its command channel is closed.
    #[error("room coordinator is unavailable")]
    Unavailable,
}
