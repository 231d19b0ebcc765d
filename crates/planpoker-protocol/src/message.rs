//! Client and server messages.
//!
//! Both directions use the same adjacently tagged JSON shape:
//!
//! ```json
//! { "event": "join_room", "data": { "roomId": "R1", "username": "Alice" } }
//! { "event": "room_update", "data": { "id": "R1", ... } }
//! ```
//!
//! `rename_all` names the variants (`JoinRoom` → `"join_room"`),
//! `rename_all_fields` names the fields inside them (`room_id` → `"roomId"`).

use serde::{Deserialize, Serialize};

use crate::{ParticipantId, ProtocolError, RawVote, RoomId, RoomView};

/// Messages a client sends to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum ClientMessage {
    /// Join (or create) a room under a display name.
    JoinRoom { room_id: RoomId, username: String },

    /// Leave a room without closing the connection.
    LeaveRoom { room_id: RoomId },

    /// Cast or change a vote. The value is validated by the room layer.
    Vote { room_id: RoomId, value: RawVote },

    /// Clear every vote and hide the cards again.
    Reset { room_id: RoomId },

    /// Start (or restart) the countdown. `duration` is in seconds.
    StartTimer { room_id: RoomId, duration: u64 },

    /// Stop the countdown without revealing.
    StopTimer { room_id: RoomId },

    /// Keep-alive. Answered with [`ServerEvent::Pong`].
    Ping { client_time: u64 },
}

impl ClientMessage {
    /// The room this message is about, if any.
    pub fn room_id(&self) -> Option<&RoomId> {
        match self {
            Self::JoinRoom { room_id, .. }
            | Self::LeaveRoom { room_id }
            | Self::Vote { room_id, .. }
            | Self::Reset { room_id }
            | Self::StartTimer { room_id, .. }
            | Self::StopTimer { room_id } => Some(room_id),
            Self::Ping { .. } => None,
        }
    }

    /// Checks the rules serde can't express.
    ///
    /// # Errors
    /// [`ProtocolError::InvalidMessage`] for an empty room id.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        match self.room_id() {
            Some(room_id) if room_id.as_str().trim().is_empty() => Err(
                ProtocolError::InvalidMessage("roomId must not be empty".into()),
            ),
            _ => Ok(()),
        }
    }
}

/// Events the server sends to clients.
///
/// The room events (`room_update`, `vote_reveal`, `vote_reset`) are
/// broadcast to everyone subscribed to the room. The rest go to a single
/// connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent {
    /// Sent once per connection: the participant id assigned to it.
    Welcome { participant_id: ParticipantId },

    /// The room changed. Votes are hidden unless the room is revealed.
    RoomUpdate(RoomView),

    /// Every card is face up, either because everyone voted or because
    /// the countdown ran out.
    VoteReveal(RoomView),

    /// The host started a new round.
    VoteReset(RoomView),

    /// Reply to [`ClientMessage::Ping`].
    Pong { client_time: u64, server_time: u64 },

    /// Something went wrong with the sender's last message.
    /// `code` follows HTTP conventions (400 bad request, 409 room full).
    Error { code: u16, message: String },
}

impl ServerEvent {
    /// The event name as it appears in the `event` field.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Welcome { .. } => "welcome",
            Self::RoomUpdate(_) => "room_update",
            Self::VoteReveal(_) => "vote_reveal",
            Self::VoteReset(_) => "vote_reset",
            Self::Pong { .. } => "pong",
            Self::Error { .. } => "error",
        }
    }
}
