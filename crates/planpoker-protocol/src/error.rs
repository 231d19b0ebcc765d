//! Error types for the protocol layer.

use crate::RawVote;

/// Errors that can occur while encoding or decoding messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, an unknown event name,
    /// missing fields, or wrong field types.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message decoded but breaks a protocol rule.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

/// A vote that is not one of the deck's cards.
///
/// Never sent back to the client: an out-of-deck vote means a client bug,
/// not something the user can act on. The room layer logs it and moves on.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("vote value {0} is not in the deck")]
pub struct InvalidVoteValue(pub RawVote);
