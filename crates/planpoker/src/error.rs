//! Unified error type for the planpoker server.

use planpoker_protocol::ProtocolError;
use planpoker_room::RoomError;
use planpoker_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attributes let `?` convert sub-crate errors directly.
#[derive(Debug, thiserror::Error)]
pub enum PlanPokerError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (full, coordinator gone).
    #[error(transparent)]
    Room(#[from] RoomError),
}
