//! Wire protocol for planpoker.
//!
//! - **Types** ([`RoomId`], [`ParticipantId`], [`VoteValue`], [`RawVote`]):
//!   identities and the deck of cards.
//! - **Views** ([`RoomView`], [`ParticipantView`], [`TimerView`]): the
//!   room snapshot every broadcast carries.
//! - **Messages** ([`ClientMessage`], [`ServerEvent`]): what travels in
//!   each direction.
//! - **Codec** ([`Codec`], [`JsonCodec`]): bytes in, messages out.
//!
//! ```text
//! Transport (bytes) → Protocol (messages) → Room (state machine)
//! ```

mod codec;
mod error;
mod message;
mod types;
mod view;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::{InvalidVoteValue, ProtocolError};
pub use message::{ClientMessage, ServerEvent};
pub use types::{ParticipantId, RawVote, RoomId, VoteValue};
pub use view::{ParticipantView, RoomView, TimerView};
