//! # planpoker
//!
//! Real-time planning-poker rooms over WebSocket.
//!
//! Clients join a room, cast hidden votes from a fixed deck, and see the
//! cards once everyone has voted or the host's countdown runs out. The
//! server is a thin layer over the room coordinator: each connection gets
//! a participant id, its messages become coordinator commands, and room
//! events stream back as JSON.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use planpoker::prelude::*;
//!
//! # async fn run() -> Result<(), PlanPokerError> {
//! let server = PlanPokerServer::builder()
//!     .bind("0.0.0.0:3001")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::PlanPokerError;
pub use server::{PlanPokerServer, PlanPokerServerBuilder, DEFAULT_IDLE_TIMEOUT};

/// Everything needed to run a server or talk to one.
pub mod prelude {
    pub use crate::{PlanPokerError, PlanPokerServer, PlanPokerServerBuilder};
    pub use planpoker_protocol::{
        ClientMessage, ParticipantId, ParticipantView, RawVote, RoomId, RoomView,
        ServerEvent, TimerView, VoteValue,
    };
    pub use planpoker_room::{CoordinatorHandle, RoomConfig, RoomError};
}
