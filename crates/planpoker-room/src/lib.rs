//! Rooms, votes and countdowns for planpoker.
//!
//! All room state lives in one [`RoomCoordinator`], driven by a single
//! actor task. Connection handlers talk to it through a
//! [`CoordinatorHandle`]; room events flow back to them over per-connection
//! channels registered with the [`Fanout`].
//!
//! # Key types
//!
//! - [`RoomCoordinator`]: the state machine (join, leave, vote, reset, timers)
//! - [`CoordinatorHandle`]: send commands to the running actor
//! - [`Broadcaster`]: how the coordinator announces changes
//! - [`RoomConfig`]: participant and timer limits

mod actor;
mod broadcast;
mod config;
mod coordinator;
mod error;
mod room;
mod store;

pub use actor::{spawn_coordinator, CoordinatorHandle, DEFAULT_CHANNEL_SIZE};
pub use broadcast::{Broadcaster, EventSender, Fanout};
pub use config::RoomConfig;
pub use coordinator::{RoomCoordinator, TimerExpiry};
pub use error::RoomError;
pub use room::{Countdown, Participant, Room};
pub use store::RoomStore;
