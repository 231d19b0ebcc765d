//! Coordinator actor: a single Tokio task that owns every room.
//!
//! Connection handlers never touch room state directly. They hold a
//! cloneable [`CoordinatorHandle`] and send it commands; the actor applies
//! them one at a time together with timer expiries, so no two operations
//! on the same room can ever interleave.

use planpoker_protocol::{ParticipantId, RawVote, RoomId};
use planpoker_timer::TokioScheduler;
use tokio::sync::{mpsc, oneshot};

use crate::{EventSender, Fanout, Room, RoomConfig, RoomCoordinator, RoomError, TimerExpiry};

/// Default capacity of the command channel.
pub const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Commands sent to the coordinator actor through its channel.
///
/// Variants carrying a `reply` are request/response; the rest are
/// fire-and-forget, matching the broadcast-only contract of those
/// operations.
enum Command {
    Join {
        room_id: RoomId,
        participant_id: ParticipantId,
        name: String,
        subscriber: EventSender,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },
    Leave {
        room_id: RoomId,
        participant_id: ParticipantId,
        reply: oneshot::Sender<()>,
    },
    Vote {
        room_id: RoomId,
        participant_id: ParticipantId,
        value: RawVote,
    },
    Reset {
        room_id: RoomId,
    },
    StartTimer {
        room_id: RoomId,
        duration_secs: u64,
    },
    StopTimer {
        room_id: RoomId,
    },
    GetRoom {
        room_id: RoomId,
        reply: oneshot::Sender<Option<Room>>,
    },
    RoomCount {
        reply: oneshot::Sender<usize>,
    },
    Shutdown,
}

/// Handle to the running coordinator. Cheap to clone.
#[derive(Clone)]
pub struct CoordinatorHandle {
    sender: mpsc::Sender<Command>,
}

impl CoordinatorHandle {
    /// Joins a room and subscribes `subscriber` to its broadcasts.
    ///
    /// The subscription is in place before the join is applied, so the
    /// joiner receives the resulting `room_update` too. On rejection it
    /// is removed again, unless the participant was already a member.
    pub async fn join(
        &self,
        room_id: RoomId,
        participant_id: ParticipantId,
        name: String,
        subscriber: EventSender,
    ) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::Join {
            room_id,
            participant_id,
            name,
            subscriber,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| RoomError::Unavailable)?
    }

    /// Leaves a room and drops the subscription.
    ///
    /// Waits until the leave has been applied, so a subsequent join by the
    /// same connection is ordered after it.
    pub async fn leave(
        &self,
        room_id: RoomId,
        participant_id: ParticipantId,
    ) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::Leave {
            room_id,
            participant_id,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| RoomError::Unavailable)
    }

    pub async fn vote(
        &self,
        room_id: RoomId,
        participant_id: ParticipantId,
        value: RawVote,
    ) -> Result<(), RoomError> {
        self.send(Command::Vote {
            room_id,
            participant_id,
            value,
        })
        .await
    }

    pub async fn reset(&self, room_id: RoomId) -> Result<(), RoomError> {
        self.send(Command::Reset { room_id }).await
    }

    pub async fn start_timer(
        &self,
        room_id: RoomId,
        duration_secs: u64,
    ) -> Result<(), RoomError> {
        self.send(Command::StartTimer {
            room_id,
            duration_secs,
        })
        .await
    }

    pub async fn stop_timer(&self, room_id: RoomId) -> Result<(), RoomError> {
        self.send(Command::StopTimer { room_id }).await
    }

    /// Snapshot of a room, `None` if it doesn't exist.
    pub async fn get_room(&self, room_id: RoomId) -> Result<Option<Room>, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::GetRoom {
            room_id,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| RoomError::Unavailable)
    }

    /// Number of live rooms.
    pub async fn room_count(&self) -> Result<usize, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::RoomCount { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| RoomError::Unavailable)
    }

    /// Stops the actor. Pending countdowns are dropped with it.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.send(Command::Shutdown).await
    }

    async fn send(&self, cmd: Command) -> Result<(), RoomError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| RoomError::Unavailable)
    }
}

type LiveCoordinator = RoomCoordinator<Fanout, TokioScheduler<TimerExpiry>>;

struct CoordinatorActor {
    coordinator: LiveCoordinator,
    commands: mpsc::Receiver<Command>,
    expiries: mpsc::UnboundedReceiver<TimerExpiry>,
}

impl CoordinatorActor {
    async fn run(mut self) {
        tracing::info!(
            max_participants = self.coordinator.config().max_participants,
            max_timer_secs = self.coordinator.config().max_timer_secs,
            "room coordinator started"
        );

        loop {
            tokio::select! {
                cmd = self.commands.recv() => match cmd {
                    Some(Command::Shutdown) => {
                        tracing::info!("room coordinator shutting down");
                        break;
                    }
                    Some(cmd) => self.handle(cmd),
                    // Every handle dropped.
                    None => break,
                },
                Some(expiry) = self.expiries.recv() => {
                    self.coordinator.timer_expire(expiry);
                }
            }
        }

        tracing::info!(rooms = self.coordinator.room_count(), "room coordinator stopped");
    }

    fn handle(&mut self, cmd: Command) {
        match cmd {
            Command::Join {
                room_id,
                participant_id,
                name,
                subscriber,
                reply,
            } => {
                // A member re-joining a full room is rejected but keeps its seat,
                // so it must keep its subscription too.
                let already_member = self
                    .coordinator
                    .get_room(&room_id)
                    .is_some_and(|room| room.contains(&participant_id));
                self.coordinator
                    .broadcaster_mut()
                    .subscribe(&room_id, &participant_id, subscriber);
                let result = self.coordinator.join(&room_id, &participant_id, &name);
                if result.is_err() && !already_member {
                    self.coordinator
                        .broadcaster_mut()
                        .unsubscribe(&room_id, &participant_id);
                }
                let _ = reply.send(result);
            }
            Command::Leave {
                room_id,
                participant_id,
                reply,
            } => {
                self.coordinator
                    .broadcaster_mut()
                    .unsubscribe(&room_id, &participant_id);
                self.coordinator.leave(&room_id, &participant_id);
                let _ = reply.send(());
            }
            Command::Vote {
                room_id,
                participant_id,
                value,
            } => self.coordinator.vote(&room_id, &participant_id, value),
            Command::Reset { room_id } => self.coordinator.reset(&room_id),
            Command::StartTimer {
                room_id,
                duration_secs,
            } => self.coordinator.start_timer(&room_id, duration_secs),
            Command::StopTimer { room_id } => self.coordinator.stop_timer(&room_id),
            Command::GetRoom { room_id, reply } => {
                let _ = reply.send(self.coordinator.get_room(&room_id).cloned());
            }
            Command::RoomCount { reply } => {
                let _ = reply.send(self.coordinator.room_count());
            }
            Command::Shutdown => {}
        }
    }
}

/// Spawns the coordinator actor and returns a handle to it.
///
/// `channel_size` bounds the command queue; senders wait when it is full.
/// Must be called from inside a Tokio runtime.
pub fn spawn_coordinator(config: RoomConfig, channel_size: usize) -> CoordinatorHandle {
    let (tx, rx) = mpsc::channel(channel_size.max(1));
    let (scheduler, expiries) = TokioScheduler::new();

    let actor = CoordinatorActor {
        coordinator: RoomCoordinator::new(config, Fanout::new(), scheduler),
        commands: rx,
        expiries,
    };
    tokio::spawn(actor.run());

    CoordinatorHandle { sender: tx }
}
