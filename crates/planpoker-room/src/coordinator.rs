//! The room state machine.
//!
//! [`RoomCoordinator`] applies every operation as one synchronous step on
//! the [`RoomStore`] and then tells its [`Broadcaster`] what changed. It
//! never blocks and never awaits; the actor in `actor.rs` feeds it
//! commands and timer expiries one at a time.
//!
//! ```text
//!              join / leave / vote / reset / start / stop
//! transport ──────────────────────────────────────────────→ coordinator
//!                                                              │   ▲
//!                                             schedule(expiry) │   │ timer_expire
//!                                                              ▼   │
//!                                                            scheduler
//! ```
//!
//! # Reveal rules
//!
//! `revealed` becomes `true` in exactly two places: a vote that completes
//! the set, and a live countdown expiring. Only [`reset`](RoomCoordinator::reset)
//! sets it back to `false`.

use std::time::Duration;

use planpoker_protocol::{
    ParticipantId, RawVote, RoomId, RoomView, ServerEvent, VoteValue,
};
use planpoker_timer::{Scheduler, TimerToken, TokenIssuer};
use tracing::{debug, info, warn};

use crate::room::now_millis;
use crate::{Broadcaster, Countdown, Room, RoomConfig, RoomError, RoomStore};

/// Payload the scheduler hands back when a countdown runs out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerExpiry {
    pub room_id: RoomId,
    pub token: TimerToken,
}

/// Business logic for every room.
pub struct RoomCoordinator<B, S> {
    store: RoomStore,
    config: RoomConfig,
    broadcaster: B,
    scheduler: S,
    tokens: TokenIssuer,
}

impl<B, S> RoomCoordinator<B, S>
where
    B: Broadcaster,
    S: Scheduler<TimerExpiry>,
{
    /// Creates a coordinator with no rooms.
    pub fn new(config: RoomConfig, broadcaster: B, scheduler: S) -> Self {
        Self {
            store: RoomStore::new(),
            config: config.validated(),
            broadcaster,
            scheduler,
            tokens: TokenIssuer::new(),
        }
    }

    /// Adds a participant to a room, creating the room if needed.
    ///
    /// Joining again with an id that is already present changes nothing
    /// (vote and host flag are kept) but still broadcasts the room, so a
    /// reconnecting client gets a fresh snapshot.
    ///
    /// # Errors
    /// [`RoomError::RoomFull`] when the room already holds
    /// `max_participants`. Membership is left unchanged and nothing is
    /// broadcast.
    pub fn join(
        &mut self,
        room_id: &RoomId,
        participant_id: &ParticipantId,
        name: &str,
    ) -> Result<(), RoomError> {
        let capacity = self.config.max_participants;
        let (room, created) = self.store.get_or_create(room_id);
        if created {
            info!(%room_id, "room created");
        }

        if room.len() >= capacity {
            info!(%room_id, %participant_id, capacity, "join rejected, room full");
            return Err(RoomError::RoomFull {
                room_id: room_id.clone(),
                capacity,
            });
        }

        if room.contains(participant_id) {
            debug!(%room_id, %participant_id, "already in room, join is a no-op");
        } else {
            room.add_participant(participant_id.clone(), name.to_string());
            info!(
                %room_id,
                %participant_id,
                username = name,
                participants = room.len(),
                host = room.host_id() == Some(participant_id),
                "participant joined"
            );
        }

        self.publish(room_id, ServerEvent::RoomUpdate);
        Ok(())
    }

    /// Removes a participant.
    ///
    /// The earliest joined remaining participant inherits the host role.
    /// When the last participant leaves, the room is deleted together with
    /// its votes and countdown, and nothing is broadcast.
    pub fn leave(&mut self, room_id: &RoomId, participant_id: &ParticipantId) {
        let Some(room) = self.store.get_mut(room_id) else {
            debug!(%room_id, %participant_id, "leave for unknown room ignored");
            return;
        };
        let Some(removed) = room.remove_participant(participant_id) else {
            debug!(%room_id, %participant_id, "leave for unknown participant ignored");
            return;
        };
        info!(
            %room_id,
            %participant_id,
            participants = room.len(),
            "participant left"
        );
        if removed.is_host {
            if let Some(host) = room.host_id() {
                info!(%room_id, new_host = %host, "host handed over");
            }
        }

        if room.is_empty() {
            if let Some(handle) = room.timer.as_mut().and_then(Countdown::stop) {
                self.scheduler.cancel(handle);
            }
            self.store.delete(room_id);
            info!(%room_id, "room deleted");
            return;
        }

        self.publish(room_id, ServerEvent::RoomUpdate);
    }

    /// Records a vote.
    ///
    /// Out-of-deck values are logged and dropped without touching state or
    /// broadcasting. When the vote completes the set the room is revealed
    /// and `vote_reveal` goes out instead of `room_update`.
    pub fn vote(
        &mut self,
        room_id: &RoomId,
        participant_id: &ParticipantId,
        value: RawVote,
    ) {
        let value = match VoteValue::try_from(value) {
            Ok(value) => value,
            Err(e) => {
                warn!(%room_id, %participant_id, error = %e, "vote dropped");
                return;
            }
        };

        let Some(room) = self.store.get_mut(room_id) else {
            debug!(%room_id, %participant_id, "vote for unknown room ignored");
            return;
        };
        let Some(participant) = room.participant_mut(participant_id) else {
            debug!(%room_id, %participant_id, "vote from non-member ignored");
            return;
        };
        participant.vote = Some(value);
        debug!(%room_id, %participant_id, "vote recorded");

        if room.all_voted() {
            if !room.revealed {
                info!(%room_id, participants = room.len(), "everyone voted, revealing");
            }
            room.revealed = true;
            self.publish(room_id, ServerEvent::VoteReveal);
        } else {
            self.publish(room_id, ServerEvent::RoomUpdate);
        }
    }

    /// Starts a new round: clears every vote, hides the cards, and stops
    /// the countdown. Broadcasts `vote_reset` then `room_update`.
    pub fn reset(&mut self, room_id: &RoomId) {
        let Some(room) = self.store.get_mut(room_id) else {
            debug!(%room_id, "reset for unknown room ignored");
            return;
        };
        for participant in &mut room.users {
            participant.vote = None;
        }
        room.revealed = false;
        if let Some(handle) = room.timer.as_mut().and_then(Countdown::stop) {
            self.scheduler.cancel(handle);
        }
        info!(%room_id, "votes reset");

        self.publish(room_id, ServerEvent::VoteReset);
        self.publish(room_id, ServerEvent::RoomUpdate);
    }

    /// Starts the countdown, replacing any running one.
    ///
    /// Durations above `max_timer_secs` are clamped. The previous
    /// countdown's expiry is cancelled and, because a new token is issued,
    /// can no longer reveal the room even if it was already on its way.
    pub fn start_timer(&mut self, room_id: &RoomId, duration_secs: u64) {
        let max = self.config.max_timer_secs;
        let Some(room) = self.store.get_mut(room_id) else {
            debug!(%room_id, "start_timer for unknown room ignored");
            return;
        };

        let duration_secs = if duration_secs > max {
            warn!(%room_id, requested = duration_secs, max, "timer duration clamped");
            max
        } else {
            duration_secs
        };

        if let Some(handle) = room.timer.as_mut().and_then(Countdown::stop) {
            self.scheduler.cancel(handle);
        }

        let token = self.tokens.issue();
        let handle = self.scheduler.schedule(
            Duration::from_secs(duration_secs),
            TimerExpiry {
                room_id: room_id.clone(),
                token,
            },
        );
        room.timer = Some(Countdown {
            duration_secs,
            started_at: Some(now_millis()),
            is_active: true,
            token: Some(token),
            handle: Some(handle),
        });
        info!(%room_id, duration_secs, %token, "timer started");

        self.publish(room_id, ServerEvent::RoomUpdate);
    }

    /// Stops the countdown without revealing. Votes are untouched.
    ///
    /// Broadcasts `room_update` only if a countdown was actually running.
    pub fn stop_timer(&mut self, room_id: &RoomId) {
        let Some(countdown) = self
            .store
            .get_mut(room_id)
            .and_then(|room| room.timer.as_mut())
        else {
            debug!(%room_id, "stop_timer without a timer ignored");
            return;
        };
        let was_active = countdown.is_active;
        if let Some(handle) = countdown.stop() {
            self.scheduler.cancel(handle);
        }
        if was_active {
            info!(%room_id, "timer stopped");
            self.publish(room_id, ServerEvent::RoomUpdate);
        }
    }

    /// Applies a countdown expiry handed back by the scheduler.
    ///
    /// Participants who haven't voted get `coffee`, then the room is
    /// revealed; broadcasts `vote_reveal` then `room_update`. Expiries for
    /// a deleted room, a stopped countdown, or a superseded countdown are
    /// ignored.
    pub fn timer_expire(&mut self, expiry: TimerExpiry) {
        let TimerExpiry { room_id, token } = expiry;
        let Some(room) = self.store.get_mut(&room_id) else {
            debug!(%room_id, %token, "expiry for deleted room ignored");
            return;
        };
        let Some(countdown) = room.timer.as_mut().filter(|c| c.accepts(token)) else {
            debug!(%room_id, %token, "stale timer expiry ignored");
            return;
        };
        countdown.stop();

        let mut defaulted = 0;
        for participant in room.users.iter_mut().filter(|u| u.vote.is_none()) {
            participant.vote = Some(VoteValue::Coffee);
            defaulted += 1;
        }
        room.revealed = true;
        info!(%room_id, defaulted, "timer expired, revealing");

        self.publish(&room_id, ServerEvent::VoteReveal);
        self.publish(&room_id, ServerEvent::RoomUpdate);
    }

    /// Returns a room, if it exists.
    pub fn get_room(&self, room_id: &RoomId) -> Option<&Room> {
        self.store.get(room_id)
    }

    /// Number of live rooms.
    pub fn room_count(&self) -> usize {
        self.store.len()
    }

    /// Effective (validated) configuration.
    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    pub fn broadcaster_mut(&mut self) -> &mut B {
        &mut self.broadcaster
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Broadcasts the room's current snapshot wrapped in `event`.
    fn publish(&self, room_id: &RoomId, event: fn(RoomView) -> ServerEvent) {
        if let Some(room) = self.store.get(room_id) {
            self.broadcaster.broadcast(room_id, event(room.view()));
        }
    }
}
