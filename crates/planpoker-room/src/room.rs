//! Room and participant state.
//!
//! These are plain data types with the invariants that concern a single
//! room (ordering, host uniqueness, vote completeness). Everything that
//! talks to the outside world lives in the coordinator.

use std::time::{SystemTime, UNIX_EPOCH};

use planpoker_protocol::{
    ParticipantId, ParticipantView, RoomId, RoomView, TimerView, VoteValue,
};
use planpoker_timer::{CancelHandle, TimerToken};

/// Milliseconds since the Unix epoch.
pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Participant
// ---------------------------------------------------------------------------

/// One person at the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    /// `None` until the participant votes, and again after a reset.
    pub vote: Option<VoteValue>,
    pub is_host: bool,
    /// Milliseconds since the Unix epoch.
    pub joined_at: u64,
}

impl Participant {
    fn view(&self, revealed: bool) -> ParticipantView {
        ParticipantView {
            id: self.id.clone(),
            name: self.name.clone(),
            vote: if revealed { self.vote } else { None },
            has_voted: self.vote.is_some(),
            is_host: self.is_host,
        }
    }
}

// ---------------------------------------------------------------------------
// Countdown
// ---------------------------------------------------------------------------

/// A room's countdown.
///
/// Stays on the room after it stops (inactive, no start time) so clients
/// keep seeing the last duration that was used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    pub duration_secs: u64,
    /// Milliseconds since the Unix epoch; `None` once stopped.
    pub started_at: Option<u64>,
    pub is_active: bool,
    /// Generation of the scheduled expiry. Only an expiry carrying this
    /// exact token may reveal the room.
    pub(crate) token: Option<TimerToken>,
    pub(crate) handle: Option<CancelHandle>,
}

impl Countdown {
    /// Whether an expiry stamped with `token` is still the live one.
    pub(crate) fn accepts(&self, token: TimerToken) -> bool {
        self.is_active && self.token == Some(token)
    }

    /// Marks the countdown stopped and returns the handle to cancel, if any.
    pub(crate) fn stop(&mut self) -> Option<CancelHandle> {
        self.is_active = false;
        self.started_at = None;
        self.token = None;
        self.handle.take()
    }

    fn view(&self) -> TimerView {
        TimerView {
            duration_seconds: self.duration_secs,
            started_at: self.started_at,
            is_active: self.is_active,
        }
    }
}

// ---------------------------------------------------------------------------
// Room
// ---------------------------------------------------------------------------

/// A planning-poker room.
///
/// Participants are kept in join order and only ever appended, so the
/// earliest joined participant still present is always `users[0]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub(crate) id: RoomId,
    pub(crate) name: String,
    pub(crate) users: Vec<Participant>,
    pub(crate) revealed: bool,
    pub(crate) host_id: Option<ParticipantId>,
    pub(crate) timer: Option<Countdown>,
    pub(crate) created_at: u64,
}

impl Room {
    /// An empty room with default state.
    pub(crate) fn new(id: RoomId) -> Self {
        Self {
            name: format!("Room {id}"),
            id,
            users: Vec::new(),
            revealed: false,
            host_id: None,
            timer: None,
            created_at: now_millis(),
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Participants in join order.
    pub fn users(&self) -> &[Participant] {
        &self.users
    }

    pub fn participant(&self, id: &ParticipantId) -> Option<&Participant> {
        self.users.iter().find(|u| &u.id == id)
    }

    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.participant(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn revealed(&self) -> bool {
        self.revealed
    }

    pub fn host_id(&self) -> Option<&ParticipantId> {
        self.host_id.as_ref()
    }

    pub fn timer(&self) -> Option<&Countdown> {
        self.timer.as_ref()
    }

    /// Milliseconds since the Unix epoch.
    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    /// `true` when every participant holds a card. Vacuously true for an
    /// empty room, which never survives long enough to matter.
    pub fn all_voted(&self) -> bool {
        self.users.iter().all(|u| u.vote.is_some())
    }

    /// Appends a participant. The first one becomes host.
    pub(crate) fn add_participant(&mut self, id: ParticipantId, name: String) {
        let is_host = self.users.is_empty();
        if is_host {
            self.host_id = Some(id.clone());
        }
        self.users.push(Participant {
            id,
            name,
            vote: None,
            is_host,
            joined_at: now_millis(),
        });
    }

    /// Removes a participant, handing the host role to the earliest
    /// joined remaining participant if needed.
    pub(crate) fn remove_participant(
        &mut self,
        id: &ParticipantId,
    ) -> Option<Participant> {
        let index = self.users.iter().position(|u| &u.id == id)?;
        let removed = self.users.remove(index);

        if removed.is_host {
            self.host_id = None;
            if let Some(successor) = self.users.first_mut() {
                successor.is_host = true;
                self.host_id = Some(successor.id.clone());
            }
        }
        Some(removed)
    }

    pub(crate) fn participant_mut(
        &mut self,
        id: &ParticipantId,
    ) -> Option<&mut Participant> {
        self.users.iter_mut().find(|u| &u.id == id)
    }

    /// Snapshot for broadcasting. Votes are included only when revealed.
    pub fn view(&self) -> RoomView {
        RoomView {
            id: self.id.clone(),
            name: self.name.clone(),
            users: self.users.iter().map(|u| u.view(self.revealed)).collect(),
            revealed: self.revealed,
            host_id: self.host_id.clone(),
            timer: self.timer.as_ref().map(Countdown::view),
            created_at: self.created_at,
        }
    }
}
