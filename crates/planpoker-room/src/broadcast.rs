//! The broadcast capability and its channel-backed implementation.

use std::collections::HashMap;

use planpoker_protocol::{ParticipantId, RoomId, ServerEvent};
use tokio::sync::mpsc;

/// Channel sender for delivering events to one connection.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

/// Delivers an event to everyone subscribed to a room.
///
/// Fire-and-forget: implementations must not block and don't report
/// delivery failures. The event name is [`ServerEvent::name`], the payload
/// is the event itself.
pub trait Broadcaster: Send + 'static {
    fn broadcast(&self, room_id: &RoomId, event: ServerEvent);
}

/// Per-room subscriber lists backed by unbounded channels.
///
/// Each connection hands in the sending half of its outbound channel when
/// it joins a room and is removed again when it leaves. A send to a
/// closed channel (connection already gone) is silently dropped.
#[derive(Debug, Default)]
pub struct Fanout {
    rooms: HashMap<RoomId, HashMap<ParticipantId, EventSender>>,
}

impl Fanout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes a participant to a room, replacing any previous sender
    /// registered for the same participant.
    pub fn subscribe(
        &mut self,
        room_id: &RoomId,
        participant_id: &ParticipantId,
        sender: EventSender,
    ) {
        self.rooms
            .entry(room_id.clone())
            .or_default()
            .insert(participant_id.clone(), sender);
    }

    /// Unsubscribes a participant; drops the room's entry once empty.
    pub fn unsubscribe(&mut self, room_id: &RoomId, participant_id: &ParticipantId) {
        if let Some(subscribers) = self.rooms.get_mut(room_id) {
            subscribers.remove(participant_id);
            if subscribers.is_empty() {
                self.rooms.remove(room_id);
            }
        }
    }

    /// Number of subscribers of a room.
    pub fn subscriber_count(&self, room_id: &RoomId) -> usize {
        self.rooms.get(room_id).map_or(0, HashMap::len)
    }
}

impl Broadcaster for Fanout {
    fn broadcast(&self, room_id: &RoomId, event: ServerEvent) {
        let Some(subscribers) = self.rooms.get(room_id) else {
            return;
        };
        tracing::trace!(
            %room_id,
            event = event.name(),
            subscribers = subscribers.len(),
            "broadcast"
        );
        for sender in subscribers.values() {
            let _ = sender.send(event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pong() -> ServerEvent {
        ServerEvent::Pong {
            client_time: 0,
            server_time: 0,
        }
    }

    #[test]
    fn test_broadcast_reaches_room_subscribers_only() {
        let mut fanout = Fanout::new();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        fanout.subscribe(&RoomId::from("R1"), &ParticipantId::from("a"), tx_a);
        fanout.subscribe(&RoomId::from("R2"), &ParticipantId::from("b"), tx_b);

        fanout.broadcast(&RoomId::from("R1"), pong());

        assert_eq!(rx_a.try_recv().unwrap(), pong());
        assert!(rx_b.try_recv().is_err());
    }

    #[test]
    fn test_unsubscribe_drops_empty_room() {
        let mut fanout = Fanout::new();
        let room = RoomId::from("R1");
        let (tx, _rx) = mpsc::unbounded_channel();
        fanout.subscribe(&room, &ParticipantId::from("a"), tx);
        assert_eq!(fanout.subscriber_count(&room), 1);

        fanout.unsubscribe(&room, &ParticipantId::from("a"));
        assert_eq!(fanout.subscriber_count(&room), 0);
        assert!(fanout.rooms.is_empty());
    }

    #[test]
    fn test_closed_receiver_is_ignored() {
        let mut fanout = Fanout::new();
        let room = RoomId::from("R1");
        let (tx, rx) = mpsc::unbounded_channel();
        fanout.subscribe(&room, &ParticipantId::from("a"), tx);
        drop(rx);
        fanout.broadcast(&room, pong());
    }

    #[test]
    fn test_resubscribe_replaces_sender() {
        let mut fanout = Fanout::new();
        let room = RoomId::from("R1");
        let pid = ParticipantId::from("a");
        let (old_tx, mut old_rx) = mpsc::unbounded_channel();
        let (new_tx, mut new_rx) = mpsc::unbounded_channel();
        fanout.subscribe(&room, &pid, old_tx);
        fanout.subscribe(&room, &pid, new_tx);

        fanout.broadcast(&room, pong());
        assert!(old_rx.try_recv().is_err());
        assert!(new_rx.try_recv().is_ok());
        assert_eq!(fanout.subscriber_count(&room), 1);
    }
}
