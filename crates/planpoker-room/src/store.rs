//! Room store: owns every room, keyed by id.

use std::collections::HashMap;

use planpoker_protocol::RoomId;

use crate::Room;

/// All live rooms.
///
/// Not thread-safe by itself: it is a plain `HashMap` owned by exactly one
/// coordinator, which in turn is owned by one actor task. Every operation
/// is a single synchronous step.
#[derive(Debug, Default)]
pub struct RoomStore {
    rooms: HashMap<RoomId, Room>,
}

impl RoomStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the room, creating an empty one if it doesn't exist.
    ///
    /// The second value is `true` when the room was just created.
    pub fn get_or_create(&mut self, room_id: &RoomId) -> (&mut Room, bool) {
        let mut created = false;
        let room = self.rooms.entry(room_id.clone()).or_insert_with(|| {
            created = true;
            Room::new(room_id.clone())
        });
        (room, created)
    }

    pub fn get(&self, room_id: &RoomId) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    pub fn get_mut(&mut self, room_id: &RoomId) -> Option<&mut Room> {
        self.rooms.get_mut(room_id)
    }

    /// Removes a room, returning it if it existed.
    pub fn delete(&mut self, room_id: &RoomId) -> Option<Room> {
        self.rooms.remove(room_id)
    }

    /// Number of live rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
