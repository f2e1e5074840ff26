//! Lesson variables, rooms and candidate values.
//!
//! A [`Lesson`] is one occurrence of a course-unit: the unit of search.
//! Lessons live in a contiguous table and are referenced by [`VarId`]
//! (their index); constraints and assignments store ids, never references.
//!
//! Rooms are interned into a [`RoomTable`] so that candidate values stay
//! `Copy` and cheap to compare.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::{Mode, Slot};

/// Index of a lesson variable in the model's lesson table.
pub type VarId = usize;

/// One lesson occurrence to be placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    /// Position in the lesson table.
    pub id: VarId,
    /// Parent course-unit.
    pub course_id: String,
    /// 1-based occurrence index within the course.
    pub occurrence: u8,
    /// Owning class-section (denormalized from the course).
    pub class_id: String,
    /// Owning teacher (denormalized from the course).
    pub teacher_id: String,
    /// Required delivery mode.
    pub mode: Mode,
    /// Mandated room, if any.
    pub fixed_room: Option<String>,
}

impl Lesson {
    /// Display name, e.g. `UC11_2`.
    pub fn name(&self) -> String {
        format!("{}_{}", self.course_id, self.occurrence)
    }
}

/// Interned room handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoomId(pub usize);

/// A room a lesson can be placed in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Room {
    /// A physical room from the pool or a mandated room.
    Physical(String),
    /// Synthetic per-course token for online occurrences, so online lessons
    /// of different courses are never conflated.
    Online(String),
}

impl Room {
    /// Whether this is a physical room.
    pub fn is_physical(&self) -> bool {
        matches!(self, Room::Physical(_))
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Room::Physical(name) => f.write_str(name),
            Room::Online(course) => write!(f, "online:{course}"),
        }
    }
}

/// Interning table for rooms.
///
/// Ids are handed out in first-interned order, so building the table in a
/// deterministic order yields deterministic ids.
#[derive(Debug, Clone, Default)]
pub struct RoomTable {
    rooms: Vec<Room>,
    index: HashMap<Room, RoomId>,
}

impl RoomTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id of `room`, interning it if new.
    pub fn intern(&mut self, room: Room) -> RoomId {
        if let Some(&id) = self.index.get(&room) {
            return id;
        }
        let id = RoomId(self.rooms.len());
        self.rooms.push(room.clone());
        self.index.insert(room, id);
        id
    }

    /// Looks up a room.
    pub fn get(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(id.0)
    }

    /// Number of interned rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

/// A candidate value for a lesson: `(slot, room, mode)`.
///
/// The derived ordering (slot, then room, then mode) is the canonical
/// domain order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LessonValue {
    /// Assigned slot.
    pub slot: Slot,
    /// Assigned room.
    pub room: RoomId,
    /// Delivery mode (fixed per lesson).
    pub mode: Mode,
}

impl LessonValue {
    /// Creates a value.
    pub fn new(slot: Slot, room: RoomId, mode: Mode) -> Self {
        Self { slot, room, mode }
    }
}

/// Ordered candidate values of one lesson.
pub type Domain = Vec<LessonValue>;
