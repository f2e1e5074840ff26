//! Assignments and decoded timetables.
//!
//! An [`Assignment`] is the search-side view: a value per lesson id, partial
//! while the search is expanding and complete at a solution. A
//! [`Timetable`] is the reporting-side view of a complete assignment, with
//! every id resolved to names.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{Lesson, LessonValue, Mode, RoomTable, Slot, SlotGrid, VarId};

/// Mapping from lesson id to its chosen value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Assignment {
    values: Vec<Option<LessonValue>>,
}

impl Assignment {
    /// Creates an empty assignment over `len` lessons.
    pub fn new(len: usize) -> Self {
        Self {
            values: vec![None; len],
        }
    }

    /// Number of lessons covered (assigned or not).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the assignment covers no lessons.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of a lesson, if assigned.
    #[inline]
    pub fn get(&self, var: VarId) -> Option<LessonValue> {
        self.values.get(var).copied().flatten()
    }

    /// Assigns a value.
    #[inline]
    pub fn set(&mut self, var: VarId, value: LessonValue) {
        self.values[var] = Some(value);
    }

    /// Removes a lesson's value.
    #[inline]
    pub fn unset(&mut self, var: VarId) {
        self.values[var] = None;
    }

    /// Whether a lesson is assigned.
    #[inline]
    pub fn is_assigned(&self, var: VarId) -> bool {
        self.get(var).is_some()
    }

    /// Number of assigned lessons.
    pub fn assigned_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// Whether every lesson is assigned.
    pub fn is_complete(&self) -> bool {
        self.values.iter().all(Option::is_some)
    }

    /// Iterates assigned `(lesson, value)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (VarId, LessonValue)> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(var, v)| v.map(|v| (var, v)))
    }
}

/// One placed lesson, with ids resolved to names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// Course-unit ID.
    pub course_id: String,
    /// 1-based occurrence index.
    pub occurrence: u8,
    /// Class-section ID.
    pub class_id: String,
    /// Teacher ID.
    pub teacher_id: String,
    /// Slot index.
    pub slot: Slot,
    /// Day label of the slot.
    pub day: String,
    /// Room name (`online:<course>` for online occurrences without a mandated room).
    pub room: String,
    /// Delivery mode.
    pub mode: Mode,
}

/// A complete weekly timetable, ready for per-class and per-teacher rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timetable {
    /// Placements sorted by slot, then course, then occurrence.
    pub placements: Vec<Placement>,
}

impl Timetable {
    /// Decodes an assignment. Unassigned lessons are skipped.
    pub fn decode(
        lessons: &[Lesson],
        rooms: &RoomTable,
        grid: &SlotGrid,
        assignment: &Assignment,
    ) -> Self {
        let mut placements: Vec<Placement> = assignment
            .iter()
            .filter_map(|(var, value)| {
                let lesson = lessons.get(var)?;
                Some(Placement {
                    course_id: lesson.course_id.clone(),
                    occurrence: lesson.occurrence,
                    class_id: lesson.class_id.clone(),
                    teacher_id: lesson.teacher_id.clone(),
                    slot: value.slot,
                    day: grid.day_label(value.slot).to_string(),
                    room: rooms
                        .get(value.room)
                        .map(ToString::to_string)
                        .unwrap_or_default(),
                    mode: value.mode,
                })
            })
            .collect();
        placements.sort_by(|a, b| {
            a.slot
                .cmp(&b.slot)
                .then_with(|| a.course_id.cmp(&b.course_id))
                .then_with(|| a.occurrence.cmp(&b.occurrence))
        });
        Self { placements }
    }

    /// Number of placements.
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    /// Whether the timetable is empty.
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Placements of a class-section, by slot.
    pub fn for_class(&self, class_id: &str) -> Vec<&Placement> {
        self.placements
            .iter()
            .filter(|p| p.class_id == class_id)
            .collect()
    }

    /// Placements of a teacher, by slot.
    pub fn for_teacher(&self, teacher_id: &str) -> Vec<&Placement> {
        self.placements
            .iter()
            .filter(|p| p.teacher_id == teacher_id)
            .collect()
    }

    /// Finds the placement of a course occurrence.
    pub fn placement(&self, course_id: &str, occurrence: u8) -> Option<&Placement> {
        self.placements
            .iter()
            .find(|p| p.course_id == course_id && p.occurrence == occurrence)
    }

    /// Distinct class-section IDs, sorted.
    pub fn class_ids(&self) -> BTreeSet<&str> {
        self.placements.iter().map(|p| p.class_id.as_str()).collect()
    }

    /// Distinct teacher IDs, sorted.
    pub fn teacher_ids(&self) -> BTreeSet<&str> {
        self.placements.iter().map(|p| p.teacher_id.as_str()).collect()
    }
}
