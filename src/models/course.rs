//! Course-unit model.
//!
//! A course-unit is a subject taught to one class-section by one teacher,
//! requiring a fixed number of weekly lesson occurrences. Each occurrence
//! becomes one search variable.
//!
//! Occurrence indices are 1-based: a course with two weekly lessons has
//! occurrences 1 and 2.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Default weekly occurrence count of a course-unit.
pub const DEFAULT_OCCURRENCES: u8 = 2;

/// Delivery mode of a lesson occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// Taught in a physical room.
    InPerson,
    /// Taught online; occupies no physical room.
    Online,
}

impl Mode {
    /// Whether this is an online occurrence.
    #[inline]
    pub fn is_online(self) -> bool {
        matches!(self, Mode::Online)
    }
}

/// A course-unit to be timetabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseUnit {
    /// Unique course identifier.
    pub id: String,
    /// Owning class-section.
    pub class_id: String,
    /// Owning teacher.
    pub teacher_id: String,
    /// Weekly lesson occurrences.
    #[serde(default = "default_occurrences")]
    pub occurrences: u8,
    /// Mandated room, if any.
    #[serde(default)]
    pub fixed_room: Option<String>,
    /// 1-based occurrence indices delivered online.
    #[serde(default)]
    pub online_occurrences: BTreeSet<u8>,
}

fn default_occurrences() -> u8 {
    DEFAULT_OCCURRENCES
}

impl CourseUnit {
    /// Creates an in-person course with the default occurrence count.
    pub fn new(
        id: impl Into<String>,
        class_id: impl Into<String>,
        teacher_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            class_id: class_id.into(),
            teacher_id: teacher_id.into(),
            occurrences: DEFAULT_OCCURRENCES,
            fixed_room: None,
            online_occurrences: BTreeSet::new(),
        }
    }

    /// Sets the weekly occurrence count.
    pub fn with_occurrences(mut self, occurrences: u8) -> Self {
        self.occurrences = occurrences;
        self
    }

    /// Mandates a room for every occurrence.
    pub fn with_fixed_room(mut self, room: impl Into<String>) -> Self {
        self.fixed_room = Some(room.into());
        self
    }

    /// Marks a 1-based occurrence as online.
    pub fn with_online(mut self, occurrence: u8) -> Self {
        self.online_occurrences.insert(occurrence);
        self
    }

    /// Delivery mode of an occurrence.
    pub fn mode_of(&self, occurrence: u8) -> Mode {
        if self.online_occurrences.contains(&occurrence) {
            Mode::Online
        } else {
            Mode::InPerson
        }
    }

    /// Iterates the 1-based occurrence indices.
    pub fn occurrence_indices(&self) -> impl Iterator<Item = u8> {
        1..=self.occurrences
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_builder() {
        let c = CourseUnit::new("UC14", "t01", "jo")
            .with_fixed_room("Lab01")
            .with_online(2);

        assert_eq!(c.occurrences, 2);
        assert_eq!(c.fixed_room.as_deref(), Some("Lab01"));
        assert_eq!(c.mode_of(1), Mode::InPerson);
        assert_eq!(c.mode_of(2), Mode::Online);
        assert_eq!(c.occurrence_indices().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_single_occurrence() {
        let c = CourseUnit::new("MD", "t01", "md").with_occurrences(1);
        assert_eq!(c.occurrence_indices().count(), 1);
    }

    #[test]
    fn test_deserialize_defaults() {
        let c: CourseUnit = serde_json::from_str(
            r#"{"id": "UC11", "class_id": "t01", "teacher_id": "jo"}"#,
        )
        .unwrap();
        assert_eq!(c.occurrences, DEFAULT_OCCURRENCES);
        assert!(c.fixed_room.is_none());
        assert!(c.online_occurrences.is_empty());
    }
}
