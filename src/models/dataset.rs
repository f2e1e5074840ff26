//! Read-only input snapshot.
//!
//! Produced by a dataset parser and consumed by the domain builder. The
//! engine never mutates it; course order is the variable insertion order
//! and therefore part of the deterministic search order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{CourseUnit, Teacher};

/// Teachers and course-units of one timetabling instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    /// Teachers with their unavailability.
    pub teachers: Vec<Teacher>,
    /// Course-units in insertion order.
    pub courses: Vec<CourseUnit>,
}

impl Dataset {
    /// Creates an empty dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a teacher.
    pub fn with_teacher(mut self, teacher: Teacher) -> Self {
        self.teachers.push(teacher);
        self
    }

    /// Adds a course-unit.
    pub fn with_course(mut self, course: CourseUnit) -> Self {
        self.courses.push(course);
        self
    }

    /// Finds a teacher by ID.
    pub fn teacher(&self, id: &str) -> Option<&Teacher> {
        self.teachers.iter().find(|t| t.id == id)
    }

    /// Finds a course by ID.
    pub fn course(&self, id: &str) -> Option<&CourseUnit> {
        self.courses.iter().find(|c| c.id == id)
    }

    /// Distinct class-section IDs, sorted.
    pub fn class_ids(&self) -> BTreeSet<&str> {
        self.courses.iter().map(|c| c.class_id.as_str()).collect()
    }

    /// Courses of a class-section, in insertion order.
    pub fn courses_for_class<'a>(&'a self, class_id: &'a str) -> impl Iterator<Item = &'a CourseUnit> {
        self.courses.iter().filter(move |c| c.class_id == class_id)
    }

    /// Courses taught by a teacher, in insertion order.
    pub fn courses_for_teacher<'a>(
        &'a self,
        teacher_id: &'a str,
    ) -> impl Iterator<Item = &'a CourseUnit> {
        self.courses.iter().filter(move |c| c.teacher_id == teacher_id)
    }

    /// Total number of lesson occurrences (search variables).
    pub fn lesson_count(&self) -> usize {
        self.courses.iter().map(|c| c.occurrences as usize).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::new()
            .with_teacher(Teacher::new("jo"))
            .with_teacher(Teacher::new("mike").with_unavailable(12..20))
            .with_course(CourseUnit::new("UC11", "t01", "jo"))
            .with_course(CourseUnit::new("UC12", "t01", "mike"))
            .with_course(CourseUnit::new("UC21", "t02", "jo").with_occurrences(1))
    }

    #[test]
    fn test_lookup() {
        let d = sample();
        assert!(d.teacher("mike").is_some());
        assert!(d.teacher("nobody").is_none());
        assert_eq!(d.course("UC12").unwrap().teacher_id, "mike");
    }

    #[test]
    fn test_grouping() {
        let d = sample();
        assert_eq!(d.class_ids().into_iter().collect::<Vec<_>>(), vec!["t01", "t02"]);
        assert_eq!(d.courses_for_class("t01").count(), 2);
        assert_eq!(d.courses_for_teacher("jo").count(), 2);
        assert_eq!(d.lesson_count(), 5);
    }
}
