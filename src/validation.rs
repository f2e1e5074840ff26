//! Input validation for timetabling datasets.
//!
//! Checks structural integrity of the snapshot before any level runs.
//! Detects:
//! - Duplicate course or teacher IDs
//! - Courses referencing unknown teachers
//! - Courses with no occurrences or no class-section
//! - Online occurrence indices outside the course's occurrences
//! - Unavailable slots outside the grid
//!
//! [`validate_class_load`] adds the optional weekly load checks per
//! class-section.

use crate::config::ClassLoad;
use crate::models::{Dataset, SlotGrid};
use std::collections::HashSet;
use std::fmt;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A course references a teacher that doesn't exist.
    UnknownTeacher,
    /// A course requires no lessons.
    NoOccurrences,
    /// A course has no class-section.
    MissingClass,
    /// An online occurrence index is not an occurrence of the course.
    InvalidOccurrence,
    /// An unavailable slot lies outside the grid.
    SlotOutOfRange,
    /// A class-section's weekly lesson total differs from the expected one.
    LessonTotal,
    /// A class-section has too many online lessons.
    TooManyOnline,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validates a dataset against a slot grid.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_dataset(dataset: &Dataset, grid: &SlotGrid) -> ValidationResult {
    let mut errors = Vec::new();

    let mut teacher_ids = HashSet::new();
    for teacher in &dataset.teachers {
        if !teacher_ids.insert(teacher.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate teacher ID: {}", teacher.id),
            ));
        }
        for &slot in &teacher.availability.blocked {
            if !grid.contains(slot) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::SlotOutOfRange,
                    format!(
                        "Teacher '{}' blocks slot {slot}, grid has {} slots",
                        teacher.id,
                        grid.slot_count()
                    ),
                ));
            }
        }
    }

    let mut course_ids = HashSet::new();
    for course in &dataset.courses {
        if !course_ids.insert(course.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate course ID: {}", course.id),
            ));
        }

        if !teacher_ids.contains(course.teacher_id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownTeacher,
                format!(
                    "Course '{}' references unknown teacher '{}'",
                    course.id, course.teacher_id
                ),
            ));
        }

        if course.class_id.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::MissingClass,
                format!("Course '{}' has no class-section", course.id),
            ));
        }

        if course.occurrences == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NoOccurrences,
                format!("Course '{}' has no occurrences", course.id),
            ));
        }

        for &k in &course.online_occurrences {
            if k == 0 || k > course.occurrences {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidOccurrence,
                    format!(
                        "Course '{}' marks occurrence {k} online but has {} occurrences",
                        course.id, course.occurrences
                    ),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Checks each class-section's weekly load against `load`.
///
/// Limits left unset are skipped.
pub fn validate_class_load(dataset: &Dataset, load: &ClassLoad) -> ValidationResult {
    let mut errors = Vec::new();

    for class_id in dataset.class_ids() {
        let (lessons, online) = dataset
            .courses_for_class(class_id)
            .fold((0, 0), |(lessons, online), c| {
                (lessons + c.occurrences as usize, online + c.online_occurrences.len())
            });

        if let Some(expected) = load.lessons_per_week {
            if lessons != expected {
                errors.push(ValidationError::new(
                    ValidationErrorKind::LessonTotal,
                    format!("Class '{class_id}' has {lessons} weekly lessons, expected {expected}"),
                ));
            }
        }
        if let Some(max) = load.max_online {
            if online > max {
                errors.push(ValidationError::new(
                    ValidationErrorKind::TooManyOnline,
                    format!("Class '{class_id}' has {online} online lessons, at most {max} allowed"),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
