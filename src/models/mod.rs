//! Timetabling domain models.
//!
//! Input snapshot types (`Dataset`, `CourseUnit`, `Teacher`), the weekly
//! slot grid, search-side types (`Lesson`, `LessonValue`, `Assignment`,
//! `Constraint`) and the decoded output (`Timetable`).
//!
//! # Domain Mappings
//!
//! | u-timetable | Search view | Reporting view |
//! |-------------|-------------|----------------|
//! | CourseUnit | group of lessons | subject row |
//! | Lesson | variable | placement |
//! | LessonValue | domain value | (slot, room, mode) cell |
//! | Assignment | partial/complete solution | Timetable |

mod calendar;
mod constraint;
mod course;
mod dataset;
mod lesson;
mod schedule;
mod teacher;

pub use calendar::{Availability, Slot, SlotGrid};
pub use constraint::{
    Constraint, ConstraintId, ConstraintKind, ConstraintRegistry, ConstraintStatus,
};
pub use course::{CourseUnit, Mode, DEFAULT_OCCURRENCES};
pub use dataset::Dataset;
pub use lesson::{Domain, Lesson, LessonValue, Room, RoomId, RoomTable, VarId};
pub use schedule::{Assignment, Placement, Timetable};
pub use teacher::Teacher;
