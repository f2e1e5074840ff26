//! Weekly course timetabling for the U-Engine ecosystem.
//!
//! Places every lesson occurrence of a set of course-units into a
//! (slot, room, mode) triple so that no teacher, class-section or room is
//! double-booked, honoring teacher unavailability, mandated rooms and
//! online occurrences, and ranking feasible timetables by a soft score.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Dataset`, `CourseUnit`, `Teacher`,
//!   `SlotGrid`, `Lesson`, `Assignment`, `Timetable`, `Constraint`
//! - **`cp`**: Per-level model building and backtracking search under a
//!   cooperative `Deadline`
//! - **`scheduler`**: Relaxation cascade, anytime optimizer, score evaluator
//! - **`config`**: Run configuration and relaxation levels (TOML-loadable)
//! - **`validation`**: Input integrity checks
//! - **`generator`**: Seeded synthetic instances
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use u_timetable::config::TimetableConfig;
//! use u_timetable::models::{CourseUnit, Dataset, Teacher};
//!
//! let dataset = Dataset::new()
//!     .with_teacher(Teacher::new("jo"))
//!     .with_teacher(Teacher::new("mike").with_unavailable(0..4))
//!     .with_course(CourseUnit::new("UC11", "t01", "jo"))
//!     .with_course(CourseUnit::new("UC12", "t01", "mike").with_online(2));
//! let config = TimetableConfig::default().with_time_budget(Duration::from_secs(1));
//!
//! let outcome = u_timetable::solve(&dataset, &config).unwrap();
//! let best = outcome.best.unwrap();
//! assert_eq!(best.timetable.for_class("t01").len(), 4);
//! ```
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Dechter (2003), "Constraint Processing"

pub mod config;
pub mod cp;
pub mod error;
pub mod generator;
pub mod models;
pub mod scheduler;
pub mod validation;

pub use error::{Result, TimetableError};

use config::TimetableConfig;
use models::Dataset;
use scheduler::{RelaxationCascade, SolveOutcome};

/// Runs the relaxation cascade over `dataset` with `config`.
///
/// Shorthand for [`RelaxationCascade::run`].
pub fn solve(dataset: &Dataset, config: &TimetableConfig) -> Result<SolveOutcome> {
    RelaxationCascade::new(dataset, config).run()
}
