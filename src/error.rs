//! Error types for u-timetable.
//!
//! Two families:
//! - [`TimetableError`]: malformed configuration or input. Fatal for the run.
//! - [`BuildError`]: a relaxation level cannot be modelled (empty domain,
//!   pigeonhole capacity shortfall). Never fatal; the cascade records it as a
//!   level diagnostic and moves on.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validation::ValidationError;

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main error type for timetabling runs.
#[derive(Debug, Error)]
pub enum TimetableError {
    /// The configuration is malformed.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The input snapshot failed validation.
    #[error("Invalid dataset: {}", join(.0))]
    InvalidDataset(Vec<ValidationError>),
}

/// Result type alias for timetabling operations.
pub type Result<T> = std::result::Result<T, TimetableError>;

/// Who ran out of slots in a capacity check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapacityOwner {
    Teacher,
    Class,
}

/// A teacher or class-section owning more lessons than distinct usable slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityShortfall {
    /// Owner kind.
    pub owner: CapacityOwner,
    /// Teacher or class-section ID.
    pub id: String,
    /// Lessons owned.
    pub demand: usize,
    /// Distinct slots in the union of those lessons' domains.
    pub available: usize,
}

impl std::fmt::Display for CapacityShortfall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let owner = match self.owner {
            CapacityOwner::Teacher => "teacher",
            CapacityOwner::Class => "class",
        };
        write!(
            f,
            "{owner} '{}' needs {} slots but only {} are usable",
            self.id, self.demand, self.available
        )
    }
}

/// Why a relaxation level could not be modelled.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum BuildError {
    /// A lesson has no admissible value.
    #[error("Empty domain for lesson {lesson} (teacher '{teacher_id}', class '{class_id}')")]
    EmptyDomain {
        lesson: String,
        teacher_id: String,
        class_id: String,
    },

    /// At least one teacher or class-section fails the pigeonhole check.
    #[error("Insufficient capacity: {}", join(.0))]
    InsufficientCapacity(Vec<CapacityShortfall>),
}

fn join<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
