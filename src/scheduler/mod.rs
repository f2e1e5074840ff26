//! Relaxation cascade, anytime optimization and scoring.
//!
//! Drives the constraint core level by level and ranks the solutions it
//! enumerates.
//!
//! # Flow
//!
//! `RelaxationCascade` builds each level's model, asks the search for a
//! first solution within the level's time slice, and on success lets
//! `AnytimeOptimizer` keep enumerating for the rest of the slice,
//! retaining the best solution by `ScoreEvaluator`.
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Zilberstein (1996), "Using Anytime Algorithms in Intelligent Systems"

mod cascade;
mod optimizer;
mod score;

pub use cascade::{
    InfeasibilityCause, LevelOutcome, LevelReport, RelaxationCascade, Solution, SolveOutcome,
    SolveStatus,
};
pub use optimizer::{AnytimeOptimizer, OptimizerResult};
pub use score::{ScoreBreakdown, ScoreEvaluator};
