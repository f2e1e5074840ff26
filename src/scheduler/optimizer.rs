//! Anytime optimization.
//!
//! Continues an enumeration past its first solution, scoring every
//! solution emitted and keeping the best. The result only improves with
//! more time: the enumeration order is fixed, so a longer run scores a
//! superset of the solutions a shorter run scores.

use std::time::{Duration, Instant};

use tracing::debug;

use super::{ScoreBreakdown, ScoreEvaluator};
use crate::cp::{Deadline, SearchEngine, SearchStatus, Solutions};
use crate::models::Assignment;

/// Result of an anytime run.
#[derive(Debug, Clone)]
pub struct OptimizerResult {
    /// Best solution found. Never worse than the first.
    pub best: Assignment,
    /// Score of `best`.
    pub best_score: i64,
    /// Per-term counts of `best`.
    pub breakdown: ScoreBreakdown,
    /// Solutions scored, including the first.
    pub solutions_scored: usize,
    /// Times the best score strictly improved.
    pub improvements: usize,
    /// Whether the enumeration ran out of solutions.
    pub exhausted: bool,
    /// Wall-clock time spent.
    pub elapsed: Duration,
}

/// Keeps the best-scoring solution of an enumeration.
///
/// Ties keep the earlier solution.
pub struct AnytimeOptimizer<'e> {
    evaluator: &'e ScoreEvaluator,
    max_solutions: Option<usize>,
}

impl<'e> AnytimeOptimizer<'e> {
    /// Creates an optimizer.
    pub fn new(evaluator: &'e ScoreEvaluator) -> Self {
        Self {
            evaluator,
            max_solutions: None,
        }
    }

    /// Stops after scoring `max` solutions (the first included).
    pub fn with_max_solutions(mut self, max: Option<usize>) -> Self {
        self.max_solutions = max;
        self
    }

    /// Scores `first`, then drains `solutions` until its deadline, its end,
    /// or the solution cap.
    pub fn optimize(&self, first: Assignment, solutions: &mut Solutions<'_>) -> OptimizerResult {
        let start = Instant::now();
        let mut breakdown = self.evaluator.breakdown(&first);
        let mut best_score = breakdown.total;
        let mut best = first;
        let mut solutions_scored = 1;
        let mut improvements = 0;

        while self.max_solutions.map_or(true, |max| solutions_scored < max) {
            let Some(candidate) = solutions.next() else {
                break;
            };
            solutions_scored += 1;

            let candidate_breakdown = self.evaluator.breakdown(&candidate);
            if candidate_breakdown.total > best_score {
                debug!(
                    from = best_score,
                    to = candidate_breakdown.total,
                    scored = solutions_scored,
                    "score improved"
                );
                best_score = candidate_breakdown.total;
                breakdown = candidate_breakdown;
                best = candidate;
                improvements += 1;
            }
        }

        OptimizerResult {
            best,
            best_score,
            breakdown,
            solutions_scored,
            improvements,
            exhausted: solutions.status() == SearchStatus::Exhausted,
            elapsed: start.elapsed(),
        }
    }

    /// Finds a first solution under `deadline` and optimizes from it.
    ///
    /// `None` if no solution is found before the deadline.
    pub fn run(&self, engine: &SearchEngine<'_>, deadline: Deadline) -> Option<OptimizerResult> {
        let mut solutions = engine.iterate(deadline);
        let first = solutions.next()?;
        Some(self.optimize(first, &mut solutions))
    }
}
