//! Relaxation cascade driver.
//!
//! Tries the configured relaxation levels strictest first, each under an
//! equal slice of the time budget. The first non-diagnostic level that
//! yields a solution hands the rest of its slice to the anytime optimizer
//! and ends the run; later levels are skipped.
//!
//! Diagnostic levels never produce the schedule. Their only purpose is to
//! tell, once every other level failed, whether the instance is infeasible
//! because of rooms and daily load or infeasible structurally.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{AnytimeOptimizer, ScoreBreakdown, ScoreEvaluator};
use crate::config::TimetableConfig;
use crate::cp::{Deadline, SearchEngine, SearchStats, SearchStatus, TimetableCpBuilder};
use crate::error::{BuildError, Result, TimetableError};
use crate::models::{Assignment, Dataset, Timetable};
use crate::validation::{validate_class_load, validate_dataset};

/// How one level ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelOutcome {
    /// At least one solution found.
    Solved,
    /// Rejected before search.
    BuildFailed(BuildError),
    /// Search space explored without a solution.
    SearchExhausted,
    /// Slice ran out before a first solution.
    Cancelled,
}

/// Diagnostics of one attempted level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelReport {
    /// Level name.
    pub level: String,
    /// Whether the level was diagnostic-only.
    pub diagnostic: bool,
    /// How the level ended.
    pub outcome: LevelOutcome,
    /// Time slice granted.
    pub slice: Duration,
    /// Time to the first solution, if one was found.
    pub time_to_first: Option<Duration>,
    /// Time spent in the anytime phase, if it ran.
    pub leftover_used: Option<Duration>,
    /// Total time spent on the level.
    pub elapsed: Duration,
    /// Search counters.
    pub stats: SearchStats,
    /// Solutions scored by the anytime phase.
    pub solutions_scored: usize,
    /// Best score reached on this level.
    pub best_score: Option<i64>,
}

impl LevelReport {
    fn new(level: &str, diagnostic: bool, slice: Duration) -> Self {
        Self {
            level: level.to_string(),
            diagnostic,
            outcome: LevelOutcome::Cancelled,
            slice,
            time_to_first: None,
            leftover_used: None,
            elapsed: Duration::ZERO,
            stats: SearchStats::default(),
            solutions_scored: 0,
            best_score: None,
        }
    }
}

/// Why no level produced a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InfeasibilityCause {
    /// A diagnostic level without room exclusivity and daily cap found a
    /// solution: rooms or daily load are the bottleneck.
    RoomsOrDailyLoad,
    /// A diagnostic level was rejected or exhausted: no room or load
    /// relaxation helps.
    Structural,
    /// No diagnostic level completed.
    Undetermined,
}

/// Terminal status of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveStatus {
    /// A schedule was produced at the named level.
    Solved { level: String },
    /// Every level failed.
    NoFeasibleLevel { cause: InfeasibilityCause },
}

/// The schedule handed to reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    /// Producing level.
    pub level: String,
    /// Soft score.
    pub score: i64,
    /// Per-term score counts.
    pub breakdown: ScoreBreakdown,
    /// Raw assignment over the level's lesson table.
    pub assignment: Assignment,
    /// Decoded placements.
    pub timetable: Timetable,
}

/// Result of a cascade run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveOutcome {
    /// Terminal status.
    pub status: SolveStatus,
    /// Best schedule, if any level succeeded.
    pub best: Option<Solution>,
    /// Reports of the levels attempted, in order.
    pub levels: Vec<LevelReport>,
    /// Total wall-clock time.
    pub elapsed: Duration,
}

impl SolveOutcome {
    /// Whether a schedule was produced.
    pub fn is_solved(&self) -> bool {
        matches!(self.status, SolveStatus::Solved { .. })
    }

    /// Report of a level by name.
    pub fn level(&self, name: &str) -> Option<&LevelReport> {
        self.levels.iter().find(|r| r.level == name)
    }
}

/// Runs the relaxation cascade over one dataset.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use u_timetable::config::TimetableConfig;
/// use u_timetable::models::{CourseUnit, Dataset, Teacher};
/// use u_timetable::scheduler::RelaxationCascade;
///
/// let dataset = Dataset::new()
///     .with_teacher(Teacher::new("jo"))
///     .with_course(CourseUnit::new("UC11", "t01", "jo"))
///     .with_course(CourseUnit::new("UC12", "t01", "jo"));
/// let config = TimetableConfig::default().with_time_budget(Duration::from_millis(600));
///
/// let outcome = RelaxationCascade::new(&dataset, &config).run().unwrap();
/// assert!(outcome.is_solved());
/// assert_eq!(outcome.best.unwrap().timetable.len(), 4);
/// ```
pub struct RelaxationCascade<'a> {
    dataset: &'a Dataset,
    config: &'a TimetableConfig,
    cancel: Option<Arc<AtomicBool>>,
}

impl<'a> RelaxationCascade<'a> {
    /// Creates a cascade.
    pub fn new(dataset: &'a Dataset, config: &'a TimetableConfig) -> Self {
        Self {
            dataset,
            config,
            cancel: None,
        }
    }

    /// Stops the run early once `flag` is set.
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Runs every level in order until one yields a schedule.
    ///
    /// # Errors
    /// Only for malformed configuration or input. Infeasibility is an
    /// `Ok` outcome with [`SolveStatus::NoFeasibleLevel`].
    pub fn run(&self) -> Result<SolveOutcome> {
        self.config.validate()?;
        validate_dataset(self.dataset, &self.config.grid).map_err(TimetableError::InvalidDataset)?;
        validate_class_load(self.dataset, &self.config.class_load)
            .map_err(TimetableError::InvalidDataset)?;

        let start = Instant::now();
        let slice = self.config.level_slice();
        let builder = TimetableCpBuilder::new(self.dataset, self.config);
        let mut levels = Vec::with_capacity(self.config.levels.len());

        info!(
            levels = self.config.levels.len(),
            lessons = self.dataset.lesson_count(),
            slice_ms = slice.as_millis() as u64,
            "cascade started"
        );

        for level in &self.config.levels {
            let level_start = Instant::now();
            let mut report = LevelReport::new(&level.name, level.diagnostic, slice);
            let mut deadline = Deadline::after(slice);
            if let Some(flag) = &self.cancel {
                deadline = deadline.with_cancel(flag.clone());
            }

            let model = match builder.build(level) {
                Ok(model) => model,
                Err(e) => {
                    info!(level = %level.name, error = %e, "level rejected before search");
                    report.outcome = LevelOutcome::BuildFailed(e);
                    report.elapsed = level_start.elapsed();
                    levels.push(report);
                    continue;
                }
            };

            let engine = SearchEngine::new(&model);
            let mut solutions = engine.iterate(deadline);
            let Some(first) = solutions.next() else {
                report.outcome = match solutions.status() {
                    SearchStatus::Exhausted => LevelOutcome::SearchExhausted,
                    _ => LevelOutcome::Cancelled,
                };
                report.stats = solutions.stats();
                report.elapsed = level_start.elapsed();
                info!(level = %level.name, outcome = ?report.outcome, "no solution");
                levels.push(report);
                continue;
            };

            report.outcome = LevelOutcome::Solved;
            report.time_to_first = Some(level_start.elapsed());

            if level.diagnostic {
                report.stats = solutions.stats();
                report.elapsed = level_start.elapsed();
                info!(level = %level.name, "diagnostic level solvable");
                levels.push(report);
                continue;
            }

            let evaluator = ScoreEvaluator::new(&model, self.config);
            let result = AnytimeOptimizer::new(&evaluator)
                .with_max_solutions(self.config.max_solutions)
                .optimize(first, &mut solutions);

            report.leftover_used = Some(result.elapsed);
            report.stats = solutions.stats();
            report.solutions_scored = result.solutions_scored;
            report.best_score = Some(result.best_score);
            report.elapsed = level_start.elapsed();
            debug!(
                level = %level.name,
                nodes = report.stats.nodes,
                scored = result.solutions_scored,
                exhausted = result.exhausted,
                "anytime phase finished"
            );
            levels.push(report);

            let solution = Solution {
                level: level.name.clone(),
                score: result.best_score,
                breakdown: result.breakdown,
                timetable: model.decode(&result.best),
                assignment: result.best,
            };
            info!(level = %level.name, score = solution.score, "schedule found");

            return Ok(SolveOutcome {
                status: SolveStatus::Solved {
                    level: level.name.clone(),
                },
                best: Some(solution),
                levels,
                elapsed: start.elapsed(),
            });
        }

        let cause = infeasibility_cause(&levels);
        warn!(?cause, "no feasible level");
        Ok(SolveOutcome {
            status: SolveStatus::NoFeasibleLevel { cause },
            best: None,
            levels,
            elapsed: start.elapsed(),
        })
    }
}

/// Classifies a failed run from its diagnostic levels. The last completed
/// diagnostic level decides.
fn infeasibility_cause(levels: &[LevelReport]) -> InfeasibilityCause {
    levels
        .iter()
        .rev()
        .filter(|r| r.diagnostic)
        .find_map(|r| match r.outcome {
            LevelOutcome::Solved => Some(InfeasibilityCause::RoomsOrDailyLoad),
            LevelOutcome::BuildFailed(_) | LevelOutcome::SearchExhausted => {
                Some(InfeasibilityCause::Structural)
            }
            LevelOutcome::Cancelled => None,
        })
        .unwrap_or(InfeasibilityCause::Undetermined)
}
