//! Backtracking search with forward checking.
//!
//! Depth-first search over the lessons of a [`TimetableModel`], one stack
//! frame per assigned lesson.
//!
//! # Ordering
//! Lessons are expanded in static MRV order: ascending domain size, ties
//! kept in lesson-table order. Values are tried in domain order. Together
//! these fix the discovery order of solutions, so two runs over the same
//! model enumerate the same solutions in the same sequence.
//!
//! # Forward checking
//! After a lesson is placed, every value of an unassigned neighbour that
//! conflicts with the assignment so far is pruned. A neighbour left with no
//! value rejects the placement at once. Prunings are recorded on a trail
//! and undone frame by frame on backtrack. Pruning only removes values that
//! cannot extend to a solution, so the solution sequence is unchanged.
//!
//! # Cancellation
//! The deadline is polled before every frame expansion. An expired
//! deadline ends the enumeration; the partial assignment on the stack is
//! dropped, never emitted.
//!
//! # Reference
//! - Haralick & Elliott (1980), "Increasing Tree Search Efficiency for
//!   Constraint Satisfaction Problems"

use std::iter::FusedIterator;

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{Deadline, TimetableModel};
use crate::models::{Assignment, VarId};

/// State of a search run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchStatus {
    /// Not started.
    Unexpanded,
    /// Frames on the stack, looking for the next solution.
    Expanding,
    /// Just emitted a solution; resumes from the deepest frame.
    Solution,
    /// Search space fully explored.
    Exhausted,
    /// Deadline reached mid-search.
    Cancelled,
}

impl SearchStatus {
    /// Whether the run can emit no further solutions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Exhausted | Self::Cancelled)
    }
}

/// Counters of a search run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Values tried.
    pub nodes: u64,
    /// Frames popped after exhausting their domain.
    pub backtracks: u64,
    /// Neighbour values removed by forward checking.
    pub pruned: u64,
    /// Solutions emitted.
    pub solutions: u64,
}

/// Search engine over one model.
///
/// Holds the static variable order and the constraint neighbourhood of
/// each lesson; each call to [`iterate`] starts a fresh run.
///
/// [`iterate`]: Self::iterate
pub struct SearchEngine<'m> {
    model: &'m TimetableModel,
    order: Vec<VarId>,
    neighbours: Vec<Vec<VarId>>,
}

impl<'m> SearchEngine<'m> {
    /// Creates an engine and computes its MRV order.
    pub fn new(model: &'m TimetableModel) -> Self {
        let mut order: Vec<VarId> = (0..model.lesson_count()).collect();
        // stable: equal domain sizes keep lesson-table order
        order.sort_by_key(|&var| model.domain(var).len());
        let neighbours = (0..model.lesson_count())
            .map(|var| model.registry().neighbours(var))
            .collect();
        Self {
            model,
            order,
            neighbours,
        }
    }

    /// The model searched.
    pub fn model(&self) -> &'m TimetableModel {
        self.model
    }

    /// Lesson expansion order.
    pub fn order(&self) -> &[VarId] {
        &self.order
    }

    /// First solution, or `None` when exhausted or cancelled first.
    pub fn find_first(&self, deadline: &Deadline) -> Option<Assignment> {
        self.iterate(deadline.clone()).next()
    }

    /// Lazily enumerates solutions in discovery order.
    pub fn iterate(&self, deadline: Deadline) -> Solutions<'m> {
        let live: Vec<Vec<bool>> = (0..self.model.lesson_count())
            .map(|var| vec![true; self.model.domain(var).len()])
            .collect();
        let live_count = live.iter().map(Vec::len).collect();
        Solutions {
            model: self.model,
            order: self.order.clone(),
            neighbours: self.neighbours.clone(),
            deadline,
            assignment: self.model.empty_assignment(),
            cursors: Vec::with_capacity(self.order.len()),
            marks: Vec::with_capacity(self.order.len()),
            live,
            live_count,
            trail: Vec::new(),
            status: SearchStatus::Unexpanded,
            stats: SearchStats::default(),
        }
    }
}

/// Lazy sequence of solutions of one search run.
///
/// Finite; fused once [`Exhausted`] or [`Cancelled`].
///
/// [`Exhausted`]: SearchStatus::Exhausted
/// [`Cancelled`]: SearchStatus::Cancelled
pub struct Solutions<'m> {
    model: &'m TimetableModel,
    order: Vec<VarId>,
    neighbours: Vec<Vec<VarId>>,
    deadline: Deadline,
    assignment: Assignment,
    /// Per frame, index of the next domain value to try.
    cursors: Vec<usize>,
    /// Per frame, trail length when the frame was pushed.
    marks: Vec<usize>,
    /// Per lesson and domain index, whether the value survives pruning.
    live: Vec<Vec<bool>>,
    live_count: Vec<usize>,
    /// Pruned (lesson, domain index) pairs, most recent last.
    trail: Vec<(VarId, usize)>,
    status: SearchStatus,
    stats: SearchStats,
}

impl<'m> Solutions<'m> {
    /// Current state.
    pub fn status(&self) -> SearchStatus {
        self.status
    }

    /// Counters so far.
    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    fn emit(&mut self) -> Option<Assignment> {
        self.status = SearchStatus::Solution;
        self.stats.solutions += 1;
        debug_assert!(self.model.registry().is_solution(&self.assignment));
        trace!(solutions = self.stats.solutions, nodes = self.stats.nodes, "solution");
        Some(self.assignment.clone())
    }

    fn push_frame(&mut self) {
        self.cursors.push(0);
        self.marks.push(self.trail.len());
    }

    /// Reinstates every value pruned since the trail was `mark` long.
    fn restore(&mut self, mark: usize) {
        for (var, index) in self.trail.drain(mark..) {
            self.live[var][index] = true;
            self.live_count[var] += 1;
        }
    }

    /// Prunes the unassigned neighbours of `var` against the current
    /// assignment. Returns `false` when some neighbour has no value left.
    fn forward_check(&mut self, var: VarId) -> bool {
        let model = self.model;
        let registry = model.registry();
        for &other in &self.neighbours[var] {
            if self.assignment.is_assigned(other) {
                continue;
            }
            for (index, &value) in model.domain(other).iter().enumerate() {
                if !self.live[other][index] {
                    continue;
                }
                self.assignment.set(other, value);
                if !registry.is_consistent(other, &self.assignment) {
                    self.live[other][index] = false;
                    self.live_count[other] -= 1;
                    self.trail.push((other, index));
                    self.stats.pruned += 1;
                }
            }
            self.assignment.unset(other);
            if self.live_count[other] == 0 {
                return false;
            }
        }
        true
    }

    fn expand(&mut self) -> Option<Assignment> {
        let model = self.model;
        let registry = model.registry();
        loop {
            if self.deadline.is_expired() {
                self.status = SearchStatus::Cancelled;
                return None;
            }

            let depth = self.cursors.len() - 1;
            let var = self.order[depth];
            let domain = model.domain(var);
            let mark = self.marks[depth];
            // undo the pruning of this frame's previous value
            self.restore(mark);

            let mut placed = false;
            while self.cursors[depth] < domain.len() {
                let index = self.cursors[depth];
                self.cursors[depth] += 1;
                if !self.live[var][index] {
                    continue;
                }
                self.stats.nodes += 1;
                self.assignment.set(var, domain[index]);
                if registry.is_consistent(var, &self.assignment) && self.forward_check(var) {
                    placed = true;
                    break;
                }
                self.restore(mark);
            }

            if placed {
                if depth + 1 == self.order.len() {
                    return self.emit();
                }
                self.push_frame();
            } else {
                self.assignment.unset(var);
                self.cursors.pop();
                self.marks.pop();
                self.stats.backtracks += 1;
                if self.cursors.is_empty() {
                    self.status = SearchStatus::Exhausted;
                    return None;
                }
            }
        }
    }
}

impl Iterator for Solutions<'_> {
    type Item = Assignment;

    fn next(&mut self) -> Option<Assignment> {
        match self.status {
            SearchStatus::Exhausted | SearchStatus::Cancelled => None,
            SearchStatus::Unexpanded => {
                if self.deadline.is_expired() {
                    self.status = SearchStatus::Cancelled;
                    return None;
                }
                if self.order.is_empty() {
                    return self.emit();
                }
                self.push_frame();
                self.status = SearchStatus::Expanding;
                self.expand()
            }
            SearchStatus::Solution if self.order.is_empty() => {
                self.status = SearchStatus::Exhausted;
                None
            }
            SearchStatus::Solution | SearchStatus::Expanding => {
                self.status = SearchStatus::Expanding;
                self.expand()
            }
        }
    }
}

impl FusedIterator for Solutions<'_> {}
