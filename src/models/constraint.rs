//! Timetabling constraints and the constraint registry.
//!
//! The constraint set is closed: one variant per rule a valid timetable
//! must satisfy. Every variant is evaluated through
//! [`ConstraintRegistry::evaluate`], and checked incrementally during search
//! through [`ConstraintRegistry::is_consistent`].
//!
//! # Monotonicity
//! Each kind is monotone: if the lessons assigned so far already break it,
//! no extension of the assignment can repair it. Evaluation therefore
//! reports `Violated` as soon as the assigned part of the scope conflicts,
//! and `Undetermined` only while the scope is incomplete and conflict-free.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use super::{Assignment, LessonValue, VarId};

/// Index of a constraint in the registry.
pub type ConstraintId = usize;

/// A timetabling constraint over lesson ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Constraint {
    /// No two in-person lessons share both slot and room.
    RoomExclusivity { scope: Vec<VarId> },

    /// No two lessons of one teacher share a slot.
    TeacherNoOverlap { teacher_id: String, scope: Vec<VarId> },

    /// No two lessons of one class-section share a slot.
    ClassNoOverlap { class_id: String, scope: Vec<VarId> },

    /// At most `max_per_day` lessons of one class-section per day.
    DailyCap {
        class_id: String,
        scope: Vec<VarId>,
        max_per_day: usize,
    },

    /// Two online occurrences of one course fall on the same day.
    OnlineSameDay { course_id: String, pair: [VarId; 2] },

    /// The earlier occurrence of a course takes a strictly smaller slot.
    OccurrenceOrder { course_id: String, pair: [VarId; 2] },
}

/// Constraint kind, for reporting and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConstraintKind {
    RoomExclusivity,
    TeacherNoOverlap,
    ClassNoOverlap,
    DailyCap,
    OnlineSameDay,
    OccurrenceOrder,
}

/// Result of evaluating a constraint against an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintStatus {
    /// Scope fully assigned and the rule holds.
    Satisfied,
    /// The assigned part of the scope breaks the rule.
    Violated,
    /// Scope incomplete, no conflict so far.
    Undetermined,
}

impl Constraint {
    /// Creates a room exclusivity constraint.
    pub fn room_exclusivity(scope: Vec<VarId>) -> Self {
        Self::RoomExclusivity { scope }
    }

    /// Creates a teacher non-overlap constraint.
    pub fn teacher_no_overlap(teacher_id: impl Into<String>, scope: Vec<VarId>) -> Self {
        Self::TeacherNoOverlap {
            teacher_id: teacher_id.into(),
            scope,
        }
    }

    /// Creates a class non-overlap constraint.
    pub fn class_no_overlap(class_id: impl Into<String>, scope: Vec<VarId>) -> Self {
        Self::ClassNoOverlap {
            class_id: class_id.into(),
            scope,
        }
    }

    /// Creates a daily load cap.
    pub fn daily_cap(class_id: impl Into<String>, scope: Vec<VarId>, max_per_day: usize) -> Self {
        Self::DailyCap {
            class_id: class_id.into(),
            scope,
            max_per_day,
        }
    }

    /// Creates an online same-day pairing.
    pub fn online_same_day(course_id: impl Into<String>, first: VarId, second: VarId) -> Self {
        Self::OnlineSameDay {
            course_id: course_id.into(),
            pair: [first, second],
        }
    }

    /// Creates an occurrence ordering: `earlier.slot < later.slot`.
    pub fn occurrence_order(course_id: impl Into<String>, earlier: VarId, later: VarId) -> Self {
        Self::OccurrenceOrder {
            course_id: course_id.into(),
            pair: [earlier, later],
        }
    }

    /// Lesson ids this constraint ranges over.
    pub fn scope(&self) -> &[VarId] {
        match self {
            Self::RoomExclusivity { scope }
            | Self::TeacherNoOverlap { scope, .. }
            | Self::ClassNoOverlap { scope, .. }
            | Self::DailyCap { scope, .. } => scope,
            Self::OnlineSameDay { pair, .. } | Self::OccurrenceOrder { pair, .. } => pair,
        }
    }

    /// The constraint's kind.
    pub fn kind(&self) -> ConstraintKind {
        match self {
            Self::RoomExclusivity { .. } => ConstraintKind::RoomExclusivity,
            Self::TeacherNoOverlap { .. } => ConstraintKind::TeacherNoOverlap,
            Self::ClassNoOverlap { .. } => ConstraintKind::ClassNoOverlap,
            Self::DailyCap { .. } => ConstraintKind::DailyCap,
            Self::OnlineSameDay { .. } => ConstraintKind::OnlineSameDay,
            Self::OccurrenceOrder { .. } => ConstraintKind::OccurrenceOrder,
        }
    }

    /// Number of lessons in the scope.
    pub fn arity(&self) -> usize {
        self.scope().len()
    }
}

/// Registry of the constraints active for one relaxation level.
///
/// Keeps, per lesson, the list of constraints whose scope contains it, so
/// the search only re-checks constraints touched by the lesson it just
/// assigned.
#[derive(Debug, Clone)]
pub struct ConstraintRegistry {
    constraints: Vec<Constraint>,
    watches: Vec<Vec<ConstraintId>>,
    blocks_per_day: usize,
}

impl ConstraintRegistry {
    /// Creates an empty registry over `lesson_count` lessons.
    ///
    /// `blocks_per_day` maps slots to days for the day-based kinds.
    pub fn new(lesson_count: usize, blocks_per_day: usize) -> Self {
        Self {
            constraints: Vec::new(),
            watches: vec![Vec::new(); lesson_count],
            blocks_per_day: blocks_per_day.max(1),
        }
    }

    /// Registers a constraint and returns its id.
    ///
    /// Scope ids outside the lesson table are ignored by the watch index.
    pub fn add(&mut self, constraint: Constraint) -> ConstraintId {
        let id = self.constraints.len();
        for &var in constraint.scope() {
            debug_assert!(var < self.watches.len(), "scope id {var} out of range");
            if let Some(list) = self.watches.get_mut(var) {
                list.push(id);
            }
        }
        self.constraints.push(constraint);
        id
    }

    /// Looks up a constraint.
    pub fn get(&self, id: ConstraintId) -> Option<&Constraint> {
        self.constraints.get(id)
    }

    /// Number of registered constraints.
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    /// Whether no constraint is registered.
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Iterates constraints in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter()
    }

    /// Ids of the constraints whose scope contains `var`.
    pub fn constraints_on(&self, var: VarId) -> &[ConstraintId] {
        self.watches.get(var).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Lessons sharing at least one constraint with `var`, ascending.
    pub fn neighbours(&self, var: VarId) -> Vec<VarId> {
        let mut out: Vec<VarId> = self
            .constraints_on(var)
            .iter()
            .flat_map(|&id| self.constraints[id].scope().iter().copied())
            .filter(|&other| other != var)
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Number of constraints of each kind.
    pub fn count_by_kind(&self) -> HashMap<ConstraintKind, usize> {
        let mut counts = HashMap::new();
        for c in &self.constraints {
            *counts.entry(c.kind()).or_insert(0) += 1;
        }
        counts
    }

    #[inline]
    fn day(&self, value: &LessonValue) -> usize {
        value.slot / self.blocks_per_day
    }

    /// Evaluates a constraint against a partial or complete assignment.
    pub fn evaluate(&self, id: ConstraintId, assignment: &Assignment) -> ConstraintStatus {
        let Some(constraint) = self.constraints.get(id) else {
            return ConstraintStatus::Undetermined;
        };

        let assigned: Vec<LessonValue> = constraint
            .scope()
            .iter()
            .filter_map(|&var| assignment.get(var))
            .collect();
        let complete = assigned.len() == constraint.arity();

        let holds = match constraint {
            Constraint::RoomExclusivity { .. } => all_distinct(
                assigned
                    .iter()
                    .filter(|v| !v.mode.is_online())
                    .map(|v| (v.slot, v.room)),
            ),
            Constraint::TeacherNoOverlap { .. } | Constraint::ClassNoOverlap { .. } => {
                all_distinct(assigned.iter().map(|v| v.slot))
            }
            Constraint::DailyCap { max_per_day, .. } => {
                let mut per_day: HashMap<usize, usize> = HashMap::new();
                assigned.iter().all(|v| {
                    let count = per_day.entry(self.day(v)).or_insert(0);
                    *count += 1;
                    *count <= *max_per_day
                })
            }
            Constraint::OnlineSameDay { .. } => match assigned.as_slice() {
                [a, b] => self.online_pair_holds(a, b),
                _ => true,
            },
            Constraint::OccurrenceOrder { .. } => match assigned.as_slice() {
                [earlier, later] => earlier.slot < later.slot,
                _ => true,
            },
        };

        match (holds, complete) {
            (false, _) => ConstraintStatus::Violated,
            (true, true) => ConstraintStatus::Satisfied,
            (true, false) => ConstraintStatus::Undetermined,
        }
    }

    /// Whether `var`'s current value conflicts with nothing already assigned.
    ///
    /// Assumes the assignment without `var` was consistent, so only
    /// conflicts involving `var` are examined. Agrees with [`evaluate`]
    /// under that assumption.
    ///
    /// [`evaluate`]: Self::evaluate
    pub fn is_consistent(&self, var: VarId, assignment: &Assignment) -> bool {
        let Some(value) = assignment.get(var) else {
            return true;
        };

        self.constraints_on(var).iter().all(|&id| {
            let constraint = &self.constraints[id];
            let others = constraint
                .scope()
                .iter()
                .filter(|&&other| other != var)
                .filter_map(|&other| assignment.get(other));

            match constraint {
                Constraint::RoomExclusivity { .. } => {
                    value.mode.is_online()
                        || others
                            .filter(|o| !o.mode.is_online())
                            .all(|o| o.slot != value.slot || o.room != value.room)
                }
                Constraint::TeacherNoOverlap { .. } | Constraint::ClassNoOverlap { .. } => {
                    others.into_iter().all(|o| o.slot != value.slot)
                }
                Constraint::DailyCap { max_per_day, .. } => {
                    let day = self.day(&value);
                    let same_day = others.filter(|o| self.day(o) == day).count();
                    same_day < *max_per_day
                }
                Constraint::OnlineSameDay { .. } | Constraint::OccurrenceOrder { .. } => {
                    self.evaluate(id, assignment) != ConstraintStatus::Violated
                }
            }
        })
    }

    /// Ids of the constraints the assignment violates.
    pub fn violations(&self, assignment: &Assignment) -> Vec<ConstraintId> {
        (0..self.constraints.len())
            .filter(|&id| self.evaluate(id, assignment) == ConstraintStatus::Violated)
            .collect()
    }

    /// Whether a complete assignment satisfies every constraint.
    pub fn is_solution(&self, assignment: &Assignment) -> bool {
        assignment.is_complete()
            && (0..self.constraints.len())
                .all(|id| self.evaluate(id, assignment) == ConstraintStatus::Satisfied)
    }

    fn online_pair_holds(&self, a: &LessonValue, b: &LessonValue) -> bool {
        if a.mode.is_online() && b.mode.is_online() {
            self.day(a) == self.day(b)
        } else {
            true
        }
    }
}

fn all_distinct<T: Eq + Hash>(items: impl Iterator<Item = T>) -> bool {
    let mut seen = HashSet::new();
    items.into_iter().all(|item| seen.insert(item))
}
