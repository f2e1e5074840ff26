//! Soft-constraint score.
//!
//! Ranks complete assignments of one model. Higher is better. The score
//! never rejects a solution.
//!
//! # Terms
//!
//! | Term | Counted event | Default weight |
//! |------|---------------|----------------|
//! | Split course | Course whose occurrences fall on pairwise distinct days | +1 |
//! | Adjacent pair | Same-day consecutive slots of one class-section | +1 |
//! | Extra day | Active day beyond `max_active_days`, per class-section | −2 |
//! | Overload | Lesson beyond the daily cap on one day (soft-cap levels) | −1 |
//! | Extra room | Distinct physical room beyond the first, per class-section | 0 |
//!
//! # Reference
//! Schaerf (1999), "A Survey of Automated Timetabling", §2.2: soft constraints

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::config::{DailyCapMode, ScoreWeights, TimetableConfig};
use crate::cp::TimetableModel;
use crate::models::{Assignment, LessonValue, RoomId, VarId};

/// Per-term event counts of a scored assignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Courses with all occurrences on distinct days.
    pub split_courses: usize,
    /// Same-day adjacent pairs, summed over class-sections.
    pub adjacent_pairs: usize,
    /// Active days beyond the limit, summed over class-sections.
    pub extra_days: usize,
    /// Lessons beyond the daily cap (zero unless the cap is soft).
    pub overloaded_lessons: usize,
    /// Distinct physical rooms beyond the first, summed over class-sections.
    pub extra_rooms: usize,
    /// Weighted total.
    pub total: i64,
}

/// Scores complete assignments of one model.
///
/// Pure: holds only static grouping data and weights.
#[derive(Debug, Clone)]
pub struct ScoreEvaluator {
    /// Lesson ids per course, for courses with at least two occurrences.
    courses: Vec<Vec<VarId>>,
    /// Lesson ids per class-section.
    classes: Vec<Vec<VarId>>,
    /// Rooms that are physical.
    physical: BTreeSet<RoomId>,
    blocks_per_day: usize,
    daily_cap: usize,
    max_active_days: usize,
    soft_cap: bool,
    weights: ScoreWeights,
}

impl ScoreEvaluator {
    /// Prepares an evaluator for `model` under `config`'s weights.
    ///
    /// The overload term is active only when the model's level demotes the
    /// daily cap to soft.
    pub fn new(model: &TimetableModel, config: &TimetableConfig) -> Self {
        let mut courses: BTreeMap<&str, Vec<VarId>> = BTreeMap::new();
        let mut classes: BTreeMap<&str, Vec<VarId>> = BTreeMap::new();
        for lesson in model.lessons() {
            courses.entry(lesson.course_id.as_str()).or_default().push(lesson.id);
            classes.entry(lesson.class_id.as_str()).or_default().push(lesson.id);
        }

        let physical = (0..model.rooms().len())
            .map(RoomId)
            .filter(|&id| model.rooms().get(id).is_some_and(|r| r.is_physical()))
            .collect();

        Self {
            courses: courses.into_values().filter(|v| v.len() > 1).collect(),
            classes: classes.into_values().collect(),
            physical,
            blocks_per_day: model.grid().blocks_per_day.max(1),
            daily_cap: config.daily_cap,
            max_active_days: config.max_active_days,
            soft_cap: model.level().daily_cap == DailyCapMode::Soft,
            weights: config.weights,
        }
    }

    /// Weighted score of a complete assignment.
    pub fn score(&self, assignment: &Assignment) -> i64 {
        self.breakdown(assignment).total
    }

    /// Per-term counts and weighted total.
    ///
    /// Unassigned lessons are ignored.
    pub fn breakdown(&self, assignment: &Assignment) -> ScoreBreakdown {
        let mut b = ScoreBreakdown::default();

        for vars in &self.courses {
            let values = values_of(vars, assignment);
            let days: BTreeSet<usize> = values.iter().map(|v| self.day(v)).collect();
            if days.len() == values.len() {
                b.split_courses += 1;
            }
        }

        for vars in &self.classes {
            let mut by_day: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
            let mut rooms = BTreeSet::new();
            for value in values_of(vars, assignment) {
                by_day.entry(self.day(&value)).or_default().push(value.slot);
                if self.physical.contains(&value.room) {
                    rooms.insert(value.room);
                }
            }

            for slots in by_day.values_mut() {
                slots.sort_unstable();
                b.adjacent_pairs += slots.windows(2).filter(|w| w[1] == w[0] + 1).count();
                if self.soft_cap {
                    b.overloaded_lessons += slots.len().saturating_sub(self.daily_cap);
                }
            }
            b.extra_days += by_day.len().saturating_sub(self.max_active_days);
            b.extra_rooms += rooms.len().saturating_sub(1);
        }

        let w = &self.weights;
        b.total = w.split_course * b.split_courses as i64
            + w.adjacent_pair * b.adjacent_pairs as i64
            + w.extra_day * b.extra_days as i64
            + w.overload * b.overloaded_lessons as i64
            + w.distinct_room * b.extra_rooms as i64;
        b
    }

    #[inline]
    fn day(&self, value: &LessonValue) -> usize {
        value.slot / self.blocks_per_day
    }
}

fn values_of(vars: &[VarId], assignment: &Assignment) -> Vec<LessonValue> {
    vars.iter().filter_map(|&v| assignment.get(v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RelaxationLevel;
    use crate::cp::TimetableCpBuilder;
    use crate::models::{CourseUnit, Dataset, Mode, Teacher};

    fn dataset() -> Dataset {
        Dataset::new()
            .with_teacher(Teacher::new("jo"))
            .with_course(CourseUnit::new("UC11", "t01", "jo"))
            .with_course(CourseUnit::new("UC12", "t01", "jo"))
            .with_course(CourseUnit::new("UC13", "t01", "jo"))
    }

    fn setup(level: RelaxationLevel, config: &TimetableConfig) -> (TimetableModel, ScoreEvaluator) {
        let model = TimetableCpBuilder::new(&dataset(), config).build(&level).unwrap();
        let evaluator = ScoreEvaluator::new(&model, config);
        (model, evaluator)
    }

    fn place(model: &TimetableModel, slots: [usize; 6], rooms: [usize; 6]) -> Assignment {
        let mut a = model.empty_assignment();
        for var in 0..6 {
            a.set(var, LessonValue::new(slots[var], RoomId(rooms[var]), Mode::InPerson));
        }
        a
    }

    #[test]
    fn test_default_weight_terms() {
        let config = TimetableConfig::default();
        let (model, eval) = setup(RelaxationLevel::strict("full"), &config);

        // UC11 Mon 0 / Tue 4, UC12 Mon 1 / Wed 8, UC13 Thu 12 / Thu 13
        let a = place(&model, [0, 4, 1, 8, 12, 13], [0; 6]);
        let b = eval.breakdown(&a);
        assert_eq!(b.split_courses, 2);
        assert_eq!(b.adjacent_pairs, 2); // (0,1) and (12,13)
        assert_eq!(b.extra_days, 0);
        assert_eq!(b.overloaded_lessons, 0);
        assert_eq!(b.total, 4);
        assert_eq!(eval.score(&a), 4);
    }

    #[test]
    fn test_extra_days_penalty() {
        let config = TimetableConfig::default();
        let (model, eval) = setup(RelaxationLevel::strict("full"), &config);

        // Six lessons over five days, UC13 twice on Friday
        let a = place(&model, [0, 4, 8, 12, 16, 17], [0; 6]);
        let b = eval.breakdown(&a);
        assert_eq!(b.extra_days, 1);
        assert_eq!(b.split_courses, 2);
        assert_eq!(b.adjacent_pairs, 1);
        assert_eq!(b.total, 2 + 1 - 2);
    }

    #[test]
    fn test_overload_only_when_cap_is_soft() {
        let config = TimetableConfig::default();
        let a_slots = [0, 4, 1, 5, 2, 3]; // four lessons on Monday

        let (model, eval) = setup(
            RelaxationLevel::strict("off").with_daily_cap(DailyCapMode::Off),
            &config,
        );
        assert_eq!(eval.breakdown(&place(&model, a_slots, [0; 6])).overloaded_lessons, 0);

        let (model, eval) = setup(
            RelaxationLevel::strict("soft").with_daily_cap(DailyCapMode::Soft),
            &config,
        );
        let b = eval.breakdown(&place(&model, a_slots, [0; 6]));
        assert_eq!(b.overloaded_lessons, 1);
        // UC13 on Monday twice, the other two split; pairs 0-1, 1-2, 2-3, 4-5
        assert_eq!(b.split_courses, 2);
        assert_eq!(b.adjacent_pairs, 4);
        assert_eq!(b.total, 2 + 4 - 1);
    }

    #[test]
    fn test_distinct_room_weight() {
        let weights = ScoreWeights {
            distinct_room: -1,
            ..ScoreWeights::default()
        };
        let config = TimetableConfig::default().with_weights(weights);
        let (model, eval) = setup(RelaxationLevel::strict("full"), &config);

        let a = place(&model, [0, 4, 1, 8, 12, 13], [0, 1, 2, 0, 0, 0]);
        let b = eval.breakdown(&a);
        assert_eq!(b.extra_rooms, 2);
        assert_eq!(b.total, 4 - 2);
    }

    #[test]
    fn test_score_is_pure() {
        let config = TimetableConfig::default();
        let (model, eval) = setup(RelaxationLevel::strict("full"), &config);
        let a = place(&model, [0, 4, 1, 8, 12, 13], [0; 6]);
        let before = a.clone();
        assert_eq!(eval.score(&a), eval.score(&a));
        assert_eq!(a, before);
    }
}
