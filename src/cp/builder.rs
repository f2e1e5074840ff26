//! Per-level model construction.
//!
//! Turns the input snapshot plus one [`RelaxationLevel`] into a
//! [`TimetableModel`]: the lesson table, one domain per lesson and the
//! registry of active constraints.
//!
//! # Domains
//! - Slots: the grid minus the teacher's blocked slots; with slot
//!   partitioning, further cut to the occurrence's segment of the week.
//! - Rooms: the mandated room if any; else, for an online occurrence, a
//!   per-course online token; else the (possibly truncated) room pool.
//! - Mode: fixed per occurrence.
//!
//! Domains are sorted by (slot, room). An empty domain aborts the level
//! immediately; afterwards a pigeonhole check rejects teachers and
//! class-sections owning more lessons than the slots their domains cover.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::config::{DailyCapMode, RelaxationLevel, TimetableConfig};
use crate::error::{BuildError, CapacityOwner, CapacityShortfall};
use crate::models::{
    Assignment, Availability, Constraint, ConstraintRegistry, Dataset, Domain,
    Lesson, LessonValue, Mode, Room, RoomId, RoomTable, Slot, SlotGrid, Timetable, VarId,
};

/// Everything the search needs for one relaxation level.
///
/// Read-only once built.
#[derive(Debug, Clone)]
pub struct TimetableModel {
    level: RelaxationLevel,
    grid: SlotGrid,
    lessons: Vec<Lesson>,
    domains: Vec<Domain>,
    rooms: RoomTable,
    registry: ConstraintRegistry,
}

impl TimetableModel {
    /// The level this model was built for.
    pub fn level(&self) -> &RelaxationLevel {
        &self.level
    }

    /// The slot grid.
    pub fn grid(&self) -> &SlotGrid {
        &self.grid
    }

    /// Lesson table, indexed by [`VarId`].
    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    /// Number of lessons.
    pub fn lesson_count(&self) -> usize {
        self.lessons.len()
    }

    /// Candidate values of a lesson.
    pub fn domain(&self, var: VarId) -> &[LessonValue] {
        self.domains.get(var).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Interned rooms.
    pub fn rooms(&self) -> &RoomTable {
        &self.rooms
    }

    /// Active constraints.
    pub fn registry(&self) -> &ConstraintRegistry {
        &self.registry
    }

    /// Finds the lesson of a course occurrence.
    pub fn find_lesson(&self, course_id: &str, occurrence: u8) -> Option<&Lesson> {
        self.lessons
            .iter()
            .find(|l| l.course_id == course_id && l.occurrence == occurrence)
    }

    /// Decodes an assignment into a named timetable.
    pub fn decode(&self, assignment: &Assignment) -> Timetable {
        Timetable::decode(&self.lessons, &self.rooms, &self.grid, assignment)
    }

    /// Empty assignment sized for this model.
    pub fn empty_assignment(&self) -> Assignment {
        Assignment::new(self.lessons.len())
    }
}

/// Builds [`TimetableModel`]s from a dataset.
///
/// # Example
/// ```
/// use u_timetable::cp::TimetableCpBuilder;
/// use u_timetable::config::{RelaxationLevel, TimetableConfig};
/// use u_timetable::models::{CourseUnit, Dataset, Teacher};
///
/// let dataset = Dataset::new()
///     .with_teacher(Teacher::new("jo"))
///     .with_course(CourseUnit::new("UC11", "t01", "jo"));
/// let config = TimetableConfig::default();
/// let model = TimetableCpBuilder::new(&dataset, &config)
///     .build(&RelaxationLevel::strict("full"))
///     .unwrap();
/// assert_eq!(model.lesson_count(), 2);
/// ```
pub struct TimetableCpBuilder<'a> {
    dataset: &'a Dataset,
    config: &'a TimetableConfig,
}

impl<'a> TimetableCpBuilder<'a> {
    /// Creates a new builder.
    pub fn new(dataset: &'a Dataset, config: &'a TimetableConfig) -> Self {
        Self { dataset, config }
    }

    /// Builds the model of one relaxation level.
    ///
    /// # Errors
    /// [`BuildError::EmptyDomain`] for the first lesson with no admissible
    /// value, else [`BuildError::InsufficientCapacity`] listing every
    /// teacher and class-section failing the pigeonhole check.
    pub fn build(&self, level: &RelaxationLevel) -> Result<TimetableModel, BuildError> {
        let grid = self.config.grid.clone();
        let lessons = self.lessons();

        let mut rooms = RoomTable::new();
        let pool: Vec<RoomId> = self
            .config
            .rooms
            .iter()
            .take(level.room_pool_size.unwrap_or(usize::MAX))
            .map(|name| rooms.intern(Room::Physical(name.clone())))
            .collect();

        let mut domains = Vec::with_capacity(lessons.len());
        for lesson in &lessons {
            let parts = self
                .dataset
                .course(&lesson.course_id)
                .map_or(1, |c| c.occurrences as usize);
            let slots = self.slot_candidates(lesson, parts, &grid, level.slot_partition);
            let candidates = room_candidates(lesson, &pool, &mut rooms);

            let mut domain: Domain = slots
                .iter()
                .flat_map(|&slot| {
                    candidates
                        .iter()
                        .map(move |&room| LessonValue::new(slot, room, lesson.mode))
                })
                .collect();
            domain.sort();

            if domain.is_empty() {
                debug!(level = %level.name, lesson = %lesson.name(), "empty domain");
                return Err(BuildError::EmptyDomain {
                    lesson: lesson.name(),
                    teacher_id: lesson.teacher_id.clone(),
                    class_id: lesson.class_id.clone(),
                });
            }
            domains.push(domain);
        }

        let by_teacher = group_by(&lessons, |l| &l.teacher_id);
        let by_class = group_by(&lessons, |l| &l.class_id);

        let mut shortfalls = capacity_shortfalls(CapacityOwner::Teacher, &by_teacher, &domains);
        shortfalls.extend(capacity_shortfalls(CapacityOwner::Class, &by_class, &domains));
        if !shortfalls.is_empty() {
            debug!(level = %level.name, count = shortfalls.len(), "capacity check failed");
            return Err(BuildError::InsufficientCapacity(shortfalls));
        }

        let registry = self.constraints(level, &lessons, &by_teacher, &by_class);

        debug!(
            level = %level.name,
            lessons = lessons.len(),
            constraints = registry.len(),
            values = domains.iter().map(Vec::len).sum::<usize>(),
            "model built"
        );

        Ok(TimetableModel {
            level: level.clone(),
            grid,
            lessons,
            domains,
            rooms,
            registry,
        })
    }

    /// One lesson per course occurrence, in course then occurrence order.
    fn lessons(&self) -> Vec<Lesson> {
        let mut lessons = Vec::with_capacity(self.dataset.lesson_count());
        for course in &self.dataset.courses {
            for occurrence in course.occurrence_indices() {
                lessons.push(Lesson {
                    id: lessons.len(),
                    course_id: course.id.clone(),
                    occurrence,
                    class_id: course.class_id.clone(),
                    teacher_id: course.teacher_id.clone(),
                    mode: course.mode_of(occurrence),
                    fixed_room: course.fixed_room.clone(),
                });
            }
        }
        lessons
    }

    fn slot_candidates(
        &self,
        lesson: &Lesson,
        parts: usize,
        grid: &SlotGrid,
        partition: bool,
    ) -> Vec<Slot> {
        let always = Availability::always();
        let availability = self
            .dataset
            .teacher(&lesson.teacher_id)
            .map(|t| &t.availability)
            .unwrap_or(&always);

        let segment = if partition {
            grid.segment((lesson.occurrence as usize).saturating_sub(1), parts)
        } else {
            grid.slots()
        };

        availability
            .available_slots(grid)
            .into_iter()
            .filter(|slot| segment.contains(slot))
            .collect()
    }

    fn constraints(
        &self,
        level: &RelaxationLevel,
        lessons: &[Lesson],
        by_teacher: &[(String, Vec<VarId>)],
        by_class: &[(String, Vec<VarId>)],
    ) -> ConstraintRegistry {
        let mut registry = ConstraintRegistry::new(lessons.len(), self.config.grid.blocks_per_day);

        if level.room_exclusivity {
            let in_person: Vec<VarId> = lessons
                .iter()
                .filter(|l| l.mode == Mode::InPerson)
                .map(|l| l.id)
                .collect();
            if in_person.len() > 1 {
                registry.add(Constraint::room_exclusivity(in_person));
            }
        }

        for (teacher_id, scope) in by_teacher.iter().filter(|(_, s)| s.len() > 1) {
            registry.add(Constraint::teacher_no_overlap(teacher_id, scope.clone()));
        }

        for (class_id, scope) in by_class.iter().filter(|(_, s)| s.len() > 1) {
            registry.add(Constraint::class_no_overlap(class_id, scope.clone()));
            if level.daily_cap == DailyCapMode::Hard && scope.len() > self.config.daily_cap {
                registry.add(Constraint::daily_cap(class_id, scope.clone(), self.config.daily_cap));
            }
        }

        for (course_id, scope) in group_by(lessons, |l| &l.course_id) {
            for pair in scope.windows(2) {
                registry.add(Constraint::occurrence_order(&course_id, pair[0], pair[1]));
            }
            if level.online_same_day {
                let online: Vec<VarId> = scope
                    .iter()
                    .copied()
                    .filter(|&v| lessons[v].mode.is_online())
                    .collect();
                for pair in online.windows(2) {
                    registry.add(Constraint::online_same_day(&course_id, pair[0], pair[1]));
                }
            }
        }

        registry
    }
}

fn room_candidates(lesson: &Lesson, pool: &[RoomId], rooms: &mut RoomTable) -> Vec<RoomId> {
    if let Some(room) = &lesson.fixed_room {
        vec![rooms.intern(Room::Physical(room.clone()))]
    } else if lesson.mode.is_online() {
        vec![rooms.intern(Room::Online(lesson.course_id.clone()))]
    } else {
        pool.to_vec()
    }
}

/// Groups lesson ids by key, in order of first appearance.
fn group_by<F>(lessons: &[Lesson], key: F) -> Vec<(String, Vec<VarId>)>
where
    F: Fn(&Lesson) -> &String,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<VarId>)> = Vec::new();
    for lesson in lessons {
        let k = key(lesson);
        let i = *index.entry(k.as_str()).or_insert_with(|| {
            groups.push((k.clone(), Vec::new()));
            groups.len() - 1
        });
        groups[i].1.push(lesson.id);
    }
    groups
}

/// Pigeonhole check: a group needs at least as many distinct slots as lessons.
fn capacity_shortfalls(
    owner: CapacityOwner,
    groups: &[(String, Vec<VarId>)],
    domains: &[Domain],
) -> Vec<CapacityShortfall> {
    groups
        .iter()
        .filter_map(|(id, vars)| {
            let available: BTreeSet<Slot> = vars
                .iter()
                .flat_map(|&v| domains[v].iter().map(|value| value.slot))
                .collect();
            (available.len() < vars.len()).then(|| CapacityShortfall {
                owner,
                id: id.clone(),
                demand: vars.len(),
                available: available.len(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConstraintKind, CourseUnit, Teacher};

    fn tiny_dataset() -> Dataset {
        Dataset::new()
            .with_teacher(Teacher::new("jo"))
            .with_teacher(Teacher::new("mike").with_unavailable(12..20))
            .with_course(CourseUnit::new("UC11", "t01", "jo"))
            .with_course(CourseUnit::new("UC12", "t01", "mike").with_online(2))
            .with_course(CourseUnit::new("UC14", "t01", "jo").with_fixed_room("Lab01"))
    }

    fn build(dataset: &Dataset, level: &RelaxationLevel) -> Result<TimetableModel, BuildError> {
        let config = TimetableConfig::default();
        TimetableCpBuilder::new(dataset, &config).build(level)
    }

    #[test]
    fn test_lesson_table() {
        let model = build(&tiny_dataset(), &RelaxationLevel::strict("full")).unwrap();
        assert_eq!(model.lesson_count(), 6);
        let l = model.find_lesson("UC12", 2).unwrap();
        assert_eq!(l.id, 3);
        assert_eq!(l.mode, Mode::Online);
        assert_eq!(l.teacher_id, "mike");
    }

    #[test]
    fn test_pool_domain() {
        let model = build(&tiny_dataset(), &RelaxationLevel::strict("full")).unwrap();
        // jo is always available: 20 slots × 3 pool rooms
        let domain = model.domain(0);
        assert_eq!(domain.len(), 60);
        assert!(domain.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(domain[0].slot, 0);
        assert_eq!(domain[59].slot, 19);
    }

    #[test]
    fn test_teacher_unavailability_and_online_token() {
        let model = build(&tiny_dataset(), &RelaxationLevel::strict("full")).unwrap();
        let online = model.find_lesson("UC12", 2).unwrap().id;
        let domain = model.domain(online);
        assert_eq!(domain.len(), 12); // slots 0..12, single online token
        assert!(domain.iter().all(|v| v.slot < 12 && v.mode == Mode::Online));
        let room = model.rooms().get(domain[0].room).unwrap();
        assert_eq!(room, &Room::Online("UC12".into()));
    }

    #[test]
    fn test_fixed_room_domain() {
        let model = build(&tiny_dataset(), &RelaxationLevel::strict("full")).unwrap();
        let fixed = model.find_lesson("UC14", 1).unwrap().id;
        let domain = model.domain(fixed);
        assert_eq!(domain.len(), 20);
        let room = model.rooms().get(domain[0].room).unwrap();
        assert_eq!(room, &Room::Physical("Lab01".into()));
    }

    #[test]
    fn test_room_pool_truncation() {
        let level = RelaxationLevel::strict("single").with_room_pool(1);
        let model = build(&tiny_dataset(), &level).unwrap();
        assert_eq!(model.domain(0).len(), 20);
    }

    #[test]
    fn test_slot_partition() {
        let level = RelaxationLevel::strict("part").with_slot_partition();
        let model = build(&tiny_dataset(), &level).unwrap();
        let first = model.find_lesson("UC11", 1).unwrap().id;
        let second = model.find_lesson("UC11", 2).unwrap().id;
        assert!(model.domain(first).iter().all(|v| v.slot < 10));
        assert!(model.domain(second).iter().all(|v| v.slot >= 10));
    }

    #[test]
    fn test_empty_domain() {
        // mike only teaches in the first half; partition sends occurrence 2 to the second half
        let dataset = Dataset::new()
            .with_teacher(Teacher::new("mike").with_unavailable(10..20))
            .with_course(CourseUnit::new("UC12", "t01", "mike"));
        let level = RelaxationLevel::strict("part").with_slot_partition();

        match build(&dataset, &level) {
            Err(BuildError::EmptyDomain {
                lesson,
                teacher_id,
                class_id,
            }) => {
                assert_eq!(lesson, "UC12_2");
                assert_eq!(teacher_id, "mike");
                assert_eq!(class_id, "t01");
            }
            other => panic!("expected EmptyDomain, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_pool_is_empty_domain() {
        let dataset = tiny_dataset();
        let config = TimetableConfig::default().with_rooms(Vec::<String>::new());
        let result = TimetableCpBuilder::new(&dataset, &config).build(&RelaxationLevel::strict("full"));
        assert!(matches!(result, Err(BuildError::EmptyDomain { .. })));
    }

    #[test]
    fn test_insufficient_teacher_capacity() {
        let dataset = Dataset::new()
            .with_teacher(Teacher::new("mike").with_unavailable(1..20))
            .with_course(CourseUnit::new("UC12", "t01", "mike"));

        match build(&dataset, &RelaxationLevel::strict("full")) {
            Err(BuildError::InsufficientCapacity(shortfalls)) => {
                let teacher = shortfalls
                    .iter()
                    .find(|s| s.owner == CapacityOwner::Teacher)
                    .unwrap();
                assert_eq!(teacher.id, "mike");
                assert_eq!(teacher.demand, 2);
                assert_eq!(teacher.available, 1);
            }
            other => panic!("expected InsufficientCapacity, got {other:?}"),
        }
    }

    #[test]
    fn test_constraint_registry() {
        let model = build(&tiny_dataset(), &RelaxationLevel::strict("full")).unwrap();
        let counts = model.registry().count_by_kind();
        assert_eq!(counts[&ConstraintKind::RoomExclusivity], 1);
        assert_eq!(counts[&ConstraintKind::TeacherNoOverlap], 2);
        assert_eq!(counts[&ConstraintKind::ClassNoOverlap], 1);
        assert_eq!(counts[&ConstraintKind::DailyCap], 1);
        assert_eq!(counts[&ConstraintKind::OccurrenceOrder], 3);
        // UC12 has a single online occurrence: nothing to pair
        assert!(!counts.contains_key(&ConstraintKind::OnlineSameDay));

        // The room exclusivity scope holds in-person lessons only
        let room = model
            .registry()
            .iter()
            .find(|c| c.kind() == ConstraintKind::RoomExclusivity)
            .unwrap();
        assert_eq!(room.arity(), 5);
    }

    #[test]
    fn test_level_toggles() {
        let dataset = tiny_dataset().with_course(
            CourseUnit::new("UC21", "t02", "jo").with_online(1).with_online(2),
        );
        let strict = build(&dataset, &RelaxationLevel::strict("full")).unwrap();
        assert_eq!(
            strict.registry().count_by_kind()[&ConstraintKind::OnlineSameDay],
            1
        );

        let loose = RelaxationLevel::strict("loose")
            .without_online_same_day()
            .without_room_exclusivity()
            .with_daily_cap(DailyCapMode::Soft);
        let counts = build(&dataset, &loose).unwrap().registry().count_by_kind();
        assert!(!counts.contains_key(&ConstraintKind::OnlineSameDay));
        assert!(!counts.contains_key(&ConstraintKind::RoomExclusivity));
        assert!(!counts.contains_key(&ConstraintKind::DailyCap));
        assert_eq!(counts[&ConstraintKind::OccurrenceOrder], 4);
    }

    #[test]
    fn test_build_is_deterministic() {
        let dataset = tiny_dataset();
        let a = build(&dataset, &RelaxationLevel::strict("full")).unwrap();
        let b = build(&dataset, &RelaxationLevel::strict("full")).unwrap();
        for var in 0..a.lesson_count() {
            assert_eq!(a.domain(var), b.domain(var));
        }
    }
}
