//! Seeded synthetic datasets.
//!
//! Produces reproducible timetabling instances for tests and benchmarks:
//! same parameters and seed, same dataset.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::models::{CourseUnit, Dataset, SlotGrid, Teacher, DEFAULT_OCCURRENCES};

/// Generator of random datasets.
///
/// # Example
/// ```
/// use u_timetable::generator::InstanceGenerator;
/// use u_timetable::models::SlotGrid;
///
/// let gen = InstanceGenerator::new(7).with_classes(2).with_courses_per_class(3);
/// let dataset = gen.generate(&SlotGrid::default());
/// assert_eq!(dataset.courses.len(), 6);
/// assert_eq!(dataset, gen.generate(&SlotGrid::default()));
/// ```
#[derive(Debug, Clone)]
pub struct InstanceGenerator {
    seed: u64,
    classes: usize,
    courses_per_class: usize,
    teachers: usize,
    occurrences: u8,
    unavailability_rate: f64,
    online_rate: f64,
    fixed_room_rate: f64,
    fixed_rooms: Vec<String>,
}

impl InstanceGenerator {
    /// Creates a generator with small defaults: 2 classes of 3 courses,
    /// 3 teachers, light unavailability.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            classes: 2,
            courses_per_class: 3,
            teachers: 3,
            occurrences: DEFAULT_OCCURRENCES,
            unavailability_rate: 0.1,
            online_rate: 0.15,
            fixed_room_rate: 0.1,
            fixed_rooms: vec!["Lab01".into()],
        }
    }

    /// Sets the number of class-sections.
    pub fn with_classes(mut self, n: usize) -> Self {
        self.classes = n;
        self
    }

    /// Sets the number of courses per class-section.
    pub fn with_courses_per_class(mut self, n: usize) -> Self {
        self.courses_per_class = n;
        self
    }

    /// Sets the number of teachers (at least 1).
    pub fn with_teachers(mut self, n: usize) -> Self {
        self.teachers = n.max(1);
        self
    }

    /// Sets the occurrences of every course (at least 1).
    pub fn with_occurrences(mut self, n: u8) -> Self {
        self.occurrences = n.max(1);
        self
    }

    /// Probability that a teacher blocks any given slot.
    pub fn with_unavailability_rate(mut self, p: f64) -> Self {
        self.unavailability_rate = p.clamp(0.0, 1.0);
        self
    }

    /// Probability that an occurrence is online.
    pub fn with_online_rate(mut self, p: f64) -> Self {
        self.online_rate = p.clamp(0.0, 1.0);
        self
    }

    /// Probability that a course mandates a room.
    pub fn with_fixed_room_rate(mut self, p: f64) -> Self {
        self.fixed_room_rate = p.clamp(0.0, 1.0);
        self
    }

    /// Rooms that courses may be mandated to.
    pub fn with_fixed_rooms<I, S>(mut self, rooms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fixed_rooms = rooms.into_iter().map(Into::into).collect();
        self
    }

    /// Generates a dataset over `grid`.
    ///
    /// Teachers are named `T01`.., classes `t01`.., courses `UC0101`..
    /// (class, then course within the class).
    pub fn generate(&self, grid: &SlotGrid) -> Dataset {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut dataset = Dataset::new();

        for t in 0..self.teachers {
            let blocked: Vec<usize> = grid
                .slots()
                .filter(|_| rng.random_bool(self.unavailability_rate))
                .collect();
            let teacher = Teacher::new(format!("T{:02}", t + 1)).with_unavailable(blocked);
            dataset = dataset.with_teacher(teacher);
        }

        for c in 0..self.classes {
            for u in 0..self.courses_per_class {
                let teacher = rng.random_range(0..self.teachers);
                let mut course = CourseUnit::new(
                    format!("UC{:02}{:02}", c + 1, u + 1),
                    format!("t{:02}", c + 1),
                    format!("T{:02}", teacher + 1),
                )
                .with_occurrences(self.occurrences);

                for k in 1..=self.occurrences {
                    if rng.random_bool(self.online_rate) {
                        course = course.with_online(k);
                    }
                }
                if !self.fixed_rooms.is_empty() && rng.random_bool(self.fixed_room_rate) {
                    let room = &self.fixed_rooms[rng.random_range(0..self.fixed_rooms.len())];
                    course = course.with_fixed_room(room.clone());
                }
                dataset = dataset.with_course(course);
            }
        }

        dataset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate_dataset;

    #[test]
    fn test_same_seed_same_dataset() {
        let grid = SlotGrid::default();
        let a = InstanceGenerator::new(42).generate(&grid);
        let b = InstanceGenerator::new(42).generate(&grid);
        assert_eq!(a, b);
    }

    #[test]
    fn test_shape() {
        let grid = SlotGrid::default();
        let dataset = InstanceGenerator::new(1)
            .with_classes(3)
            .with_courses_per_class(4)
            .with_teachers(5)
            .with_occurrences(3)
            .generate(&grid);

        assert_eq!(dataset.teachers.len(), 5);
        assert_eq!(dataset.courses.len(), 12);
        assert_eq!(dataset.class_ids().len(), 3);
        assert_eq!(dataset.lesson_count(), 36);
        assert!(validate_dataset(&dataset, &grid).is_ok());
    }

    #[test]
    fn test_rates_at_extremes() {
        let grid = SlotGrid::default();
        let dataset = InstanceGenerator::new(9)
            .with_unavailability_rate(0.0)
            .with_online_rate(1.0)
            .with_fixed_room_rate(0.0)
            .generate(&grid);

        assert!(dataset
            .teachers
            .iter()
            .all(|t| t.availability.blocked.is_empty()));
        assert!(dataset
            .courses
            .iter()
            .all(|c| c.online_occurrences.len() == c.occurrences as usize && c.fixed_room.is_none()));
    }
}
