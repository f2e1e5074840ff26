//! Run configuration.
//!
//! One [`TimetableConfig`] per run: time budget, slot grid, room pool,
//! score weights and the ordered relaxation cascade. Loadable from TOML so
//! the cascade can be tuned without code changes.
//!
//! # Examples
//!
//! ```
//! use u_timetable::config::{DailyCapMode, TimetableConfig};
//!
//! let config = TimetableConfig::from_toml_str(r#"
//!     time_budget_secs = 5.0
//!     rooms = ["SalaA", "SalaB"]
//!
//!     [[levels]]
//!     name = "full"
//!
//!     [[levels]]
//!     name = "soft-cap"
//!     online_same_day = false
//!     daily_cap = "soft"
//! "#).unwrap();
//!
//! assert_eq!(config.levels.len(), 2);
//! assert_eq!(config.levels[1].daily_cap, DailyCapMode::Soft);
//! assert!(config.validate().is_ok());
//! ```

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::SlotGrid;

/// How the per-class daily load cap is applied at a level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DailyCapMode {
    /// Registered as a hard constraint.
    #[default]
    Hard,
    /// Not a constraint; overloads are penalized in the score.
    Soft,
    /// Ignored entirely.
    Off,
}

/// One step of the relaxation cascade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelaxationLevel {
    /// Level name, used in reports.
    pub name: String,
    /// Online occurrences of a course must share a day.
    pub online_same_day: bool,
    /// Daily load cap handling.
    pub daily_cap: DailyCapMode,
    /// In-person lessons may not share (slot, room).
    pub room_exclusivity: bool,
    /// Use only the first N rooms of the pool. `None` = whole pool.
    pub room_pool_size: Option<usize>,
    /// Confine occurrence k of a course to the k-th segment of the week.
    pub slot_partition: bool,
    /// Level only tells "infeasible because of rooms/load" apart from
    /// "structurally infeasible"; its solutions are never returned.
    pub diagnostic: bool,
}

impl Default for RelaxationLevel {
    fn default() -> Self {
        Self::strict("full")
    }
}

impl RelaxationLevel {
    /// The full model: every constraint hard, whole room pool.
    pub fn strict(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            online_same_day: true,
            daily_cap: DailyCapMode::Hard,
            room_exclusivity: true,
            room_pool_size: None,
            slot_partition: false,
            diagnostic: false,
        }
    }

    /// Renames the level.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Drops online same-day pairing.
    pub fn without_online_same_day(mut self) -> Self {
        self.online_same_day = false;
        self
    }

    /// Sets daily cap handling.
    pub fn with_daily_cap(mut self, mode: DailyCapMode) -> Self {
        self.daily_cap = mode;
        self
    }

    /// Drops room exclusivity.
    pub fn without_room_exclusivity(mut self) -> Self {
        self.room_exclusivity = false;
        self
    }

    /// Restricts the room pool to its first `size` rooms.
    pub fn with_room_pool(mut self, size: usize) -> Self {
        self.room_pool_size = Some(size);
        self
    }

    /// Enables the slot partition symmetry break.
    pub fn with_slot_partition(mut self) -> Self {
        self.slot_partition = true;
        self
    }

    /// Marks the level as diagnostic-only.
    pub fn as_diagnostic(mut self) -> Self {
        self.diagnostic = true;
        self
    }

    /// The default cascade, strictest first. Each level loosens the previous.
    pub fn default_cascade() -> Vec<Self> {
        let full = Self::strict("full");
        let no_online = full.clone().named("no-online-same-day").without_online_same_day();
        let single_room = no_online.clone().named("single-room").with_room_pool(1);
        let partitioned = single_room.clone().named("slot-partition").with_slot_partition();
        let soft_cap = partitioned
            .clone()
            .named("soft-daily-cap")
            .with_daily_cap(DailyCapMode::Soft);
        let diagnostic = Self::strict("diagnostic")
            .without_online_same_day()
            .without_room_exclusivity()
            .with_daily_cap(DailyCapMode::Off)
            .as_diagnostic();
        vec![full, no_online, single_room, partitioned, soft_cap, diagnostic]
    }
}

/// Soft-score weights.
///
/// Signed contribution per counted event. See `scheduler::ScoreEvaluator`
/// for the terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    /// Per course whose occurrences all fall on different days.
    pub split_course: i64,
    /// Per same-day adjacent pair of a class-section's lessons.
    pub adjacent_pair: i64,
    /// Per active day beyond `max_active_days`, per class-section.
    pub extra_day: i64,
    /// Per lesson beyond the daily cap on one day (soft cap levels only).
    pub overload: i64,
    /// Per distinct physical room beyond the first, per class-section.
    pub distinct_room: i64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            split_course: 1,
            adjacent_pair: 1,
            extra_day: -2,
            overload: -1,
            distinct_room: 0,
        }
    }
}

/// Optional per-class weekly load checks, applied to the dataset before any
/// level runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassLoad {
    /// Exact number of weekly lessons every class-section must have.
    pub lessons_per_week: Option<usize>,
    /// Maximum online lessons per class-section per week.
    pub max_online: Option<usize>,
}

/// Main run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimetableConfig {
    /// Total wall-clock budget across all levels (seconds).
    pub time_budget_secs: f64,
    /// Lower bound of each level's time slice (ms).
    pub min_level_slice_ms: u64,
    /// Weekly slot grid.
    pub grid: SlotGrid,
    /// Room pool, used in the given order.
    pub rooms: Vec<String>,
    /// Maximum lessons per class-section per day.
    pub daily_cap: usize,
    /// Active days per class-section before the extra-day penalty applies.
    pub max_active_days: usize,
    /// Soft-score weights.
    pub weights: ScoreWeights,
    /// Stop the anytime phase after scoring this many solutions.
    pub max_solutions: Option<usize>,
    /// Per-class weekly load checks.
    pub class_load: ClassLoad,
    /// Relaxation cascade, strictest first.
    pub levels: Vec<RelaxationLevel>,
}

impl Default for TimetableConfig {
    fn default() -> Self {
        Self {
            time_budget_secs: 10.0,
            min_level_slice_ms: 50,
            grid: SlotGrid::default(),
            rooms: vec!["Lab01".into(), "SalaA".into(), "SalaB".into()],
            daily_cap: 3,
            max_active_days: 4,
            weights: ScoreWeights::default(),
            max_solutions: None,
            class_load: ClassLoad::default(),
            levels: RelaxationLevel::default_cascade(),
        }
    }
}

impl TimetableConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Sets the total time budget.
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget_secs = budget.as_secs_f64();
        self
    }

    /// Sets the per-level slice floor.
    pub fn with_min_level_slice(mut self, floor: Duration) -> Self {
        self.min_level_slice_ms = floor.as_millis() as u64;
        self
    }

    /// Sets the slot grid.
    pub fn with_grid(mut self, grid: SlotGrid) -> Self {
        self.grid = grid;
        self
    }

    /// Sets the room pool.
    pub fn with_rooms<I, S>(mut self, rooms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rooms = rooms.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the score weights.
    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Caps the number of solutions scored per level.
    pub fn with_max_solutions(mut self, max: usize) -> Self {
        self.max_solutions = Some(max);
        self
    }

    /// Sets the per-class weekly load checks.
    pub fn with_class_load(mut self, load: ClassLoad) -> Self {
        self.class_load = load;
        self
    }

    /// Replaces the relaxation cascade.
    pub fn with_levels(mut self, levels: Vec<RelaxationLevel>) -> Self {
        self.levels = levels;
        self
    }

    /// Total time budget.
    ///
    /// Saturates at `Duration::MAX`; [`validate`](Self::validate) rejects
    /// budgets that do not fit.
    pub fn time_budget(&self) -> Duration {
        Duration::try_from_secs_f64(self.time_budget_secs.max(0.0)).unwrap_or(Duration::MAX)
    }

    /// Time slice of each level: an equal share of the budget, floored.
    pub fn level_slice(&self) -> Duration {
        let share = self.time_budget() / self.levels.len().max(1) as u32;
        share.max(Duration::from_millis(self.min_level_slice_ms))
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.time_budget_secs.is_finite() || self.time_budget_secs <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "time_budget_secs must be positive, got {}",
                self.time_budget_secs
            )));
        }
        if Duration::try_from_secs_f64(self.time_budget_secs).is_err() {
            return Err(ConfigError::Invalid(format!(
                "time_budget_secs {} does not fit a duration",
                self.time_budget_secs
            )));
        }
        if self.grid.is_empty() {
            return Err(ConfigError::Invalid("slot grid has no slots".into()));
        }
        if self.daily_cap == 0 {
            return Err(ConfigError::Invalid("daily_cap must be at least 1".into()));
        }
        if self.levels.is_empty() {
            return Err(ConfigError::Invalid("at least one relaxation level is required".into()));
        }

        let mut names = HashSet::new();
        for level in &self.levels {
            if !names.insert(level.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate relaxation level '{}'",
                    level.name
                )));
            }
            if level.room_pool_size == Some(0) {
                return Err(ConfigError::Invalid(format!(
                    "level '{}' has an empty room pool",
                    level.name
                )));
            }
        }

        if self.rooms.is_empty() {
            return Err(ConfigError::Invalid("room pool is empty".into()));
        }
        let mut rooms = HashSet::new();
        for room in &self.rooms {
            if !rooms.insert(room.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate room '{room}'")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TimetableConfig::default();
        assert_eq!(config.grid.slot_count(), 20);
        assert_eq!(config.rooms.len(), 3);
        assert_eq!(config.levels.len(), 6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_cascade_loosens() {
        let levels = RelaxationLevel::default_cascade();
        assert!(levels[0].online_same_day);
        assert!(!levels[1].online_same_day);
        assert_eq!(levels[2].room_pool_size, Some(1));
        assert!(levels[3].slot_partition);
        assert_eq!(levels[4].daily_cap, DailyCapMode::Soft);
        assert!(levels[5].diagnostic);
        assert!(!levels[5].room_exclusivity);
        assert_eq!(levels[5].daily_cap, DailyCapMode::Off);
        assert!(levels[..5].iter().all(|l| !l.diagnostic));
    }

    #[test]
    fn test_level_slice() {
        let config = TimetableConfig::default().with_time_budget(Duration::from_secs(6));
        assert_eq!(config.level_slice(), Duration::from_secs(1));

        let config = TimetableConfig::default()
            .with_time_budget(Duration::from_millis(60))
            .with_min_level_slice(Duration::from_millis(40));
        assert_eq!(config.level_slice(), Duration::from_millis(40));
    }

    #[test]
    fn test_validate_rejects() {
        assert!(TimetableConfig::default().with_levels(vec![]).validate().is_err());
        assert!(TimetableConfig::default()
            .with_grid(SlotGrid::new(Vec::<String>::new(), 4))
            .validate()
            .is_err());
        assert!(TimetableConfig::default()
            .with_levels(vec![RelaxationLevel::strict("a"), RelaxationLevel::strict("a")])
            .validate()
            .is_err());
        assert!(TimetableConfig::default()
            .with_levels(vec![RelaxationLevel::strict("a").with_room_pool(0)])
            .validate()
            .is_err());
        assert!(TimetableConfig::default()
            .with_rooms(Vec::<String>::new())
            .validate()
            .is_err());
        assert!(TimetableConfig::default()
            .with_rooms(["SalaA", "SalaA"])
            .validate()
            .is_err());

        let mut config = TimetableConfig::default();
        config.time_budget_secs = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_class_load_from_toml() {
        let config = TimetableConfig::from_toml_str(
            r#"
            [class_load]
            lessons_per_week = 10
            max_online = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.class_load.lessons_per_week, Some(10));
        assert_eq!(config.class_load.max_online, Some(3));
        assert_eq!(TimetableConfig::default().class_load, ClassLoad::default());
    }

    #[test]
    fn test_oversized_budget_is_rejected() {
        let config = TimetableConfig::from_toml_str("time_budget_secs = 1e300").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        assert_eq!(config.time_budget(), Duration::MAX);
        assert!(config.level_slice() > Duration::ZERO);

        let config = TimetableConfig::default().with_time_budget(Duration::MAX);
        assert!(config.validate().is_err());
        assert_eq!(config.time_budget(), Duration::MAX);
    }

    #[test]
    fn test_toml_defaults_fill_in() {
        let config = TimetableConfig::from_toml_str(
            r#"
            time_budget_secs = 2.5

            [grid]
            day_labels = ["Seg", "Ter", "Qua"]
            blocks_per_day = 5

            [weights]
            extra_day = -3
            "#,
        )
        .unwrap();

        assert_eq!(config.grid.slot_count(), 15);
        assert_eq!(config.weights.extra_day, -3);
        assert_eq!(config.weights.split_course, 1);
        assert_eq!(config.levels.len(), 6);
        assert_eq!(config.time_budget(), Duration::from_millis(2500));
    }

    #[test]
    fn test_toml_parse_error() {
        let err = TimetableConfig::from_toml_str("time_budget_secs = \"soon\"").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = TimetableConfig::load("/nonexistent/u-timetable.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
