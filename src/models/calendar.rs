//! Weekly slot grid and teacher availability.
//!
//! The week is a fixed grid of `days × blocks_per_day` lesson slots.
//! Every lesson occupies exactly one slot.
//!
//! # Slot Model
//! Slots are 0-based and numbered day-major: slot `s` falls on day
//! `s / blocks_per_day`, block `s % blocks_per_day`. Two slots are
//! adjacent iff they are numerically consecutive and on the same day.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Index of a lesson slot in the weekly grid.
pub type Slot = usize;

/// The weekly slot grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotGrid {
    /// Label of each teaching day, in week order.
    pub day_labels: Vec<String>,
    /// Number of lesson blocks per day.
    pub blocks_per_day: usize,
}

impl Default for SlotGrid {
    /// Five days (Mon–Fri) with four blocks each: 20 slots.
    fn default() -> Self {
        Self::new(["Mon", "Tue", "Wed", "Thu", "Fri"], 4)
    }
}

impl SlotGrid {
    /// Creates a grid from day labels and a block count.
    pub fn new<I, S>(day_labels: I, blocks_per_day: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            day_labels: day_labels.into_iter().map(Into::into).collect(),
            blocks_per_day,
        }
    }

    /// Number of days in the week.
    #[inline]
    pub fn days(&self) -> usize {
        self.day_labels.len()
    }

    /// Total number of slots.
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.days() * self.blocks_per_day
    }

    /// Whether the grid has no slots.
    pub fn is_empty(&self) -> bool {
        self.slot_count() == 0
    }

    /// Whether `slot` lies inside the grid.
    #[inline]
    pub fn contains(&self, slot: Slot) -> bool {
        slot < self.slot_count()
    }

    /// Day index of a slot.
    #[inline]
    pub fn day_of(&self, slot: Slot) -> usize {
        slot / self.blocks_per_day.max(1)
    }

    /// Day label of a slot (empty for slots outside the grid).
    pub fn day_label(&self, slot: Slot) -> &str {
        self.day_labels
            .get(self.day_of(slot))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Whether two slots are consecutive blocks of the same day.
    pub fn are_adjacent(&self, a: Slot, b: Slot) -> bool {
        a.abs_diff(b) == 1 && self.day_of(a) == self.day_of(b)
    }

    /// All slots in ascending order.
    pub fn slots(&self) -> std::ops::Range<Slot> {
        0..self.slot_count()
    }

    /// The `index`-th of `parts` contiguous segments of the grid.
    ///
    /// Segment boundaries are `floor(i * slot_count / parts)`, so with two
    /// parts over 20 slots the halves are `0..10` and `10..20`. A single
    /// part (or `parts == 0`) is the whole grid.
    pub fn segment(&self, index: usize, parts: usize) -> std::ops::Range<Slot> {
        if parts <= 1 {
            return self.slots();
        }
        let n = self.slot_count();
        let index = index.min(parts - 1);
        (index * n / parts)..((index + 1) * n / parts)
    }
}

/// Slots in which a teacher cannot lecture.
///
/// Blocked slots are the only availability information the dataset carries;
/// every other slot of the grid is available.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    /// Unavailable slots.
    pub blocked: BTreeSet<Slot>,
}

impl Availability {
    /// Always available.
    pub fn always() -> Self {
        Self::default()
    }

    /// Creates an availability from a set of blocked slots.
    pub fn blocking(slots: impl IntoIterator<Item = Slot>) -> Self {
        Self {
            blocked: slots.into_iter().collect(),
        }
    }

    /// Whether a slot is available.
    #[inline]
    pub fn is_available(&self, slot: Slot) -> bool {
        !self.blocked.contains(&slot)
    }

    /// Available slots of the grid, ascending.
    pub fn available_slots(&self, grid: &SlotGrid) -> Vec<Slot> {
        grid.slots().filter(|&s| self.is_available(s)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_grid() {
        let grid = SlotGrid::default();
        assert_eq!(grid.days(), 5);
        assert_eq!(grid.slot_count(), 20);
        assert_eq!(grid.day_of(0), 0);
        assert_eq!(grid.day_of(3), 0);
        assert_eq!(grid.day_of(4), 1);
        assert_eq!(grid.day_label(19), "Fri");
        assert_eq!(grid.day_label(20), "");
    }

    #[test]
    fn test_adjacency_respects_days() {
        let grid = SlotGrid::default();
        assert!(grid.are_adjacent(0, 1));
        assert!(grid.are_adjacent(2, 1));
        assert!(!grid.are_adjacent(3, 4)); // Mon block 4 → Tue block 1
        assert!(!grid.are_adjacent(0, 2));
    }

    #[test]
    fn test_segments() {
        let grid = SlotGrid::default();
        assert_eq!(grid.segment(0, 2), 0..10);
        assert_eq!(grid.segment(1, 2), 10..20);
        assert_eq!(grid.segment(0, 1), 0..20);
        assert_eq!(grid.segment(2, 3), 13..20);
        // Out-of-range index clamps to the last segment
        assert_eq!(grid.segment(5, 2), 10..20);
    }

    #[test]
    fn test_availability() {
        let grid = SlotGrid::default();
        let avail = Availability::blocking([0, 1, 19]);
        assert!(!avail.is_available(0));
        assert!(avail.is_available(2));
        assert_eq!(avail.available_slots(&grid).len(), 17);
        assert_eq!(Availability::always().available_slots(&grid).len(), 20);
    }
}
