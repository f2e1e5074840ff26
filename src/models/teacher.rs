//! Teacher model.
//!
//! Teachers own course-units and carry a weekly availability. A teacher
//! can give at most one lesson per slot.

use serde::{Deserialize, Serialize};

use super::{Availability, Slot};

/// A teacher (lecturer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    /// Unique teacher identifier.
    pub id: String,
    /// Slots the teacher cannot lecture in.
    #[serde(default)]
    pub availability: Availability,
}

impl Teacher {
    /// Creates a fully available teacher.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            availability: Availability::always(),
        }
    }

    /// Marks slots as unavailable.
    pub fn with_unavailable(mut self, slots: impl IntoIterator<Item = Slot>) -> Self {
        self.availability.blocked.extend(slots);
        self
    }

    /// Whether the teacher can lecture in `slot`.
    #[inline]
    pub fn is_available_at(&self, slot: Slot) -> bool {
        self.availability.is_available(slot)
    }
}
